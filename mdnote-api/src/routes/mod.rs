/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login and the current user's profile
/// - `users`: Profile updates and the user listing
/// - `documents`: Documents, image uploads, stats and document tags
/// - `posts`: Public feed and likes
/// - `tags`: Tag management
/// - `tasks`: Tasks and task tags

pub mod auth;
pub mod documents;
pub mod health;
pub mod posts;
pub mod tags;
pub mod tasks;
pub mod users;
