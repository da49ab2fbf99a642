//! Serde helpers for request text fields
//!
//! Names, titles and emails are stored trimmed. Trimming while deserializing
//! means `validator` length rules see the value that will actually be stored.
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Form {
//!     #[serde(deserialize_with = "mdnote_shared::input::trimmed")]
//!     name: String,
//! }
//!
//! let form: Form = serde_json::from_str(r#"{"name": "  work  "}"#).unwrap();
//! assert_eq!(form.name, "work");
//! ```

use serde::{Deserialize, Deserializer};

pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Like [`trimmed`] for optional fields; pair with `#[serde(default)]`
pub fn trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(deserialize_with = "trimmed")]
        name: String,

        #[serde(default, deserialize_with = "trimmed_option")]
        note: Option<String>,
    }

    #[test]
    fn test_trims_both_ends() {
        let form: Form = serde_json::from_str(r#"{"name": " \t ab \n", "note": "  x "}"#).unwrap();
        assert_eq!(form.name, "ab");
        assert_eq!(form.note.as_deref(), Some("x"));
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        let form: Form = serde_json::from_str(r#"{"name": "      "}"#).unwrap();
        assert_eq!(form.name, "");
        assert!(form.note.is_none());
    }

    #[test]
    fn test_null_option_stays_none() {
        let form: Form = serde_json::from_str(r#"{"name": "a", "note": null}"#).unwrap();
        assert!(form.note.is_none());
    }
}
