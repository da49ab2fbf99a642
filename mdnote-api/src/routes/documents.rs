/// Document endpoints
///
/// # Endpoints
///
/// - `GET /api/documents` - List the caller's documents
/// - `POST /api/documents` - Create a markdown document
/// - `GET /api/documents/search?q=` - Search by title or filename
/// - `GET /api/documents/stats` - Totals and seven-day histogram
/// - `POST /api/documents/images` - Upload an image as a new document
/// - `GET|PUT|DELETE /api/documents/:id` - Single document
/// - `GET|PUT /api/documents/:id/tags` - Tags attached to a document
///
/// Every query is scoped to the caller; another user's document answers 404
/// exactly like a missing one.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    response::ApiResponse,
    routes::tags::TagList,
};
use axum::extract::{multipart::MultipartRejection, Multipart, State};
use mdnote_shared::{
    auth::{authorization::assert_owner, principal::Principal},
    input::{trimmed, trimmed_option},
    markdown::image_reference,
    models::{
        document::{Document, DocumentDraft, DocumentStats, DocumentSummary, MAX_TITLE_CHARS},
        tag::{reassign_tags, Tag, TagTarget},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Multipart field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "file";

fn document_not_found() -> ApiError {
    ApiError::NotFound("Document not found".to_string())
}

/// Create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 252, message = "must be at most 252 characters"))]
    pub title: String,

    #[serde(default)]
    pub content: String,
}

/// Update request; absent or empty fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(max = 252, message = "must be at most 252 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Returned by create and update
#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub file_size: i64,
}

impl From<Document> for DocumentInfo {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            filename: doc.filename,
            file_size: doc.file_size,
        }
    }
}

/// Returned by image upload
#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub id: i64,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetTagsRequest {
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// List the caller's documents, most recently updated first
pub async fn list_documents(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<ApiResponse<Vec<DocumentSummary>>> {
    let documents = Document::list_for_user(&state.db, principal.user_id).await?;
    Ok(ApiResponse::success(documents))
}

/// Create a markdown document
///
/// # Endpoint
///
/// ```text
/// POST /api/documents
/// Content-Type: application/json
///
/// { "title": "Notes", "content": "# Hello" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Title is empty after trimming, or too long
pub async fn create_document(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateDocumentRequest>,
) -> ApiResult<ApiResponse<DocumentInfo>> {
    req.validate()?;

    let draft = DocumentDraft::markdown(&req.title, &req.content)
        .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;

    let document = Document::create(&state.db, principal.user_id, &draft).await?;

    tracing::info!(
        document_id = document.id,
        user_id = principal.user_id,
        file_size = document.file_size,
        "Document created"
    );

    Ok(ApiResponse::success(document.into()))
}

/// Upload an image and create a document referencing it
///
/// # Errors
///
/// - `400 Bad Request`: Not a multipart body, no `file` field, or not a
///   supported image
pub async fn upload_image(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<UploadedImage>> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) = upload
        .ok_or_else(|| ApiError::BadRequest("Please choose an image file to upload".to_string()))?;

    let ext = crate::storage::image_extension(content_type.as_deref(), file_name.as_deref())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let image = state.images.save(&ext, &bytes).await?;

    let title = upload_title(file_name.as_deref(), &ext);
    let draft = DocumentDraft::image(
        &title,
        image_reference(&image.url),
        image.size,
        image.relative_path.clone(),
    );

    let document = match Document::create(&state.db, principal.user_id, &draft).await {
        Ok(document) => document,
        Err(e) => {
            tracing::error!(
                path = %image.relative_path,
                error = %e,
                "Failed to record uploaded image, removing file"
            );
            state.images.remove(&image.relative_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        document_id = document.id,
        user_id = principal.user_id,
        size = image.size,
        "Image uploaded"
    );

    Ok(ApiResponse::success(UploadedImage {
        id: document.id,
        url: image.url,
        content: document.content,
    }))
}

/// Title for an uploaded image: the client's file name, cut to fit
fn upload_title(file_name: Option<&str>, ext: &str) -> String {
    match file_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.chars().take(MAX_TITLE_CHARS).collect(),
        None => format!("image{}", ext),
    }
}

/// Fetch one document with its content
///
/// # Errors
///
/// - `404 Not Found`: Missing or owned by someone else
pub async fn get_document(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<Document>> {
    let document = Document::find_for_user(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(document_not_found)?;

    Ok(ApiResponse::success(document))
}

/// Search the caller's documents by title or filename
///
/// An empty keyword returns an empty list without touching the database.
pub async fn search_documents(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<ApiResponse<Vec<DocumentSummary>>> {
    let keyword = query.q.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        return Ok(ApiResponse::success(Vec::new()));
    }

    let documents = Document::search_for_user(&state.db, principal.user_id, keyword).await?;
    Ok(ApiResponse::success(documents))
}

/// Update title and/or content
///
/// # Errors
///
/// - `400 Bad Request`: Title too long
/// - `404 Not Found`: Missing or owned by someone else
pub async fn update_document(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateDocumentRequest>,
) -> ApiResult<ApiResponse<DocumentInfo>> {
    req.validate()?;

    let current = Document::find_for_user(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(document_not_found)?;

    let draft = DocumentDraft::resolve_update(&current, req.title.as_deref(), req.content.as_deref());

    let document = Document::update_for_user(&state.db, principal.user_id, id, &draft)
        .await?
        .ok_or_else(document_not_found)?;

    tracing::info!(document_id = id, user_id = principal.user_id, "Document updated");

    Ok(ApiResponse::success(document.into()))
}

/// Delete a document and its stored image, if any
///
/// # Errors
///
/// - `404 Not Found`: Missing or owned by someone else
pub async fn delete_document(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    let document = Document::find_for_user(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(document_not_found)?;

    if let Some(path) = &document.image_path {
        state.images.remove(path).await;
    }

    Document::delete_for_user(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(document_not_found)?;

    tracing::info!(document_id = id, user_id = principal.user_id, "Document deleted");

    Ok(ApiResponse::message("Document deleted"))
}

/// Totals and the seven-day update histogram
pub async fn document_stats(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<ApiResponse<DocumentStats>> {
    let stats = Document::stats_for_user(&state.db, principal.user_id).await?;
    Ok(ApiResponse::success(stats))
}

/// Tags attached to a document, by name
pub async fn get_document_tags(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<TagList>> {
    assert_owner::<Document, _>(&state.db, &principal, id).await?;

    let list = Tag::list_for(&state.db, TagTarget::Document, id).await?;
    Ok(ApiResponse::success(TagList { list }))
}

/// Replace the tags attached to a document
///
/// Ids that do not exist or belong to another user are skipped.
pub async fn set_document_tags(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<SetTagsRequest>,
) -> ApiResult<ApiResponse<()>> {
    let mut tx = state.db.begin().await?;

    assert_owner::<Document, _>(&mut *tx, &principal, id).await?;
    let attached = reassign_tags(
        &mut *tx,
        TagTarget::Document,
        principal.user_id,
        id,
        &req.tag_ids,
    )
    .await?;

    tx.commit().await?;

    tracing::debug!(document_id = id, attached, "Document tags replaced");

    Ok(ApiResponse::message("Tags updated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_content_optional() {
        let req: CreateDocumentRequest = serde_json::from_str(r#"{"title": "Notes"}"#).unwrap();
        assert_eq!(req.title, "Notes");
        assert_eq!(req.content, "");
    }

    #[test]
    fn test_title_length_matches_column() {
        let fits: CreateDocumentRequest = serde_json::from_value(
            serde_json::json!({ "title": "t".repeat(MAX_TITLE_CHARS) }),
        )
        .unwrap();
        assert!(fits.validate().is_ok());

        let too_long: CreateDocumentRequest = serde_json::from_value(
            serde_json::json!({ "title": "t".repeat(MAX_TITLE_CHARS + 1) }),
        )
        .unwrap();
        assert!(too_long.validate().is_err());

        let padded: CreateDocumentRequest = serde_json::from_value(
            serde_json::json!({ "title": format!("  {}  ", "t".repeat(MAX_TITLE_CHARS)) }),
        )
        .unwrap();
        assert!(padded.validate().is_ok());

        let update: UpdateDocumentRequest = serde_json::from_value(
            serde_json::json!({ "title": "é".repeat(MAX_TITLE_CHARS + 1) }),
        )
        .unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_upload_title() {
        assert_eq!(upload_title(Some("cat.png"), ".png"), "cat.png");
        assert_eq!(upload_title(Some("  "), ".png"), "image.png");
        assert_eq!(upload_title(None, ".gif"), "image.gif");

        let long = "n".repeat(300);
        assert_eq!(upload_title(Some(&long), ".png").chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_update_request_fields_optional() {
        let req: UpdateDocumentRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.content.is_none());
    }

    #[test]
    fn test_set_tags_defaults_to_empty() {
        let req: SetTagsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.tag_ids.is_empty());
    }

    #[test]
    fn test_document_info_shape() {
        let info = DocumentInfo {
            id: 3,
            title: "Notes".to_string(),
            filename: "Notes.md".to_string(),
            file_size: 5,
        };
        let v = serde_json::to_value(info).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"id": 3, "title": "Notes", "filename": "Notes.md", "file_size": 5})
        );
    }
}
