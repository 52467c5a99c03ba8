use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};

use crate::{
    AppState, error::ApiError, handlers::MessageResponse, models::MediaFile,
    storage::validate_name,
};

/// Multipart field names accepted for the uploaded file.
pub const UPLOAD_FIELDS: [&str; 2] = ["file", "image"];

struct Upload {
    file_name: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::InvalidBody(err.body_text())
}

/// Pulls the first `file`/`image` part out of the form, skipping anything else.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if !field.name().is_some_and(|name| UPLOAD_FIELDS.contains(&name)) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::Validation("No file uploaded".to_string()))
}

/// upload_media
///
/// [Content Route] Stores one image from a multipart form (field `file` or `image`)
/// and returns its public URL. Non-image types and oversized files are rejected
/// before anything is written.
#[utoipa::path(
    post,
    path = "/api/media",
    tag = "media",
    request_body(content_type = "multipart/form-data", description = "Image in field `file` or `image`"),
    responses(
        (status = 201, description = "Image stored", body = MediaFile),
        (status = 400, description = "Missing file, not an image or too large")
    )
)]
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaFile>), ApiError> {
    let upload = read_upload(&mut multipart).await?;

    if !upload.content_type.starts_with("image/") {
        return Err(ApiError::Validation(
            "Only image files are allowed".to_string(),
        ));
    }
    if upload.bytes.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".to_string()));
    }
    if upload.bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::Validation(format!(
            "File exceeds the {} byte limit",
            state.config.max_upload_bytes
        )));
    }

    let file = state
        .storage
        .save(
            upload.file_name.as_deref(),
            &upload.content_type,
            &upload.bytes,
        )
        .await?;
    tracing::info!(file = %file.id, size = file.size, "media uploaded");
    Ok((StatusCode::CREATED, Json(file)))
}

/// list_media
///
/// [Content Route] Newest first.
#[utoipa::path(
    get,
    path = "/api/media",
    tag = "media",
    responses((status = 200, description = "Stored images", body = Vec<MediaFile>))
)]
pub async fn list_media(State(state): State<AppState>) -> Result<Json<Vec<MediaFile>>, ApiError> {
    Ok(Json(state.storage.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Image metadata", body = MediaFile),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MediaFile>, ApiError> {
    validate_name(&id)?;
    Ok(Json(state.storage.stat(&id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_name(&id)?;
    state.storage.delete(&id).await?;
    tracing::info!(file = %id, "media deleted");
    Ok(Json(MessageResponse::new("File deleted successfully")))
}
