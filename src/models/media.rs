use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// MediaFile
///
/// An uploaded image. The id is the stored file name, which is also the last
/// segment of its public URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct MediaFile {
    pub id: String,
    pub name: String,
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}
