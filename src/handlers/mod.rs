//! HTTP handlers, one module per resource. Every handler returns
//! `Result<_, ApiError>` and reads bodies through `JsonBody`, so failures share one
//! JSON shape.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

pub mod auth;
pub mod dashboard;
pub mod directory;
pub mod health;
pub mod market;
pub mod media;
pub mod menus;
pub mod pages;
pub mod posts;
pub mod settings;
pub mod users;

/// MessageResponse
///
/// Acknowledgement body for deletions and other operations with nothing to return.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
