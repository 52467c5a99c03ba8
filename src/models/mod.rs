use thiserror::Error;

pub mod content;
pub mod dashboard;
pub mod directory;
pub mod market;
pub mod media;
pub mod menu;
pub mod pagination;
pub mod setting;
pub mod user;

pub use content::{
    BlogPost, ContentFilter, ContentKind, ContentQuery, ContentStatus, CreatePageRequest,
    CreatePostRequest, Page, Publishable, UpdatePageRequest, UpdatePostRequest,
};
pub use dashboard::{ActivityItem, DashboardStats};
pub use media::MediaFile;
pub use menu::{Menu, MenuInput, MenuItem, MenuItemInput};
pub use pagination::{PageRequest, Paginated, Pagination};
pub use setting::{
    BatchUpdateRequest, CreateSettingRequest, Setting, SettingBatchItem, SettingQuery,
    UpdateSettingRequest,
};
pub use user::{
    AuthResponse, ChangePasswordRequest, CreateUserRequest, LoginRequest, NewUser,
    RegisterRequest, Role, UpdateProfileRequest, UpdateUserAccessRequest, User, UserQuery,
};

/// A request payload that failed its field rules. Rendered as 400 by the HTTP layer.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A stored enum column held a value outside the known set.
#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Validate
///
/// Field-level rules checked by handlers before anything reaches the store.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_one_of(
    value: &str,
    allowed: &[&str],
    field: &str,
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::new(format!(
        "{field} must be one of: {}",
        allowed.join(", ")
    )))
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}
