//! Role → capability policy and the middleware that enforces it per route group.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{auth::AuthUser, error::ApiError, models::Role};

/// Capability
///
/// What a route group requires. Handlers never compare roles directly; they are
/// mounted behind exactly one capability gate instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Pages, posts, menus, directories and media.
    ManageContent,
    ManageUsers,
    ManageSettings,
    AccessMarketData,
    AccessRealTimeData,
    AccessHistoricalData,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ManageContent => "manage_content",
            Capability::ManageUsers => "manage_users",
            Capability::ManageSettings => "manage_settings",
            Capability::AccessMarketData => "access_market_data",
            Capability::AccessRealTimeData => "access_realtime_data",
            Capability::AccessHistoricalData => "access_historical_data",
        }
    }
}

impl Role {
    pub fn can(self, capability: Capability) -> bool {
        use Role::*;
        match capability {
            Capability::ManageContent => matches!(self, Admin | Blogger),
            Capability::ManageUsers | Capability::ManageSettings => self == Admin,
            Capability::AccessMarketData => matches!(self, Admin | Trader | Premium | User),
            Capability::AccessRealTimeData | Capability::AccessHistoricalData => {
                matches!(self, Admin | Trader | Premium)
            }
        }
    }
}

/// Returns the 403 a caller gets when their role lacks `capability`.
pub fn ensure(user: &AuthUser, capability: Capability) -> Result<(), ApiError> {
    if user.role.can(capability) {
        return Ok(());
    }
    tracing::info!(
        user_id = user.id,
        role = %user.role,
        capability = capability.as_str(),
        "capability denied"
    );
    Err(ApiError::Forbidden("Insufficient permissions".to_string()))
}

/// require_capability
///
/// Route-group gate, mounted with `from_fn_with_state(capability, require_capability)`
/// inside `auth_middleware`, whose `AuthUser` it reads from the request extensions.
pub async fn require_capability(
    State(capability): State<Capability>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
    ensure(user, capability)?;
    Ok(next.run(request).await)
}
