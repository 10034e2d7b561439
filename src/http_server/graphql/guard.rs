use async_graphql::{Context, ErrorExtensions, Guard};

use crate::entities::user::UserRole;
use crate::http_server::graphql::context::get_caller;
use crate::http_server::graphql_error::GraphqlError;

/// Rejects anonymous requests, and optionally callers without a given role.
pub struct RoleGuard {
    role: Option<UserRole>,
}

impl RoleGuard {
    pub fn new(role: UserRole) -> Self {
        Self { role: Some(role) }
    }

    pub fn any() -> Self {
        Self { role: None }
    }
}

impl Guard for RoleGuard {
    async fn check(&self, ctx: &Context<'_>) -> async_graphql::Result<()> {
        let caller = get_caller(ctx).ok_or_else(|| GraphqlError::LoginRequired.extend())?;

        match self.role {
            Some(role) if caller.role != role => Err(GraphqlError::Forbidden(role).extend()),
            _ => Ok(()),
        }
    }
}
