use async_graphql::{Error, ErrorExtensions};

use crate::entities::user::UserRole;
use crate::services::ServiceError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error occurred.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphqlError {
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Failed to get app state")]
    FailedToGetAppState,
    #[error("Login required")]
    LoginRequired,
    #[error("Forbidden: requires {0:?} role")]
    Forbidden(UserRole),
}

pub fn role_name(role: UserRole) -> &'static str {
    match role {
        UserRole::Host => "Host",
        UserRole::Listener => "Listener",
    }
}

impl Default for GraphqlError {
    fn default() -> Self {
        Self::ServerError("Unknown error".to_string())
    }
}

impl From<color_eyre::Report> for GraphqlError {
    fn from(report: color_eyre::Report) -> Self {
        // Log the full error report with trace chain for debugging
        log::error!("GraphQL error: {:#?}", report);
        Self::ServerError(report.to_string())
    }
}

impl From<ServiceError> for GraphqlError {
    fn from(err: ServiceError) -> Self {
        if err.is_internal() {
            log::error!("GraphQL error: {:?}", err);
            Self::ServerError(INTERNAL_ERROR_MESSAGE.to_string())
        } else {
            Self::ServerError(err.to_string())
        }
    }
}

impl ErrorExtensions for GraphqlError {
    fn extend(&self) -> Error {
        Error::new(format!("{}", self)).extend_with(|_err, e| match self {
            GraphqlError::ServerError(reason) => e.set("reason", reason.clone()),
            GraphqlError::FailedToGetAppState => {
                e.set("reason", "Failed to get app state".to_string())
            }
            GraphqlError::LoginRequired => e.set("code", "UNAUTHENTICATED"),
            GraphqlError::Forbidden(role) => {
                e.set("code", "FORBIDDEN");
                e.set("requiredRole", role_name(*role));
            }
        })
    }
}

// Newtype wrapper to avoid blanket From implementation conflict for GraphqlError and async_graphql::Error
#[derive(Debug, Clone)]
pub struct GraphqlErrorWrapper(GraphqlError);

impl From<GraphqlError> for GraphqlErrorWrapper {
    fn from(err: GraphqlError) -> Self {
        Self(err)
    }
}

impl From<GraphqlErrorWrapper> for Error {
    fn from(wrapper: GraphqlErrorWrapper) -> Self {
        wrapper.0.extend()
    }
}

impl From<color_eyre::Report> for GraphqlErrorWrapper {
    fn from(report: color_eyre::Report) -> Self {
        GraphqlError::from(report).into()
    }
}

impl From<ServiceError> for GraphqlErrorWrapper {
    fn from(err: ServiceError) -> Self {
        GraphqlError::from(err).into()
    }
}

pub type GraphqlResult<T> = Result<T, GraphqlErrorWrapper>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message_names_role() {
        assert_eq!(
            GraphqlError::Forbidden(UserRole::Host).to_string(),
            "Forbidden: requires Host role"
        );
        assert_eq!(GraphqlError::LoginRequired.to_string(), "Login required");
    }

    #[test]
    fn test_internal_service_error_is_masked() {
        let err = GraphqlError::from(ServiceError::Database(sea_orm::DbErr::Custom(
            "connection reset".into(),
        )));
        assert_eq!(err.to_string(), "Server error: Internal server error occurred.");

        let err = GraphqlError::from(ServiceError::NotOwner);
        assert_eq!(err.to_string(), "Server error: You are not owner of this");
    }
}
