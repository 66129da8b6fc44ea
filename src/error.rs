use async_graphql::ErrorExtensions;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by the service layer. Every variant maps to a stable
/// `extensions.code` in GraphQL responses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{entity} with email '{email}' is already registered")]
    AlreadyExists { entity: &'static str, email: String },

    #[error("access denied: {entity} {id} belongs to another seller")]
    AccessDenied { entity: &'static str, id: Uuid },

    #[error(
        "insufficient stock for '{name}' ({product_id}): requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: Uuid,
        name: String,
        requested: i32,
        available: i32,
    },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("storage failure")]
    Storage(#[from] sqlx::Error),

    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::AccessDenied { .. } => "ACCESS_DENIED",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Validation(_) => "VALIDATION",
            Self::Storage(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Internal(_))
    }
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        // Backend details stay in the logs.
        let message = if self.is_internal() {
            error!(error = ?self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", self.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let id = Uuid::new_v4();
        assert_eq!(ServiceError::not_found("order", id).code(), "NOT_FOUND");
        assert_eq!(
            ServiceError::AccessDenied { entity: "client", id }.code(),
            "ACCESS_DENIED"
        );
        assert_eq!(ServiceError::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(ServiceError::Storage(sqlx::Error::RowNotFound).code(), "INTERNAL");
    }

    #[test]
    fn insufficient_stock_names_the_product() {
        let err = ServiceError::InsufficientStock {
            product_id: Uuid::nil(),
            name: "Laptop".into(),
            requested: 3,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Laptop"));
        assert!(msg.contains("requested 3"));
        assert!(msg.contains("available 2"));
    }

    #[test]
    fn internal_errors_hide_details_from_clients() {
        let err = ServiceError::Internal(anyhow::anyhow!("argon2 exploded"));
        let gql = err.extend();
        assert_eq!(gql.message, "internal server error");
    }
}
