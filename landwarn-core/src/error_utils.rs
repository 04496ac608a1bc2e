use crate::error::*;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_transient(&self) -> bool;
    fn user_friendly_message(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Api(e) => {
                error!("Notification API error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Seen-store error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_transient(),
            CoreError::Store(e) => e.is_transient(),
            CoreError::Network(_) => true,
            CoreError::Delivery { .. } => true,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Api(e) => e.user_friendly_message(),
            CoreError::Store(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::PreconditionFailed { message } => {
                format!("Cannot start: {}", message)
            }
            CoreError::Delivery { .. } => {
                "Alert could not be shown. Check notification permissions.".to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }
}

impl ErrorExt for ApiError {
    fn log_error(&self) -> &Self {
        error!("ApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ApiError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        match self {
            ApiError::RequestTimeout => true,
            ApiError::ServerError { .. } => true,
            ApiError::UnexpectedStatus { .. } => true,
            ApiError::EndpointUnavailable { .. } => true,
            // A malformed body this tick says nothing about the next one.
            ApiError::InvalidResponse { .. } => true,
            ApiError::NotificationNotFound { .. } => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ApiError::RequestTimeout => {
                "Request to the alert server timed out. Will retry on the next poll.".to_string()
            }
            ApiError::ServerError { .. } => {
                "The alert server reported an error. Will retry on the next poll.".to_string()
            }
            ApiError::NotificationNotFound { .. } => {
                "The requested notification no longer exists.".to_string()
            }
            _ => "Alert server error occurred. Will retry on the next poll.".to_string(),
        }
    }
}

impl ErrorExt for StoreError {
    fn log_error(&self) -> &Self {
        error!("StoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("StoreError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::DatabaseLocked | StoreError::ConnectionFailed { .. }
        )
    }

    fn user_friendly_message(&self) -> String {
        match self {
            StoreError::ConnectionFailed { .. } => {
                "Could not open the local alert database.".to_string()
            }
            StoreError::DatabaseLocked => {
                "The local alert database is temporarily busy.".to_string()
            }
            _ => "Local database error occurred.".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => {
                "Configuration file not found. Please check the installation.".to_string()
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_failures_are_transient() {
        assert!(ApiError::RequestTimeout.is_transient());
        assert!(ApiError::ServerError { status_code: 503 }.is_transient());
        assert!(ApiError::UnexpectedStatus { status_code: 404 }.is_transient());
        assert!(ApiError::InvalidResponse {
            details: "not json".to_string()
        }
        .is_transient());
        assert!(!ApiError::NotificationNotFound {
            notification_id: "n-1".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_transience_propagates_through_core_error() {
        let err: CoreError = ApiError::RequestTimeout.into();
        assert!(err.is_transient());

        let err = CoreError::PreconditionFailed {
            message: "user id must not be empty".to_string(),
        };
        assert!(!err.is_transient());

        let err: CoreError = ConfigError::MissingField {
            field: "user_id".to_string(),
        }
        .into();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_store_transience() {
        assert!(StoreError::DatabaseLocked.is_transient());
        assert!(StoreError::ConnectionFailed {
            reason: "file locked".to_string()
        }
        .is_transient());
        assert!(!StoreError::MigrationFailed {
            migration: "seen_ids".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_user_messages_name_the_field_or_action() {
        let err = CoreError::PreconditionFailed {
            message: "user id must not be empty".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Cannot start: user id must not be empty"
        );

        let err: CoreError = ConfigError::MissingField {
            field: "base_url".to_string(),
        }
        .into();
        assert!(err.user_friendly_message().contains("base_url"));

        let err: CoreError = ApiError::RequestTimeout.into();
        assert!(err.user_friendly_message().contains("next poll"));
    }
}
