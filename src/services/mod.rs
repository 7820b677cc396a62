pub mod analytics_service;
pub mod cards_service;
pub mod contacts_service;
pub mod emails_service;
pub mod events_service;
pub mod lead_groups_service;
pub mod users_service;

use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::error::ApiError;
use crate::security::CryptoError;
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Uniqueness/referential/state-machine violation; maps to 409.
    #[error("{0}")]
    Conflict(String),

    /// Rules that need stored state to check (e.g. merged date order,
    /// cross-entity references); maps to 400 with field details.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Query failed: {0}")]
    Query(sqlx::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint();
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => return ServiceError::Conflict(unique_message(constraint)),
                // foreign_key_violation
                Some("23503") => return ServiceError::Conflict(reference_message(constraint)),
                _ => {}
            }
        }
        ServiceError::Query(err)
    }
}

fn unique_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("unique_org_email") => "A contact with this email already exists".to_string(),
        Some("unique_org_template_name") => {
            "An email template with this name already exists".to_string()
        }
        Some("gmail_connections_user_id_key") => {
            "A Gmail connection already exists for this user".to_string()
        }
        Some(name) => format!("Uniqueness constraint violated: {name}"),
        None => "Uniqueness constraint violated".to_string(),
    }
}

fn reference_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("contacts_event_id_fkey") => {
            "Event is referenced by existing contacts".to_string()
        }
        Some(name) => format!("Reference constraint violated: {name}"),
        None => "Reference constraint violated".to_string(),
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Validation(errors) => ApiError::from(errors),
            ServiceError::Database(e) => ApiError::internal_server_error(e.to_string()),
            ServiceError::Query(e) => ApiError::internal_server_error(e.to_string()),
            ServiceError::Crypto(e) => ApiError::internal_server_error(e.to_string()),
        }
    }
}
