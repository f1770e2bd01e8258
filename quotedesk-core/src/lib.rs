pub mod identity;
pub mod validation;

pub use identity::{Identity, Role};
pub use validation::{ValidationError, ValidationIssue};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Persistence failed: {0}")]
    Persistence(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
