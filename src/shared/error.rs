use uuid::Uuid;

/// Error surface of the data-access layer. Every kind is deterministic and
/// non-retryable; callers are expected to match on the kind, not the text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("unique constraint violated on {constraint}: {value:?}")]
    UniqueConstraintViolation {
        constraint: &'static str,
        value: String,
    },

    #[error("foreign key violation on {entity}.{field}: {target} {id}")]
    ForeignKeyViolation {
        entity: &'static str,
        field: &'static str,
        target: &'static str,
        id: Uuid,
    },

    #[error("validation failed: {0}")]
    Validation(String),
}

impl DataError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn unique(constraint: &'static str, value: impl Into<String>) -> Self {
        Self::UniqueConstraintViolation {
            constraint,
            value: value.into(),
        }
    }

    pub fn foreign_key(
        entity: &'static str,
        field: &'static str,
        target: &'static str,
        id: Uuid,
    ) -> Self {
        Self::ForeignKeyViolation {
            entity,
            field,
            target,
            id,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type DataResult<T> = Result<T, DataError>;
