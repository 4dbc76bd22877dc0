use aerix_core::model::UnknownVariant;
use aerix_core::principal::UnknownRole;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A persisted row no longer matches the domain model (bad status text,
    /// unparseable seat template). Indicates an out-of-band write.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<UnknownVariant> for StoreError {
    fn from(err: UnknownVariant) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

impl From<UnknownRole> for StoreError {
    fn from(err: UnknownRole) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}
