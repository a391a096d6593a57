use thiserror::Error;

/// Failure of an underlying Record Store operation, carrying the operation
/// name so callers can log what was being attempted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{op} failed: {source}")]
    Backend {
        op: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{op}: malformed record: {detail}")]
    Corrupt { op: &'static str, detail: String },
}

impl StoreError {
    pub fn backend(
        op: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            op,
            source: source.into(),
        }
    }

    pub fn corrupt(op: &'static str, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            op,
            detail: detail.into(),
        }
    }

    /// The operation that failed, for structured log fields.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Backend { op, .. } => op,
            Self::Corrupt { op, .. } => op,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
