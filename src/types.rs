// Shared error types

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("could not read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend request failed: {0}")]
    Backend(#[from] crate::backend::BackendError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
