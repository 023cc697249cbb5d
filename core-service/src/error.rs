use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Navigation error: {0}")]
    Router(#[from] core_router::RouterError),

    #[error("Upload error: {0}")]
    Upload(#[from] core_media::UploadError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
