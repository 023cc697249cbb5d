use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Duplicate route name: {0}")]
    DuplicateRouteName(String),

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Route '{route}' requires parameter '{param}'")]
    MissingParam { route: String, param: String },

    #[error("Too many redirects while navigating to {path} (limit {limit})")]
    RedirectLoop { path: String, limit: usize },
}

pub type Result<T> = std::result::Result<T, RouterError>;
