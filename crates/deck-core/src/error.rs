use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{field} is required")]
    Validation { field: &'static str },

    #[error("no task with id {id}")]
    NotFound { id: u64 },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("persistent storage unavailable: {0}")]
    PersistenceUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
