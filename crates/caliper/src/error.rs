use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] caliper_schema::Error),

    #[error("no model registered as `{0}`")]
    NotRegistered(String),
}
