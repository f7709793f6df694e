use thiserror::Error;

use crate::backend::BackendError;
use crate::core::{CarStatus, Role};

#[derive(Debug, Error)]
pub enum ContractError {
    /// Occurs when a key is read which holds no record in world state.
    #[error("{0} does not exist")]
    NotFound(String),
    /// Occurs when creating a car under a key that is already taken.
    #[error("{0} already exists")]
    AlreadyExists(String),
    /// Occurs when the caller's role claim does not allow the operation.
    #[error("unauthorized: requires role {required}, caller has role {actual}")]
    Unauthorized {
        required: Role,
        actual: Role
    },
    /// Occurs when an operation would move a car anywhere other than
    /// one step forward along its lifecycle.
    #[error("car {car_id} cannot move from {from} to {to}")]
    InvalidTransition {
        car_id: String,
        from: CarStatus,
        to: CarStatus
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no such transaction: {0}")]
    UnknownTransaction(String),
    #[error("malformed record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("world state failure: {0}")]
    Backend(#[from] BackendError)
}

pub type ContractResult<T> = Result<T, ContractError>;
