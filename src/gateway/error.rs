use thiserror::Error;

use crate::core::ContractError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transaction failed: {0}")]
    Contract(#[from] ContractError),
    /// Occurs when a wallet holds no identity under the requested label.
    #[error("no identity {0} in wallet")]
    UnknownIdentity(String),
    #[error("world state lock poisoned")]
    StateLock,
    #[error("failed to access wallet: {0}")]
    WalletIo(#[from] std::io::Error),
    #[error("malformed wallet: {0}")]
    WalletFormat(#[from] serde_json::Error)
}

pub type GatewayResult<T> = Result<T, GatewayError>;
