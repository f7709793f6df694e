mod connection;
mod local;
mod wallet;
mod error;

pub use connection::LedgerConnection;
pub use local::{LocalGateway, Connection};
pub use wallet::Wallet;
pub use error::{GatewayError, GatewayResult};
