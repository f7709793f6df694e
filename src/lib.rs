mod core;
pub mod backend;
pub mod gateway;

pub use crate::core::{Car, CarStatus, CarTransaction, CarContract, Identity, Role, QueryResult};
pub use crate::core::{car, contract, identity, transaction, error};
pub use crate::gateway::{LedgerConnection, LocalGateway, Wallet};
