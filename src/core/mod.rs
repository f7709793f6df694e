pub mod car;
pub mod identity;
pub mod transaction;
pub mod contract;
pub mod error;

pub use car::{Car, CarStatus, QueryResult};
pub use identity::{Identity, Role};
pub use transaction::CarTransaction;
pub use contract::{CarContract, TransactionContext};
pub use error::ContractError;
