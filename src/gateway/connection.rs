use crate::core::CarTransaction;
use crate::gateway::error::GatewayResult;

/// The two primitives a client has on the ledger.
///
/// `evaluate_transaction` runs a transaction without committing anything.
/// `submit_transaction` commits the transaction's writes if, and only if,
/// it succeeds.
pub trait LedgerConnection: Send + Sync {
    fn evaluate_transaction(&self, name: &str, args: &[String]) -> GatewayResult<Vec<u8>>;
    fn submit_transaction(&self, name: &str, args: &[String]) -> GatewayResult<Vec<u8>>;

    fn evaluate(&self, tx: &CarTransaction) -> GatewayResult<Vec<u8>> {
        self.evaluate_transaction(tx.name(), &tx.args())
    }

    fn submit(&self, tx: &CarTransaction) -> GatewayResult<Vec<u8>> {
        self.submit_transaction(tx.name(), &tx.args())
    }
}
