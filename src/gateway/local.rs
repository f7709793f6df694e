use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, warn};

use crate::backend::{Overlay, WorldState};
use crate::core::{CarContract, CarTransaction, ContractError, Identity, TransactionContext};
use crate::gateway::connection::LedgerConnection;
use crate::gateway::error::{GatewayError, GatewayResult};

/// In-process stand-in for a ledger network: runs the car contract
/// against one world state, one transaction at a time.
pub struct LocalGateway<S: WorldState> {
    state: Mutex<S>,
    contract: CarContract,
    channel: String
}

impl<S: WorldState + Send> LocalGateway<S> {
    pub fn new(state: S, channel: &str) -> Arc<LocalGateway<S>> {
        Arc::new(LocalGateway { state: Mutex::new(state), contract: CarContract, channel: channel.to_owned() })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Opens a connection whose transactions run on behalf of `identity`.
    pub fn connect(self: &Arc<Self>, identity: Identity) -> Connection<S> {
        debug!("{} connected to {}/{}", identity, self.channel, CarContract::NAME);
        Connection { gateway: Arc::clone(self), identity }
    }

    fn execute(&self, identity: &Identity, name: &str, args: &[String], commit: bool) -> GatewayResult<Vec<u8>> {
        let tx = CarTransaction::parse(name, args)?;
        let mut state = self.state.lock().map_err(|_| GatewayError::StateLock)?;

        let (payload, writes) = {
            let mut overlay = Overlay::new(&*state);
            let payload = {
                let mut ctx = TransactionContext::new(&mut overlay, identity, Utc::now());
                self.contract.invoke(&mut ctx, tx)?
            };
            (payload, overlay.into_writes())
        };

        if commit && !writes.is_empty() {
            Overlay::commit(writes, &mut *state).map_err(ContractError::from)?;
        }
        return Ok(payload);
    }

    fn run(&self, identity: &Identity, name: &str, args: &[String], commit: bool) -> GatewayResult<Vec<u8>> {
        let kind = if commit { "submit" } else { "evaluate" };
        debug!("{} {}({}) on {} as {}", kind, name, args.join(", "), self.channel, identity);

        let result = self.execute(identity, name, args, commit);
        if let Err(err) = &result {
            warn!("{} {} failed: {}", kind, name, err);
        }
        result
    }
}

/// A gateway connection bound to a single identity.
pub struct Connection<S: WorldState> {
    gateway: Arc<LocalGateway<S>>,
    identity: Identity
}

impl<S: WorldState> Connection<S> {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl<S: WorldState + Send> LedgerConnection for Connection<S> {
    fn evaluate_transaction(&self, name: &str, args: &[String]) -> GatewayResult<Vec<u8>> {
        self.gateway.run(&self.identity, name, args, false)
    }

    fn submit_transaction(&self, name: &str, args: &[String]) -> GatewayResult<Vec<u8>> {
        self.gateway.run(&self.identity, name, args, true)
    }
}


#[cfg(test)]
mod tests {
    use crate::backend::{JsonStore, MemoryStore, WorldState};
    use crate::core::{Car, CarStatus, CarTransaction, ContractError, Identity, Role};
    use crate::gateway::{GatewayError, LedgerConnection, LocalGateway};

    use rstest::{fixture, rstest};
    use std::sync::Arc;

    type Gateway = Arc<LocalGateway<MemoryStore>>;

    #[fixture]
    fn gateway() -> Gateway {
        LocalGateway::new(MemoryStore::new(), "mychannel")
    }

    fn manufacturer() -> Identity {
        Identity::new("Org1MSP", "factory", Role::Manufacturer)
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn create_args() -> Vec<String> {
        strings(&["MOrg03", "M105", "2022", "MOrg03CM101", "White", "2022/05/01", "450000"])
    }

    fn query(gateway: &Gateway, car_id: &str) -> Result<Car, GatewayError> {
        let conn = gateway.connect(Identity::new("Org1MSP", "reader", Role::Client));
        let bytes = conn.evaluate(&CarTransaction::QueryCar { car_id: car_id.to_owned() })?;
        Ok(serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    fn submit_commits(gateway: Gateway) {
        let conn = gateway.connect(manufacturer());
        let payload = conn.submit_transaction("createNewCar", &create_args()).unwrap();
        assert!(payload.is_empty());
        assert_eq!(query(&gateway, "M105").unwrap().status, CarStatus::Created);
    }

    #[rstest]
    fn evaluate_discards_writes(gateway: Gateway) {
        let conn = gateway.connect(manufacturer());
        conn.evaluate_transaction("createNewCar", &create_args()).unwrap();
        assert!(matches!(query(&gateway, "M105"),
            Err(GatewayError::Contract(ContractError::NotFound(_)))));
    }

    #[rstest]
    fn failed_submit_leaves_state_untouched(gateway: Gateway) {
        let conn = gateway.connect(manufacturer());
        conn.submit_transaction("createNewCar", &create_args()).unwrap();

        let res = conn.submit_transaction("ReceiveDelivery", &strings(&["M105"]));
        assert!(matches!(res, Err(GatewayError::Contract(ContractError::Unauthorized { .. }))));
        assert_eq!(query(&gateway, "M105").unwrap().status, CarStatus::Created);
    }

    #[test]
    fn failed_commit_is_not_visible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let gateway = LocalGateway::new(JsonStore::open(&path).unwrap(), "mychannel");
        let conn = gateway.connect(manufacturer());

        // a directory in place of the state file makes every flush fail
        std::fs::create_dir(&path).unwrap();
        let res = conn.submit_transaction("createNewCar", &create_args());
        assert!(matches!(res, Err(GatewayError::Contract(ContractError::Backend(_)))));

        let reader = gateway.connect(Identity::new("Org1MSP", "reader", Role::Client));
        let res = reader.evaluate(&CarTransaction::QueryCar { car_id: "M105".to_owned() });
        assert!(matches!(res, Err(GatewayError::Contract(ContractError::NotFound(_)))));
        assert_eq!(reader.evaluate(&CarTransaction::QueryAllCars).unwrap(), b"[]");

        std::fs::remove_dir(&path).unwrap();
        conn.submit_transaction("createNewCar", &create_args()).unwrap();
        let stored = JsonStore::open(&path).unwrap();
        assert!(stored.get_state("M105").unwrap().is_some());
    }

    #[rstest]
    fn unknown_transaction_is_reported(gateway: Gateway) {
        let conn = gateway.connect(manufacturer());
        let res = conn.evaluate_transaction("DeleteCar", &[]);
        assert!(matches!(res, Err(GatewayError::Contract(ContractError::UnknownTransaction(_)))));
    }

    #[rstest]
    fn query_all_returns_json_results(gateway: Gateway) {
        let conn = gateway.connect(manufacturer());
        conn.submit(&CarTransaction::InitLedger).unwrap();
        let bytes = conn.evaluate(&CarTransaction::QueryAllCars).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[0]["Key"], "CAR0");
        assert_eq!(value[0]["Record"]["carId"], "M101");
    }

    #[rstest]
    fn connections_share_state(gateway: Gateway) {
        assert_eq!(gateway.channel(), "mychannel");
        let maker = gateway.connect(manufacturer());
        let seller = gateway.connect(Identity::new("Org2MSP", "showroom", Role::Dealer));
        maker.submit_transaction("createNewCar", &create_args()).unwrap();
        maker.submit_transaction("ShipToDealer", &strings(&["M105", "D101", "12000"])).unwrap();
        seller.submit_transaction("ReceiveDelivery", &strings(&["M105"])).unwrap();
        assert_eq!(seller.identity().role, Role::Dealer);
        assert_eq!(query(&gateway, "M105").unwrap().status, CarStatus::ReadyForSale);
    }
}
