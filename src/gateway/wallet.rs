use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Serialize, Deserialize};

use crate::core::{Identity, Role};
use crate::gateway::error::{GatewayError, GatewayResult};

/// Labelled identities a client may connect as.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet {
    identities: BTreeMap<String, Identity>
}

impl Wallet {
    pub const APP_USER: &'static str = "CarDemoappUser";
    pub const MANUFACTURER: &'static str = "manufacturer";
    pub const DEALER: &'static str = "dealer";

    pub fn new() -> Wallet {
        Wallet::default()
    }

    /// Identities enrolled for the demo network.
    pub fn demo() -> Wallet {
        let mut wallet = Wallet::new();
        wallet.put(Self::APP_USER, Identity::new("Org1MSP", "User1", Role::Client));
        wallet.put(Self::MANUFACTURER, Identity::new("Org1MSP", "MOrg03", Role::Manufacturer));
        wallet.put(Self::DEALER, Identity::new("Org2MSP", "D101", Role::Dealer));
        wallet
    }

    pub fn read(path: impl AsRef<Path>) -> GatewayResult<Wallet> {
        let content = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }

    /// Reads the wallet at `path`, writing the demo identities there
    /// first if no wallet exists yet.
    pub fn read_or_populate(path: impl AsRef<Path>) -> GatewayResult<Wallet> {
        let path = path.as_ref();
        if path.exists() {
            return Wallet::read(path);
        }
        let wallet = Wallet::demo();
        wallet.save(path)?;
        info!("populated wallet {} with demo identities", path.display());
        return Ok(wallet);
    }

    pub fn save(&self, path: impl AsRef<Path>) -> GatewayResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        return Ok(());
    }

    pub fn exists(&self, label: &str) -> bool {
        self.identities.contains_key(label)
    }

    pub fn get(&self, label: &str) -> GatewayResult<&Identity> {
        self.identities.get(label)
            .ok_or_else(|| GatewayError::UnknownIdentity(label.to_owned()))
    }

    pub fn put(&mut self, label: &str, identity: Identity) {
        self.identities.insert(label.to_owned(), identity);
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.identities.keys().map(|label| label.as_str())
    }
}
