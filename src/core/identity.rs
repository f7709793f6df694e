use std::fmt;

use serde::{Serialize, Deserialize};

/// Role claim carried by a caller identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manufacturer,
    Dealer,
    /// May read, may not move cars through their lifecycle.
    Client
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manufacturer => "manufacturer",
            Self::Dealer => "dealer",
            Self::Client => "client"
        };
        write!(f, "{}", name)
    }
}

/// The enrolled caller a transaction runs on behalf of.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub msp_id: String,
    pub id: String,
    pub role: Role
}

impl Identity {
    pub fn new(msp_id: &str, id: &str, role: Role) -> Identity {
        Identity { msp_id: msp_id.to_owned(), id: id.to_owned(), role }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.id, self.msp_id, self.role)
    }
}
