use std::{fs, net::SocketAddr, path::{Path, PathBuf}};
use serde::{Serialize, Deserialize};
use anyhow::Context;

use cardemo::{CarContract, Wallet};

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub state_file: PathBuf,
    pub wallet_file: PathBuf,
    pub default_identity: String,
    pub channel: String,
    pub chaincode: String
}

impl ServerConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(filepath)
            .with_context(|| "failed to read config file")?;
        let config: ServerConfig = toml::from_str(&file_content)
            .with_context(|| "failed to parse config file")?;
        if config.chaincode != CarContract::NAME {
            anyhow::bail!("unknown chaincode {}, this server serves {}", config.chaincode, CarContract::NAME);
        }
        return Ok(config);
    }
}

#[derive(Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub wallet: Wallet
}

impl AppConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let server = ServerConfig::read(filepath)?;

        let wallet = Wallet::read_or_populate(&server.wallet_file)
            .with_context(|| "failed to load wallet file")?;
        if !wallet.exists(&server.default_identity) {
            anyhow::bail!("default identity {} is not in the wallet", server.default_identity);
        }

        return Ok(AppConfig{ server, wallet });
    }
}


#[cfg(test)]
mod tests {
    use super::{AppConfig, ServerConfig};
    use cardemo::Wallet;

    fn write_config(dir: &std::path::Path, default_identity: &str, chaincode: &str) -> std::path::PathBuf {
        let path = dir.join("server.toml");
        let content = format!(
            "bind = \"127.0.0.1:10000\"\n\
             state_file = {:?}\n\
             wallet_file = {:?}\n\
             default_identity = \"{}\"\n\
             channel = \"mychannel\"\n\
             chaincode = \"{}\"\n",
            dir.join("world_state.json"), dir.join("wallet.json"), default_identity, chaincode);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_config_and_populates_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), Wallet::APP_USER, "cardemo");

        let config = AppConfig::read(&path).unwrap();
        assert_eq!(config.server.bind.port(), 10000);
        assert_eq!(config.server.channel, "mychannel");
        assert!(config.wallet.exists(Wallet::DEALER));
        assert!(dir.path().join("wallet.json").exists());
    }

    #[test]
    fn rejects_foreign_chaincode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), Wallet::APP_USER, "fabcar");
        assert!(ServerConfig::read(&path).is_err());
    }

    #[test]
    fn rejects_unknown_default_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "nobody", "cardemo");
        assert!(AppConfig::read(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ServerConfig::read("does/not/exist.toml").is_err());
    }
}
