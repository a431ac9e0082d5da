use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Id of the view-only pseudo-connector. It is never offered as a choice.
pub const READ_ONLY_CONNECTOR_ID: &str = "readOnly";
pub const INJECTED_CONNECTOR_ID: &str = "injected";
/// Account reported while browsing through the read-only connector.
pub const READ_ONLY_ACCOUNT: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletConnector {
    pub id: String,
    pub name: String,
    pub ready: bool,
}

impl WalletConnector {
    pub fn is_read_only(&self) -> bool {
        self.id == READ_ONLY_CONNECTOR_ID
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveChain {
    pub id: u64,
    pub name: String,
    pub unsupported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub account: String,
    pub chain_id: u64,
}

/// Snapshot of everything the UI knows about the wallet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WalletState {
    pub connectors: Vec<WalletConnector>,
    pub active_connector: Option<String>,
    pub account: Option<String>,
    pub status: ConnectionStatus,
    pub chain: Option<ActiveChain>,
    pub chains: Vec<Chain>,
    pub can_switch_network: bool,
    pub connection_error: Option<String>,
}

impl WalletState {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.status == ConnectionStatus::Connecting
    }

    pub fn is_read_only(&self) -> bool {
        self.active_connector.as_deref() == Some(READ_ONLY_CONNECTOR_ID)
    }

    pub fn chain_unsupported(&self) -> bool {
        self.chain.as_ref().map(|c| c.unsupported).unwrap_or(false)
    }
}

/// The narrow surface the client needs from a wallet provider.
pub trait WalletAdapter: Send {
    fn connectors(&self) -> Vec<WalletConnector>;
    fn connect(&mut self, connector_id: &str) -> Result<Connection>;
    fn disconnect(&mut self);
    fn switch_network(&mut self, chain_id: u64) -> Result<u64>;
    fn supports_network_switch(&self) -> bool;
}

/// Adapter used when no browser provider is wired in: the injected connector
/// is listed but never ready, and the read-only connector browses any chain.
pub struct ReadOnlyAdapter {
    chain_id: u64,
}

impl ReadOnlyAdapter {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }
}

impl WalletAdapter for ReadOnlyAdapter {
    fn connectors(&self) -> Vec<WalletConnector> {
        vec![
            WalletConnector {
                id: INJECTED_CONNECTOR_ID.to_string(),
                name: "Browser Wallet".to_string(),
                ready: false,
            },
            WalletConnector {
                id: READ_ONLY_CONNECTOR_ID.to_string(),
                name: "Read-only".to_string(),
                ready: true,
            },
        ]
    }

    fn connect(&mut self, connector_id: &str) -> Result<Connection> {
        match connector_id {
            READ_ONLY_CONNECTOR_ID => Ok(Connection {
                account: READ_ONLY_ACCOUNT.to_string(),
                chain_id: self.chain_id,
            }),
            INJECTED_CONNECTOR_ID => Err(Error::ConnectorNotReady(connector_id.to_string())),
            other => Err(Error::ConnectorNotFound(other.to_string())),
        }
    }

    fn disconnect(&mut self) {}

    fn switch_network(&mut self, chain_id: u64) -> Result<u64> {
        self.chain_id = chain_id;
        Ok(chain_id)
    }

    fn supports_network_switch(&self) -> bool {
        true
    }
}

pub struct Wallet {
    adapter: Box<dyn WalletAdapter>,
    state: WalletState,
}

impl Wallet {
    pub fn new(adapter: Box<dyn WalletAdapter>, chains: Vec<Chain>) -> Self {
        let state = WalletState {
            connectors: adapter.connectors(),
            can_switch_network: adapter.supports_network_switch(),
            chains,
            ..Default::default()
        };
        Self { adapter, state }
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    /// Marks `connector_id` as the connector being connected.
    pub fn begin_connect(&mut self, connector_id: &str) {
        self.state.active_connector = Some(connector_id.to_string());
        self.state.status = ConnectionStatus::Connecting;
        self.state.connection_error = None;
    }

    /// Completes a connection started with `begin_connect`. Failures are kept
    /// as a message on the state rather than returned.
    pub fn finish_connect(&mut self, connector_id: &str) {
        match self.adapter.connect(connector_id) {
            Ok(connection) => {
                self.state.account = Some(connection.account);
                self.state.status = ConnectionStatus::Connected;
                self.state.chain = Some(self.describe_chain(connection.chain_id));
            }
            Err(e) => {
                tracing::warn!(connector = connector_id, "wallet connection failed: {}", e);
                self.state.active_connector = None;
                self.state.account = None;
                self.state.status = ConnectionStatus::Disconnected;
                self.state.chain = None;
                self.state.connection_error = Some(e.to_string());
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.adapter.disconnect();
        self.state.active_connector = None;
        self.state.account = None;
        self.state.status = ConnectionStatus::Disconnected;
        self.state.chain = None;
        self.state.connection_error = None;
    }

    pub fn switch_network(&mut self, chain_id: u64) -> Result<()> {
        if !self.state.is_connected() {
            return Err(Error::NotConnected);
        }
        if !self.state.chains.iter().any(|c| c.id == chain_id) {
            return Err(Error::UnsupportedChain(chain_id));
        }
        let switched = self.adapter.switch_network(chain_id)?;
        self.state.chain = Some(self.describe_chain(switched));
        Ok(())
    }

    fn describe_chain(&self, chain_id: u64) -> ActiveChain {
        match self.state.chains.iter().find(|c| c.id == chain_id) {
            Some(chain) => ActiveChain {
                id: chain.id,
                name: chain.name.clone(),
                unsupported: false,
            },
            None => ActiveChain {
                id: chain_id,
                name: format!("Chain {}", chain_id),
                unsupported: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chains() -> Vec<Chain> {
        vec![
            Chain { id: 1, name: "Mainnet".to_string() },
            Chain { id: 100, name: "Gnosis".to_string() },
        ]
    }

    #[test]
    fn test_read_only_connects_on_default_chain() {
        let mut wallet = Wallet::new(Box::new(ReadOnlyAdapter::new(100)), chains());
        wallet.begin_connect(READ_ONLY_CONNECTOR_ID);
        assert!(wallet.state().is_connecting());

        wallet.finish_connect(READ_ONLY_CONNECTOR_ID);
        let state = wallet.state();
        assert!(state.is_connected());
        assert!(state.is_read_only());
        assert_eq!(state.account.as_deref(), Some(READ_ONLY_ACCOUNT));
        assert_eq!(state.chain.as_ref().map(|c| c.name.as_str()), Some("Gnosis"));
        assert!(!state.chain_unsupported());
    }

    #[test]
    fn test_failed_connection_keeps_error_message() {
        let mut wallet = Wallet::new(Box::new(ReadOnlyAdapter::new(1)), chains());
        wallet.begin_connect(INJECTED_CONNECTOR_ID);
        wallet.finish_connect(INJECTED_CONNECTOR_ID);

        let state = wallet.state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.active_connector.is_none());
        assert_eq!(state.connection_error.as_deref(), Some("connector injected is not ready"));
    }

    #[test]
    fn test_unknown_chain_is_flagged_unsupported() {
        let mut wallet = Wallet::new(Box::new(ReadOnlyAdapter::new(5)), chains());
        wallet.begin_connect(READ_ONLY_CONNECTOR_ID);
        wallet.finish_connect(READ_ONLY_CONNECTOR_ID);
        assert!(wallet.state().chain_unsupported());

        wallet.switch_network(1).expect("switch to mainnet");
        assert!(!wallet.state().chain_unsupported());
        assert!(matches!(wallet.switch_network(42), Err(Error::UnsupportedChain(42))));
    }

    #[test]
    fn test_switch_requires_connection() {
        let mut wallet = Wallet::new(Box::new(ReadOnlyAdapter::new(1)), chains());
        assert!(matches!(wallet.switch_network(1), Err(Error::NotConnected)));
    }
}
