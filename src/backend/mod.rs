pub mod metadata;
pub mod options;
pub mod proposal;
pub mod store;
pub mod subgraph;
pub mod transactions;
pub mod wallet;

use std::collections::HashMap;
use std::time::Duration;
use chrono::Utc;
use ethnum::U256;
#[cfg(target_arch = "wasm32")]
use futures::StreamExt;
use tokio::sync::mpsc;
use crate::config::Config;
use crate::i18n::I18n;
use metadata::ProposalMetadata;
use proposal::{parse_u256, ProposalOption};
use store::TransactionStore;
use subgraph::{RawProposal, SubgraphClient};
use transactions::{Transaction, TransactionReceipt};
use wallet::{ReadOnlyAdapter, Wallet, WalletAdapter, WalletState, READ_ONLY_CONNECTOR_ID};

#[derive(Debug)]
pub enum AppCmd {
    Init,
    FetchProposal { dao_id: String, proposal_id: String },
    FetchActiveProposals { dao_id: String },
    ConnectWallet { connector_id: String },
    DisconnectWallet,
    SwitchNetwork { chain_id: u64 },
    SetLocale { code: String },
    AddTransaction { hash: String, summary: String },
    FinalizeTransaction { hash: String, receipt: TransactionReceipt },
    ClearAllTransactions,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    ProposalFetched { proposal_id: String, proposal: Option<RawProposal> },
    ProposalFailed { proposal_id: String, message: String },
    MetadataFetched { content_hash: String, metadata: Option<ProposalMetadata> },
    TotalLockedFetched { dao_id: String, total_locked: Option<U256> },
    OptionsResolved { proposal_id: String, options: Vec<ProposalOption> },
    ActiveProposalsFetched { dao_id: String, count: Option<usize> },
    WalletUpdated(WalletState),
    TransactionsUpdated(Vec<Transaction>),
    QueryFailed { query: &'static str, message: String },
    CommandFailed { command: &'static str, message: String },
}

pub struct Backend {
    config: Config,
    subgraph: SubgraphClient,
    http: reqwest::Client,
    wallet: Wallet,
    store: TransactionStore,
    i18n: I18n,
    cmd_rx: mpsc::UnboundedReceiver<AppCmd>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    watched_dao: Option<String>,
    watched_proposal: Option<(String, String)>,
    metadata_cache: HashMap<String, ProposalMetadata>,
}

impl Backend {
    pub fn new(
        config: Config,
        store: TransactionStore,
        adapter: Box<dyn WalletAdapter>,
        cmd_rx: mpsc::UnboundedReceiver<AppCmd>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let i18n = I18n::new(&config.default_language, &config.supported_languages);
        Self {
            subgraph: SubgraphClient::new(&config.subgraph_url),
            http: reqwest::Client::new(),
            wallet: Wallet::new(adapter, config.chains.clone()),
            store,
            i18n,
            cmd_rx,
            event_tx,
            watched_dao: None,
            watched_proposal: None,
            metadata_cache: HashMap::new(),
            config,
        }
    }

    pub async fn run(&mut self) {
        let period = Duration::from_secs(self.config.refresh_interval_secs.max(1));

        #[cfg(not(target_arch = "wasm32"))]
        let mut refresh_interval = tokio::time::interval(period);

        #[cfg(target_arch = "wasm32")]
        let mut refresh_interval =
            gloo_timers::future::IntervalStream::new(period.as_millis() as u32);

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await,
                        None => {
                            tracing::info!("command channel closed, stopping backend");
                            break;
                        }
                    }
                }
                _ = async {
                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        refresh_interval.tick().await;
                    }
                    #[cfg(target_arch = "wasm32")]
                    {
                        refresh_interval.next().await;
                    }
                } => {
                    self.refresh().await;
                }
            }
        }
    }

    fn emit(&self, event: AppEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }

    fn command_failed(&self, command: &'static str, error: impl std::fmt::Display) {
        self.emit(AppEvent::CommandFailed { command, message: error.to_string() });
    }

    fn emit_wallet(&self) {
        self.emit(AppEvent::WalletUpdated(self.wallet.state().clone()));
    }

    /// Re-reads the history for the connected (chain, account) scope.
    fn emit_transactions(&self) {
        let state = self.wallet.state();
        let (Some(account), Some(chain)) = (state.account.as_deref(), state.chain.as_ref()) else {
            self.emit(AppEvent::TransactionsUpdated(Vec::new()));
            return;
        };
        match self.store.list(chain.id, account) {
            Ok(txs) => self.emit(AppEvent::TransactionsUpdated(txs)),
            Err(e) => {
                tracing::error!("failed to load transactions: {}", e);
                self.command_failed("loadTransactions", e);
            }
        }
    }

    fn connect(&mut self, connector_id: &str) {
        let state = self.wallet.state();
        if state.is_connected() && state.active_connector.as_deref() == Some(connector_id) {
            return;
        }
        self.wallet.begin_connect(connector_id);
        self.emit_wallet();
        self.wallet.finish_connect(connector_id);
        self.emit_wallet();
        self.emit_transactions();
    }

    async fn handle_command(&mut self, cmd: AppCmd) {
        match cmd {
            AppCmd::Init => {
                tracing::info!(subgraph = %self.config.subgraph_url, "backend initialized");
                self.connect(READ_ONLY_CONNECTOR_ID);
            }
            AppCmd::FetchProposal { dao_id, proposal_id } => {
                self.watched_dao = Some(dao_id.clone());
                self.watched_proposal = Some((dao_id, proposal_id));
                self.refresh_proposal().await;
            }
            AppCmd::FetchActiveProposals { dao_id } => {
                self.watched_dao = Some(dao_id);
                self.refresh_active_proposals().await;
            }
            AppCmd::ConnectWallet { connector_id } => {
                self.connect(&connector_id);
            }
            AppCmd::DisconnectWallet => {
                self.wallet.disconnect();
                self.emit_wallet();
                self.emit_transactions();
            }
            AppCmd::SwitchNetwork { chain_id } => match self.wallet.switch_network(chain_id) {
                Ok(()) => {
                    tracing::info!(chain_id, "switched network");
                    self.emit_wallet();
                    self.emit_transactions();
                }
                Err(e) => {
                    tracing::warn!(chain_id, "network switch failed: {}", e);
                    self.command_failed("switchNetwork", e);
                }
            },
            AppCmd::SetLocale { code } => {
                if self.i18n.set_locale(&code) {
                    // Option labels fall back to localized text.
                    self.refresh_proposal().await;
                }
            }
            AppCmd::AddTransaction { hash, summary } => {
                let state = self.wallet.state();
                let (Some(account), Some(chain)) = (state.account.clone(), state.chain.as_ref())
                else {
                    self.command_failed("addTransaction", crate::error::Error::NotConnected);
                    return;
                };
                let tx = Transaction {
                    hash,
                    from: account,
                    summary,
                    chain_id: chain.id,
                    added_time: Utc::now().timestamp_millis(),
                    receipt: None,
                    confirmed_time: None,
                };
                match self.store.add(&tx) {
                    Ok(()) => self.emit_transactions(),
                    Err(e) => {
                        tracing::error!(hash = %tx.hash, "failed to store transaction: {}", e);
                        self.command_failed("addTransaction", e);
                    }
                }
            }
            AppCmd::FinalizeTransaction { hash, receipt } => {
                match self.store.finalize(&hash, receipt, Utc::now().timestamp_millis()) {
                    Ok(Some(_)) => self.emit_transactions(),
                    Ok(None) => tracing::warn!(hash = %hash, "receipt for unknown transaction"),
                    Err(e) => {
                        tracing::error!(hash = %hash, "failed to finalize transaction: {}", e);
                        self.command_failed("finalizeTransaction", e);
                    }
                }
            }
            AppCmd::ClearAllTransactions => {
                let state = self.wallet.state();
                let scope = (state.account.as_deref(), state.chain.as_ref());
                if let (Some(account), Some(chain)) = scope {
                    match self.store.clear_all(chain.id, account) {
                        Ok(removed) => tracing::info!(removed, "cleared transaction history"),
                        Err(e) => {
                            tracing::error!("failed to clear transactions: {}", e);
                            self.command_failed("clearAllTransactions", e);
                            return;
                        }
                    }
                }
                self.emit_transactions();
            }
        }
    }

    async fn refresh(&mut self) {
        self.refresh_active_proposals().await;
        self.refresh_proposal().await;
    }

    async fn refresh_active_proposals(&mut self) {
        let Some(dao_id) = self.watched_dao.clone() else {
            return;
        };
        match self.subgraph.active_proposals(&dao_id).await {
            Ok(count) => self.emit(AppEvent::ActiveProposalsFetched { dao_id, count }),
            Err(e) => {
                tracing::warn!(dao = %dao_id, "active proposals query failed: {}", e);
                self.emit(AppEvent::QueryFailed {
                    query: "activeProposals",
                    message: e.to_string(),
                });
            }
        }
    }

    async fn refresh_proposal(&mut self) {
        let Some((dao_id, proposal_id)) = self.watched_proposal.clone() else {
            return;
        };

        let raw = match self.subgraph.proposal(&dao_id, &proposal_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(proposal = %proposal_id, "proposal query failed: {}", e);
                self.emit(AppEvent::ProposalFailed { proposal_id, message: e.to_string() });
                return;
            }
        };
        self.emit(AppEvent::ProposalFetched {
            proposal_id: proposal_id.clone(),
            proposal: raw.clone(),
        });
        let Some(raw) = raw else {
            return;
        };

        let metadata = self.metadata(&raw.content_hash).await;
        self.emit(AppEvent::MetadataFetched {
            content_hash: raw.content_hash.clone(),
            metadata: metadata.clone(),
        });

        let total_locked = match self.subgraph.total_locked(&dao_id).await {
            Ok(total) => total.and_then(|t| match parse_u256("totalLocked", &t) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("ignoring total locked: {}", e);
                    None
                }
            }),
            Err(e) => {
                tracing::warn!(dao = %dao_id, "total locked query failed: {}", e);
                self.emit(AppEvent::QueryFailed { query: "totalLocked", message: e.to_string() });
                None
            }
        };
        self.emit(AppEvent::TotalLockedFetched { dao_id, total_locked });

        self.resolve_options(&proposal_id, &raw, metadata.as_ref());
    }

    fn resolve_options(
        &self,
        proposal_id: &str,
        raw: &RawProposal,
        metadata: Option<&ProposalMetadata>,
    ) {
        match options::enumerate_options(raw, metadata, &self.i18n) {
            Ok(options) => self.emit(AppEvent::OptionsResolved {
                proposal_id: proposal_id.to_string(),
                options,
            }),
            Err(e) => {
                tracing::warn!(proposal = proposal_id, "could not enumerate options: {}", e);
                self.emit(AppEvent::QueryFailed { query: "options", message: e.to_string() });
            }
        }
    }

    /// Metadata documents are immutable per content hash, so they are fetched once.
    async fn metadata(&mut self, content_hash: &str) -> Option<ProposalMetadata> {
        if let Some(cached) = self.metadata_cache.get(content_hash) {
            return Some(cached.clone());
        }
        match metadata::fetch_metadata(&self.http, &self.config.ipfs_gateway, content_hash).await {
            Ok(Some(meta)) => {
                self.metadata_cache.insert(content_hash.to_string(), meta.clone());
                Some(meta)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(content_hash, "metadata fetch failed: {}", e);
                None
            }
        }
    }
}

pub async fn init(
    config: Config,
    cmd_rx: mpsc::UnboundedReceiver<AppCmd>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) {
    let store = match TransactionStore::new(&config.store_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(
                path = %config.store_path,
                "failed to open store, history will not persist: {}",
                e
            );
            match TransactionStore::new_in_memory() {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("failed to create in-memory store: {}", e);
                    return;
                }
            }
        }
    };

    let adapter = Box::new(ReadOnlyAdapter::new(config.default_chain_id()));
    let mut backend = Backend::new(config, store, adapter, cmd_rx, event_tx);
    backend.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::wallet::INJECTED_CONNECTOR_ID;

    fn backend() -> (Backend, mpsc::UnboundedReceiver<AppEvent>) {
        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let config = Config::default();
        let store = TransactionStore::new_in_memory().unwrap();
        let adapter = Box::new(ReadOnlyAdapter::new(config.default_chain_id()));
        (Backend::new(config, store, adapter, cmd_rx, event_tx), event_rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn last_wallet(events: &[AppEvent]) -> Option<WalletState> {
        events.iter().rev().find_map(|e| match e {
            AppEvent::WalletUpdated(state) => Some(state.clone()),
            _ => None,
        })
    }

    fn last_transactions(events: &[AppEvent]) -> Option<Vec<Transaction>> {
        events.iter().rev().find_map(|e| match e {
            AppEvent::TransactionsUpdated(txs) => Some(txs.clone()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn test_init_connects_read_only() {
        let (mut backend, mut events) = backend();
        backend.handle_command(AppCmd::Init).await;

        let events = drain(&mut events);
        let first = match &events[0] {
            AppEvent::WalletUpdated(state) => state.clone(),
            other => panic!("unexpected event {:?}", other),
        };
        assert!(first.is_connecting());

        let state = last_wallet(&events).expect("wallet event");
        assert!(state.is_connected());
        assert!(state.is_read_only());
        assert_eq!(last_transactions(&events), Some(vec![]));
    }

    #[tokio::test]
    async fn test_connection_error_is_reported_on_state() {
        let (mut backend, mut events) = backend();
        backend
            .handle_command(AppCmd::ConnectWallet {
                connector_id: INJECTED_CONNECTOR_ID.to_string(),
            })
            .await;

        let state = last_wallet(&drain(&mut events)).expect("wallet event");
        assert!(!state.is_connected());
        assert!(state.connection_error.is_some());
    }

    #[tokio::test]
    async fn test_transaction_history_lifecycle() {
        let (mut backend, mut events) = backend();
        backend.handle_command(AppCmd::Init).await;
        drain(&mut events);

        backend
            .handle_command(AppCmd::AddTransaction {
                hash: "0xaa".to_string(),
                summary: "Vote".to_string(),
            })
            .await;
        let txs = last_transactions(&drain(&mut events)).expect("transactions");
        assert_eq!(txs.len(), 1);
        assert!(txs[0].is_pending());

        backend
            .handle_command(AppCmd::FinalizeTransaction {
                hash: "0xaa".to_string(),
                receipt: TransactionReceipt { success: true, block_number: 7 },
            })
            .await;
        let txs = last_transactions(&drain(&mut events)).expect("transactions");
        assert!(!txs[0].is_pending());

        backend.handle_command(AppCmd::ClearAllTransactions).await;
        let txs = last_transactions(&drain(&mut events)).expect("transactions");
        assert!(txs.is_empty());
    }

    #[tokio::test]
    async fn test_add_transaction_requires_wallet() {
        let (mut backend, mut events) = backend();
        backend
            .handle_command(AppCmd::AddTransaction {
                hash: "0xaa".to_string(),
                summary: "Vote".to_string(),
            })
            .await;
        let failed = drain(&mut events);
        assert!(matches!(
            failed.as_slice(),
            [AppEvent::CommandFailed { command: "addTransaction", .. }]
        ));
    }

    #[tokio::test]
    async fn test_switch_network_to_unsupported_chain_fails() {
        let (mut backend, mut events) = backend();
        backend.handle_command(AppCmd::Init).await;
        drain(&mut events);

        backend.handle_command(AppCmd::SwitchNetwork { chain_id: 424242 }).await;
        let failed = drain(&mut events);
        assert!(matches!(
            failed.as_slice(),
            [AppEvent::CommandFailed { command: "switchNetwork", .. }]
        ));

        backend.handle_command(AppCmd::SwitchNetwork { chain_id: 100 }).await;
        let state = last_wallet(&drain(&mut events)).expect("wallet event");
        assert_eq!(state.chain.map(|c| c.id), Some(100));
    }
}
