pub mod common;
pub mod home_page;
pub mod modal;
pub mod nav_bar;
pub mod proposal_page;
pub mod wallet_modal;

use dioxus::prelude::*;
use ethnum::U256;
use crate::backend::metadata::ProposalMetadata;
use crate::backend::proposal::ProposalOption;
use crate::backend::subgraph::RawProposal;
use crate::backend::transactions::Transaction;
use crate::backend::wallet::WalletState;
use crate::backend::AppEvent;
use crate::config::Config;
use crate::i18n::I18n;

/// Everything the proposal view model is built from, as last reported by
/// the backend for the watched (dao, proposal) pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProposalInputs {
    pub dao_id: Option<String>,
    pub proposal_id: Option<String>,
    pub raw: Option<RawProposal>,
    pub metadata: Option<ProposalMetadata>,
    pub total_locked: Option<U256>,
    pub options: Option<Vec<ProposalOption>>,
    pub loaded: bool,
    pub error: Option<String>,
}

impl ProposalInputs {
    pub fn watching(dao_id: &str, proposal_id: &str) -> Self {
        Self {
            dao_id: Some(dao_id.to_string()),
            proposal_id: Some(proposal_id.to_string()),
            ..Default::default()
        }
    }

    fn is_current(&self, proposal_id: &str) -> bool {
        self.proposal_id.as_deref() == Some(proposal_id)
    }

    fn is_current_dao(&self, dao_id: &str) -> bool {
        self.dao_id.as_deref() == Some(dao_id)
    }

    pub fn on_proposal(&mut self, proposal_id: &str, proposal: Option<RawProposal>) {
        if self.is_current(proposal_id) {
            self.raw = proposal;
            self.loaded = true;
            self.error = None;
        }
    }

    pub fn on_failure(&mut self, proposal_id: &str, message: String) {
        if self.is_current(proposal_id) {
            self.loaded = true;
            self.error = Some(message);
        }
    }

    pub fn on_metadata(&mut self, content_hash: &str, metadata: Option<ProposalMetadata>) {
        if self.raw.as_ref().map(|r| r.content_hash == content_hash).unwrap_or(false) {
            self.metadata = metadata;
        }
    }

    pub fn on_total_locked(&mut self, dao_id: &str, total_locked: Option<U256>) {
        if self.is_current_dao(dao_id) {
            self.total_locked = total_locked;
        }
    }

    pub fn on_options(&mut self, proposal_id: &str, options: Vec<ProposalOption>) {
        if self.is_current(proposal_id) {
            self.options = Some(options);
        }
    }
}

/// Active proposal count for the DAO shown on the home page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActiveProposals {
    pub dao_id: Option<String>,
    pub count: Option<usize>,
}

impl ActiveProposals {
    pub fn watching(dao_id: &str) -> Self {
        Self { dao_id: Some(dao_id.to_string()), count: None }
    }

    pub fn on_count(&mut self, dao_id: &str, count: Option<usize>) {
        if self.dao_id.as_deref() == Some(dao_id) {
            self.count = count;
        }
    }
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub wallet: Signal<WalletState>,
    pub i18n: Signal<I18n>,
    pub transactions: Signal<Vec<Transaction>>,
    pub proposal: Signal<ProposalInputs>,
    pub active_proposals: Signal<ActiveProposals>,
    pub wallet_modal_open: Signal<bool>,
    pub last_error: Signal<Option<String>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            wallet: Signal::new(WalletState::default()),
            i18n: Signal::new(I18n::new(&config.default_language, &config.supported_languages)),
            transactions: Signal::new(Vec::new()),
            proposal: Signal::new(ProposalInputs::default()),
            active_proposals: Signal::new(ActiveProposals::default()),
            wallet_modal_open: Signal::new(false),
            last_error: Signal::new(None),
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::ProposalFetched { proposal_id, proposal } => {
                self.proposal.write().on_proposal(&proposal_id, proposal);
            }
            AppEvent::ProposalFailed { proposal_id, message } => {
                tracing::warn!(proposal = %proposal_id, "proposal query failed: {}", message);
                self.proposal.write().on_failure(&proposal_id, message);
            }
            AppEvent::MetadataFetched { content_hash, metadata } => {
                self.proposal.write().on_metadata(&content_hash, metadata);
            }
            AppEvent::TotalLockedFetched { dao_id, total_locked } => {
                self.proposal.write().on_total_locked(&dao_id, total_locked);
            }
            AppEvent::OptionsResolved { proposal_id, options } => {
                self.proposal.write().on_options(&proposal_id, options);
            }
            AppEvent::ActiveProposalsFetched { dao_id, count } => {
                self.active_proposals.write().on_count(&dao_id, count);
            }
            AppEvent::WalletUpdated(state) => {
                self.wallet.set(state);
            }
            AppEvent::TransactionsUpdated(transactions) => {
                self.transactions.set(transactions);
            }
            AppEvent::QueryFailed { query, message } => {
                tracing::warn!(query, "query failed: {}", message);
                self.last_error.set(Some(message));
            }
            AppEvent::CommandFailed { command, message } => {
                tracing::warn!(command, "command failed: {}", message);
                self.last_error.set(Some(message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAO_A: &str = "0x00000000000000000000000000000000000000aa";
    const DAO_B: &str = "0x00000000000000000000000000000000000000bb";

    #[test]
    fn test_stale_total_locked_is_dropped() {
        let mut inputs = ProposalInputs::watching(DAO_B, "0x02");
        inputs.on_total_locked(DAO_A, Some(U256::from(500u32)));
        assert_eq!(inputs.total_locked, None);

        inputs.on_total_locked(DAO_B, Some(U256::from(900u32)));
        assert_eq!(inputs.total_locked, Some(U256::from(900u32)));
    }

    #[test]
    fn test_stale_proposal_failure_is_dropped() {
        let mut inputs = ProposalInputs::watching(DAO_A, "0x02");
        inputs.on_failure("0x01", "timeout".to_string());
        assert!(!inputs.loaded);
        assert!(inputs.error.is_none());

        inputs.on_failure("0x02", "timeout".to_string());
        assert!(inputs.loaded);
        assert_eq!(inputs.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_stale_proposal_and_options_are_dropped() {
        let mut inputs = ProposalInputs::watching(DAO_A, "0x02");
        inputs.on_proposal("0x01", None);
        inputs.on_options("0x01", Vec::new());
        assert!(!inputs.loaded);
        assert!(inputs.options.is_none());

        inputs.on_proposal("0x02", None);
        assert!(inputs.loaded);
    }

    #[test]
    fn test_active_count_only_for_watched_dao() {
        let mut active = ActiveProposals::watching(DAO_B);
        active.on_count(DAO_A, Some(3));
        assert_eq!(active.count, None);

        active.on_count(DAO_B, Some(1));
        assert_eq!(active.count, Some(1));
    }
}
