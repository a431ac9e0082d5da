use dioxus::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use crate::backend::transactions::{recent_transactions, Transaction, RECENT_TRANSACTIONS_LIMIT};
use crate::backend::wallet::WalletState;
use crate::backend::AppCmd;
use crate::components::common::{ConnectorRow, TransactionRow, WalletInfoBox};
use crate::components::modal::Modal;
use crate::components::AppState;
use crate::i18n::{language_name, I18n};

/// Component-local toggles. Cleared when the modal closes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModalToggles {
    pub is_wallet_list_active: bool,
    pub is_languages_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dismiss {
    CloseLanguages,
    CloseModal,
}

impl ModalToggles {
    /// An open language picker swallows the dismiss.
    pub fn dismiss(&mut self) -> Dismiss {
        if self.is_languages_open {
            self.is_languages_open = false;
            Dismiss::CloseLanguages
        } else {
            *self = Self::default();
            Dismiss::CloseModal
        }
    }

    pub fn open_wallet_list(&mut self) {
        self.is_wallet_list_active = true;
    }

    pub fn back(&mut self) {
        self.is_wallet_list_active = false;
    }

    pub fn open_languages(&mut self) {
        self.is_languages_open = true;
    }

    pub fn select_language(&mut self, i18n: &mut I18n, code: &str) -> bool {
        let changed = i18n.set_locale(code);
        self.is_languages_open = false;
        changed
    }
}

pub struct ModalInputs<'a> {
    pub wallet: &'a WalletState,
    pub transactions: &'a [Transaction],
    pub toggles: ModalToggles,
    pub title: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorOption {
    pub id: String,
    pub name: String,
    pub disabled: bool,
    pub active: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionPanel {
    Empty { message: String },
    Recent { heading: String, transactions: Vec<Transaction>, clear_label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalBody {
    SwitchNetwork { message: String },
    Connectors { options: Vec<ConnectorOption>, error: Option<String> },
    Languages(Vec<LanguageEntry>),
    Account { language_label: String, language_name: String, transactions: TransactionPanel },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalHeader {
    Text(String),
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModalAction {
    Disconnect,
    SwitchNetwork { chain_id: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    pub body: ModalBody,
    pub header: ModalHeader,
    pub primary_action: Option<ModalAction>,
    pub primary_action_label: Option<String>,
}

/// Selectable connectors; the read-only pseudo-connector is never offered.
pub fn connector_options(wallet: &WalletState) -> Vec<ConnectorOption> {
    wallet
        .connectors
        .iter()
        .filter(|c| !c.is_read_only())
        .map(|c| {
            let is_active = wallet.active_connector.as_deref() == Some(c.id.as_str());
            ConnectorOption {
                id: c.id.clone(),
                name: c.name.clone(),
                disabled: !c.ready,
                active: is_active && wallet.is_connected(),
                loading: is_active && wallet.is_connecting(),
            }
        })
        .collect()
}

/// Clicking the active connector, connected or still connecting, is a no-op.
pub fn should_connect(wallet: &WalletState, connector_id: &str) -> bool {
    wallet.active_connector.as_deref() != Some(connector_id)
}

fn transaction_panel(transactions: &[Transaction], i18n: &I18n) -> TransactionPanel {
    let recent = recent_transactions(transactions, RECENT_TRANSACTIONS_LIMIT);
    if recent.is_empty() {
        TransactionPanel::Empty {
            message: i18n.t("transactions.yourTransactionsWillAppearHere"),
        }
    } else {
        TransactionPanel::Recent {
            heading: i18n.t("transactions.recentTransactions"),
            transactions: recent,
            clear_label: i18n.t("transactions.clearAll"),
        }
    }
}

pub fn derive_modal_view(inputs: &ModalInputs, i18n: &I18n) -> ModalView {
    let wallet = inputs.wallet;
    let toggles = inputs.toggles;
    let connected = wallet.is_connected();

    if connected && wallet.chain_unsupported() {
        let first_supported = wallet.chains.first();
        return ModalView {
            body: ModalBody::SwitchNetwork {
                message: i18n.t("connections.pleaseSwitchNetwork"),
            },
            header: ModalHeader::Text(i18n.t("connections.unsupportedNetwork")),
            primary_action: first_supported
                .filter(|_| wallet.can_switch_network)
                .map(|chain| ModalAction::SwitchNetwork { chain_id: chain.id }),
            primary_action_label: first_supported
                .map(|chain| {
                    let args = [("chainName", chain.name.as_str())];
                    i18n.t_with("connections.switchNetworkTo", &args)
                }),
        };
    }

    if !connected || toggles.is_wallet_list_active || wallet.is_read_only() {
        let managing = connected && toggles.is_wallet_list_active && !wallet.is_read_only();
        let header = if managing {
            ModalHeader::Back
        } else {
            ModalHeader::Text(
                inputs
                    .title
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| i18n.t("connections.connectToAWallet")),
            )
        };
        return ModalView {
            body: ModalBody::Connectors {
                options: connector_options(wallet),
                error: wallet.connection_error.clone(),
            },
            header,
            primary_action: managing.then_some(ModalAction::Disconnect),
            primary_action_label: managing.then(|| i18n.t("connections.disconnect")),
        };
    }

    if toggles.is_languages_open {
        let entries = i18n
            .supported()
            .iter()
            .map(|code| LanguageEntry {
                code: code.clone(),
                name: language_name(code),
                selected: code == i18n.locale(),
            })
            .collect();
        return ModalView {
            body: ModalBody::Languages(entries),
            header: ModalHeader::Text(i18n.t("language.languages")),
            primary_action: None,
            primary_action_label: None,
        };
    }

    ModalView {
        body: ModalBody::Account {
            language_label: i18n.t("language.language"),
            language_name: language_name(i18n.locale()),
            transactions: transaction_panel(inputs.transactions, i18n),
        },
        header: ModalHeader::Text(i18n.t("connections.account")),
        primary_action: None,
        primary_action_label: None,
    }
}

fn send(cmd_tx: &UnboundedSender<AppCmd>, cmd: AppCmd) {
    if let Err(e) = cmd_tx.send(cmd) {
        tracing::error!("Failed to send command: {:?}", e);
    }
}

#[component]
pub fn WalletModal(
    is_open: bool,
    on_close: EventHandler<()>,
    #[props(!optional)] title: Option<String>,
) -> Element {
    let app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();
    let mut toggles = use_signal(ModalToggles::default);

    if !is_open {
        return rsx! {};
    }

    let wallet = app_state.wallet.read().clone();
    let i18n = app_state.i18n.read().clone();
    let transactions = app_state.transactions.read().clone();
    let view = derive_modal_view(
        &ModalInputs {
            wallet: &wallet,
            transactions: &transactions,
            toggles: toggles(),
            title: title.as_deref(),
        },
        &i18n,
    );

    let header = match view.header {
        ModalHeader::Text(text) => rsx! { span { "{text}" } },
        ModalHeader::Back => rsx! {
            button {
                class: "modal-back",
                onclick: move |_| toggles.write().back(),
                "←"
            }
        },
    };

    let primary_action = view.primary_action;
    let cmd_tx_confirm = cmd_tx.clone();
    let on_confirm = move |_: ()| match primary_action {
        Some(ModalAction::Disconnect) => {
            send(&cmd_tx_confirm, AppCmd::DisconnectWallet);
            toggles.write().back();
        }
        Some(ModalAction::SwitchNetwork { chain_id }) => {
            send(&cmd_tx_confirm, AppCmd::SwitchNetwork { chain_id });
        }
        None => {}
    };

    let body = match view.body {
        ModalBody::SwitchNetwork { message } => rsx! {
            div { class: "modal-container", "{message}" }
        },
        ModalBody::Connectors { options, error } => rsx! {
            div { class: "modal-container",
                for option in options {
                    ConnectorRow {
                        key: "{option.id}",
                        option: option.clone(),
                        onclick: {
                            let cmd_tx = cmd_tx.clone();
                            let connector_id = option.id.clone();
                            let connect = should_connect(&wallet, &connector_id);
                            move |_: ()| {
                                if connect {
                                    let connector_id = connector_id.clone();
                                    send(&cmd_tx, AppCmd::ConnectWallet { connector_id });
                                }
                            }
                        },
                    }
                }
                if let Some(err) = error {
                    div { class: "connection-error", "{err}" }
                }
            }
        },
        ModalBody::Languages(entries) => rsx! {
            div { class: "language-list",
                for entry in entries {
                    div {
                        key: "{entry.code}",
                        class: "language",
                        onclick: {
                            let cmd_tx = cmd_tx.clone();
                            let code = entry.code.clone();
                            let mut i18n_signal = app_state.i18n;
                            move |_: Event<MouseData>| {
                                let mut i18n = i18n_signal.write();
                                if toggles.write().select_language(&mut i18n, &code) {
                                    send(&cmd_tx, AppCmd::SetLocale { code: code.clone() });
                                }
                            }
                        },
                        "{entry.name}"
                        if entry.selected {
                            span { class: "tick", "✓" }
                        }
                    }
                }
            }
        },
        ModalBody::Account { language_label, language_name, transactions } => rsx! {
            div {
                class: "language-bar",
                onclick: move |_| toggles.write().open_languages(),
                span { class: "language-title", "🌐 {language_label}" }
                span { class: "language-value", "{language_name} ›" }
            }
            WalletInfoBox {
                wallet: wallet.clone(),
                change_label: i18n.t("connections.change"),
                on_change: move |_| toggles.write().open_wallet_list(),
            }
            hr { class: "divider" }
            div { class: "transactions-list",
                {match transactions {
                    TransactionPanel::Empty { message } => rsx! {
                        div { class: "transactions-heading", "{message}" }
                    },
                    TransactionPanel::Recent { heading, transactions, clear_label } => rsx! {
                        div { class: "transactions-heading", "{heading}" }
                        hr { class: "divider" }
                        for tx in transactions {
                            TransactionRow { key: "{tx.hash}", transaction: tx.clone() }
                        }
                        div { class: "button-container",
                            button {
                                class: "btn btn-secondary",
                                onclick: {
                                    let cmd_tx = cmd_tx.clone();
                                    move |_: Event<MouseData>| {
                                        send(&cmd_tx, AppCmd::ClearAllTransactions)
                                    }
                                },
                                "{clear_label}"
                            }
                        }
                    },
                }}
            }
        },
    };

    rsx! {
        Modal {
            header: header,
            on_dismiss: move |_| {
                if toggles.write().dismiss() == Dismiss::CloseModal {
                    on_close.call(());
                }
            },
            on_confirm: on_confirm,
            confirm_text: view.primary_action_label.clone(),
            data_test_id: "wallet-modal",
            {body}
        }
    }
}
