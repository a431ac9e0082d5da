use dioxus::prelude::*;
use crate::backend::transactions::Transaction;
use crate::backend::wallet::WalletState;
use crate::components::wallet_modal::ConnectorOption;

/// `0x1234…abcd` form of an address or hash.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[component]
pub fn LiveIndicator() -> Element {
    rsx! {
        span { class: "inline-block w-2 h-2 mr-2 rounded-full bg-[#4cc7a2]" }
    }
}

#[component]
pub fn ConnectorRow(option: ConnectorOption, onclick: EventHandler<()>) -> Element {
    let state_class = if option.active { "connector-option active" } else { "connector-option" };

    rsx! {
        button {
            class: "{state_class}",
            disabled: option.disabled,
            onclick: move |_| onclick.call(()),
            span { class: "connector-name", "{option.name}" }
            if option.loading {
                span { class: "text-[var(--text-muted)] animate-pulse", "…" }
            } else if option.active {
                LiveIndicator {}
            }
        }
    }
}

#[component]
pub fn WalletInfoBox(
    wallet: WalletState,
    change_label: String,
    on_change: EventHandler<()>,
) -> Element {
    let account = wallet.account.as_deref().map(shorten_address).unwrap_or_default();
    let connector = wallet
        .active_connector
        .as_ref()
        .and_then(|id| wallet.connectors.iter().find(|c| &c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_default();
    let chain = wallet.chain.as_ref().map(|c| c.name.clone()).unwrap_or_default();

    rsx! {
        div { class: "wallet-info-box",
            div { class: "flex justify-between items-center",
                span { class: "text-[var(--text-secondary)] text-sm", "{connector} · {chain}" }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| on_change.call(()),
                    "{change_label}"
                }
            }
            div { class: "font-mono text-lg", "{account}" }
        }
    }
}

pub fn transaction_status(transaction: &Transaction) -> &'static str {
    if transaction.is_pending() {
        "⏳"
    } else if transaction.receipt.as_ref().map(|r| r.success).unwrap_or(false) {
        "✅"
    } else {
        "❌"
    }
}

#[component]
pub fn TransactionRow(transaction: Transaction) -> Element {
    let status = transaction_status(&transaction);
    let hash = shorten_address(&transaction.hash);

    rsx! {
        div { class: "transaction-row flex justify-between items-center py-2",
            div {
                div { class: "text-sm", "{transaction.summary}" }
                div { class: "text-[10px] text-[var(--text-muted)] font-mono", "{hash}" }
            }
            span { "{status}" }
        }
    }
}
