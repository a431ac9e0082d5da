use dioxus::prelude::*;
use crate::components::common::{shorten_address, LiveIndicator};
use crate::components::wallet_modal::WalletModal;
use crate::components::AppState;
use crate::Route;

#[component]
pub fn NavBar() -> Element {
    let mut app_state = use_context::<AppState>();
    let wallet = app_state.wallet.read().clone();
    let i18n = app_state.i18n.read().clone();
    let is_open = (app_state.wallet_modal_open)();
    let last_error = app_state.last_error.read().clone();

    let wallet_label = match wallet.account.as_deref() {
        Some(account) if wallet.is_connected() && !wallet.is_read_only() => {
            shorten_address(account)
        }
        Some(_) if wallet.is_read_only() => i18n.t("connections.readOnly"),
        _ => i18n.t("connections.connectToAWallet"),
    };
    let chain_name = wallet.chain.as_ref().map(|c| c.name.clone());
    let home_label = i18n.t("nav.home");

    rsx! {
        div { class: "min-h-screen flex flex-col",
            nav { class: "nav-bar",
                div { class: "page-container",
                    div { class: "nav-logo",
                        div { class: "logo-icon" }
                        span { class: "logo-text", "DAVI" }
                    }

                    div { class: "nav-links",
                        Link {
                            to: Route::HomePage {},
                            class: "nav-link",
                            active_class: "active",
                            "{home_label}"
                        }
                        if let Some(name) = chain_name {
                            span { class: "nav-link",
                                if !wallet.chain_unsupported() {
                                    LiveIndicator {}
                                }
                                "{name}"
                            }
                        }
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| app_state.wallet_modal_open.set(true),
                            "{wallet_label}"
                        }
                    }
                }
            }

            div { class: "fixed-header-spacer" }

            if let Some(err) = last_error {
                div { class: "page-container",
                    div {
                        class: "connection-error cursor-pointer",
                        onclick: move |_| app_state.last_error.set(None),
                        "{err}"
                    }
                }
            }

            div { class: "flex-1",
                Outlet::<Route> {}
            }

            WalletModal {
                is_open: is_open,
                on_close: move |_| app_state.wallet_modal_open.set(false),
                title: None,
            }
        }
    }
}
