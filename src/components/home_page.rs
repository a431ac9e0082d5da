use dioxus::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use crate::backend::subgraph::{normalize_address, normalize_proposal_id};
use crate::backend::AppCmd;
use crate::components::common::LiveIndicator;
use crate::components::{ActiveProposals, AppState};
use crate::Route;

#[component]
pub fn HomePage() -> Element {
    let mut app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();
    let nav = use_navigator();
    let mut dao_id = use_signal(String::new);
    let mut proposal_id = use_signal(String::new);
    let mut form_error = use_signal(|| None::<String>);

    let i18n = app_state.i18n.read().clone();
    let active_label = i18n.t("proposal.activeProposals");
    let subtitle = i18n.t("home.subtitle");
    let dao_label = i18n.t("home.daoAddress");
    let proposal_label = i18n.t("home.proposalId");
    let watch_label = i18n.t("home.watchDao");
    let open_label = i18n.t("home.openProposal");
    let active = app_state.active_proposals.read().count;

    let on_watch = {
        let cmd_tx = cmd_tx.clone();
        move |_: Event<MouseData>| match normalize_address(&dao_id()) {
            Ok(dao) => {
                form_error.set(None);
                app_state.active_proposals.set(ActiveProposals::watching(&dao));
                if let Err(e) = cmd_tx.send(AppCmd::FetchActiveProposals { dao_id: dao }) {
                    tracing::error!("Failed to send FetchActiveProposals command: {:?}", e);
                }
            }
            Err(e) => form_error.set(Some(e.to_string())),
        }
    };

    let on_open = move |_: Event<MouseData>| {
        match (normalize_address(&dao_id()), normalize_proposal_id(&proposal_id())) {
            (Ok(dao), Ok(pid)) => {
                form_error.set(None);
                nav.push(Route::ProposalPage { dao_id: dao, proposal_id: pid });
            }
            (Err(e), _) | (_, Err(e)) => form_error.set(Some(e.to_string())),
        }
    };

    rsx! {
        div { class: "page-container py-8 animate-fade-in",
            div { class: "page-header",
                h1 { class: "page-title", "DAVI" }
                p { class: "text-[var(--text-secondary)]", "{subtitle}" }
            }

            div { class: "panel grid gap-4",
                div { class: "form-group",
                    label { class: "form-label", "{dao_label}" }
                    input {
                        class: "input font-mono",
                        value: "{dao_id}",
                        oninput: move |e| dao_id.set(e.value()),
                        placeholder: "0x…"
                    }
                }
                div { class: "form-group",
                    label { class: "form-label", "{proposal_label}" }
                    input {
                        class: "input font-mono",
                        value: "{proposal_id}",
                        oninput: move |e| proposal_id.set(e.value()),
                        placeholder: "0x…"
                    }
                }
                if let Some(err) = form_error() {
                    div { class: "connection-error", "{err}" }
                }
                div { class: "flex gap-2",
                    button { class: "btn btn-secondary", onclick: on_watch, "{watch_label}" }
                    button { class: "btn btn-primary", onclick: on_open, "{open_label}" }
                }
            }

            if let Some(count) = active {
                div { class: "panel mt-6 flex items-center",
                    LiveIndicator {}
                    span { "{active_label}: {count}" }
                }
            }
        }
    }
}
