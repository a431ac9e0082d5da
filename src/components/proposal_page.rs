use dioxus::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use crate::backend::proposal::{build_proposal, ContractState, ProposalViewModel};
use crate::backend::AppCmd;
use crate::components::common::{shorten_address, LiveIndicator};
use crate::components::{ActiveProposals, AppState, ProposalInputs};
use crate::i18n::I18n;

fn status_class(state: ContractState) -> &'static str {
    match state {
        ContractState::Active => "badge badge-verified",
        ContractState::Executed => "badge badge-founder",
        ContractState::Rejected | ContractState::Failed => "badge badge-danger",
        ContractState::Unknown => "badge",
    }
}

#[component]
pub fn ProposalPage(dao_id: String, proposal_id: String) -> Element {
    let mut app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();

    let dao = dao_id.clone();
    let pid = proposal_id.clone();
    use_effect(use_reactive!(|(dao, pid)| {
        app_state.proposal.set(ProposalInputs::watching(&dao, &pid));
        app_state.active_proposals.set(ActiveProposals::watching(&dao));
        if let Err(e) = cmd_tx.send(AppCmd::FetchProposal { dao_id: dao, proposal_id: pid }) {
            tracing::error!("Failed to send FetchProposal command: {:?}", e);
        }
    }));

    let inputs = app_state.proposal.read().clone();
    let i18n = app_state.i18n.read().clone();

    if let Some(err) = inputs.error.as_ref() {
        return rsx! {
            div { class: "page-container py-8",
                div { class: "empty-state", p { class: "empty-state-title", "{err}" } }
            }
        };
    }
    if !inputs.loaded {
        let loading = i18n.t("proposal.loading");
        return rsx! {
            div { class: "page-container py-8",
                div { class: "empty-state animate-pulse", "{loading}" }
            }
        };
    }

    let built = build_proposal(
        inputs.raw.as_ref(),
        inputs.metadata.as_ref(),
        inputs.total_locked,
        &i18n,
    )
    .map(|vm| vm.map(|vm| vm.merge_options(inputs.options.clone())));

    match built {
        Ok(Some(proposal)) => rsx! {
            ProposalView { proposal: proposal, i18n: i18n }
        },
        Ok(None) => {
            let not_found = i18n.t("proposal.notFound");
            rsx! {
                div { class: "page-container py-8",
                    div { class: "empty-state", p { class: "empty-state-title", "{not_found}" } }
                }
            }
        }
        Err(e) => {
            tracing::error!(proposal = %proposal_id, "could not build proposal: {}", e);
            rsx! {
                div { class: "page-container py-8",
                    div { class: "empty-state", p { class: "empty-state-title", "{e}" } }
                }
            }
        }
    }
}

#[component]
fn ProposalView(proposal: ProposalViewModel, i18n: I18n) -> Element {
    let status = proposal.contract_state.label(&i18n);
    let status_class = status_class(proposal.contract_state);
    let starts = proposal.start_time.format("%Y-%m-%d %H:%M UTC").to_string();
    let ends = proposal.end_time.format("%Y-%m-%d %H:%M UTC").to_string();
    let creator = shorten_address(&proposal.creator);
    let start_label = i18n.t("proposal.startTime");
    let end_label = i18n.t("proposal.endTime");
    let votes_label = i18n.t("proposal.votes");
    let options_label = i18n.t("proposal.options");

    rsx! {
        div { class: "page-container py-8 animate-fade-in",
            div { class: "page-header",
                div { class: "flex justify-between items-center",
                    h1 { class: "page-title", "{proposal.title}" }
                    span { class: "{status_class}",
                        if proposal.is_active() {
                            LiveIndicator {}
                        }
                        "{status}"
                    }
                }
                p { class: "text-[var(--text-secondary)] font-mono", "{creator}" }
                div { class: "text-sm text-[var(--text-muted)]",
                    "{start_label}: {starts} · {end_label}: {ends}"
                }
            }

            if let Some(options) = proposal.options.as_ref() {
                div { class: "panel mb-6",
                    div { class: "panel-header", h2 { class: "panel-title", "{options_label}" } }
                    for option in options.iter() {
                        {
                            let calls = i18n.t_with(
                                "proposal.calls",
                                &[("count", option.calls.len().to_string().as_str())],
                            );
                            rsx! {
                                div { key: "{option.id}", class: "flex justify-between py-2",
                                    span { "{option.label}" }
                                    span { class: "text-[var(--text-muted)]",
                                        "{calls} · {option.total_votes}"
                                    }
                                }
                            }
                        }
                    }
                }
            }

            div { class: "panel",
                div { class: "panel-header", h2 { class: "panel-title", "{votes_label}" } }
                for (i, vote) in proposal.votes.iter().enumerate() {
                    {
                        let voter = shorten_address(&vote.voter);
                        let power = vote
                            .voting_power
                            .map(|p| format!("{}%", p))
                            .unwrap_or_else(|| "-".to_string());
                        rsx! {
                            div { key: "{i}", class: "flex justify-between py-2",
                                span { class: "font-mono", "{voter}" }
                                span { "{vote.option_label}" }
                                span { class: "font-bold", "{power}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
