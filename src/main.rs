mod backend;
mod components;
mod config;
mod error;
mod i18n;

use components::home_page::HomePage;
use components::nav_bar::NavBar;
use components::proposal_page::ProposalPage;
use components::AppState;
use config::Config;

use dioxus::prelude::*;
use tokio::sync::mpsc;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[layout(NavBar)]
    #[route("/")]
    HomePage {},
    #[route("/:dao_id/proposal/:proposal_id")]
    ProposalPage { dao_id: String, proposal_id: String },
}

fn main() {
    let config = Config::load();
    init_logging(&config.log_level);
    tracing::info!("DAVI starting");
    dioxus::launch(App);
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    if tracing_subscriber::fmt().with_max_level(level).try_init().is_err() {
        tracing::debug!("global subscriber already installed");
    }
}

#[cfg(target_arch = "wasm32")]
fn init_logging(_level: &str) {}

#[component]
fn App() -> Element {
    let config = use_context_provider(Config::load);
    let mut app_state = use_context_provider(|| AppState::new(&config));

    let cmd_tx = use_hook(|| {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        spawn(backend::init(config.clone(), cmd_rx, event_tx));
        spawn(async move {
            while let Some(event) = event_rx.recv().await {
                app_state.apply(event);
            }
            tracing::info!("backend event stream ended");
        });

        if let Err(e) = cmd_tx.send(backend::AppCmd::Init) {
            tracing::error!("Failed to send Init command: {:?}", e);
        }
        cmd_tx
    });
    use_context_provider(|| cmd_tx);

    rsx! {
        document::Stylesheet { href: asset!("/assets/main.css") }
        Router::<Route> {}
    }
}
