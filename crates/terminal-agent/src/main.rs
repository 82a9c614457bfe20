// terminal-agent/crates/terminal-agent/src/main.rs

#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use colored::Color;
#[cfg(feature = "cli")]
use dotenvy::dotenv;
#[cfg(feature = "cli")]
use terminal_agent::{
    config::Config,
    console::{ask_temperature, select_model, Console, EditorInput},
    llm_client::{CompletionBackend, HttpCompletionClient},
    session::{new_session_id, ChatSettings, Session},
    telemetry,
    transcript_db::TranscriptStore,
    workflow::{DuckDuckGoSearch, SearchPlanner},
};

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    telemetry::init_tracing();

    let cfg = Config::from_env()?;
    cfg.print_config();

    let mut console = Console::stdout();
    let mut input = EditorInput::new()?;
    console.welcome()?;

    let Some(model) = select_model(&mut console, &mut input, &cfg)? else {
        console.session_ended()?;
        return Ok(());
    };
    console.blank()?;
    let Some(temperature) = ask_temperature(&mut console, &mut input, cfg.default_temperature)?
    else {
        console.session_ended()?;
        return Ok(());
    };
    console.rule(&format!("Model selected: {}", model), Color::Green)?;

    let store = TranscriptStore::open(&cfg.db_path, new_session_id())?;
    let backend: Arc<dyn CompletionBackend> =
        Arc::new(HttpCompletionClient::new(&cfg.url, &cfg.api_key));
    let search = Arc::new(DuckDuckGoSearch::new(cfg.search_max_results)?);
    let planner = Arc::new(SearchPlanner::new(
        Arc::clone(&backend),
        search,
        cfg.planner_model(),
    ));

    let session = Session::new(
        store,
        backend,
        planner,
        cfg.system_prompt.clone(),
        ChatSettings { model, temperature },
    );
    session.run(&mut input, &mut console).await
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
