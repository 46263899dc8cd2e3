//! Maskwise — privacy gateway between users and hosted LLMs.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use maskwise_core::ServiceConfig;
use maskwise_server::pipeline::anonymize_prompt;
use maskwise_server::state::build_detector;
use maskwise_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ServiceConfig::from_env()?;

    if args.len() > 1 {
        match args[1].as_str() {
            "anonymize" => {
                if args.len() < 3 {
                    eprintln!("Usage: maskwise anonymize <text>");
                    std::process::exit(1);
                }
                let text = args[2..].join(" ");
                let detector = build_detector(&config)?;
                let state = AppState::new(config, detector, None);
                let result = anonymize_prompt(&state, &text).await?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "anonymized_prompt": result.text,
                        "mapping": result.mapping,
                    }))?
                );
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("Maskwise — anonymize prompts before they reach an LLM");
                println!();
                println!("Usage: maskwise [command]");
                println!();
                println!("Commands:");
                println!("  (none)              Start the server");
                println!("  anonymize <text>    Print the anonymized text and mapping");
                println!("  help                Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'maskwise help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let port = config.port;
    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Maskwise server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
