mod config;
mod protocol;
mod server;
mod suggest;
mod upstream;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use config::{parse_ingredient_list, Command, Config};
use suggest::{MatchMode, RecipeSession, RelayCompletion};
use upstream::{Anthropic, AnthropicConfig, Upstream};

#[tokio::main]
async fn main() {
    let mut config = Config::parse();

    // Configure logging
    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt().json().init();
        }
        _ => {
            tracing_subscriber::fmt().init();
        }
    }

    match config.command.take() {
        Some(Command::Suggest {
            ingredients,
            mode,
            endpoint,
            model,
        }) => run_suggest(&ingredients, mode, endpoint, model).await,
        Some(Command::Serve) | None => serve(config).await,
    }
}

/// Run the credential-guarded relay server.
async fn serve(config: Config) {
    let upstream: Arc<dyn Upstream> = Arc::new(Anthropic::new(AnthropicConfig {
        base_url: Some(config.upstream_base_url.clone()),
        api_key: config.api_key.clone(),
    }));

    if !upstream.has_credential() {
        warn!("ANTHROPIC_API_KEY is not set - completion requests will fail until it is configured");
    }

    info!(
        upstream = upstream.name(),
        base_url = upstream.base_url(),
        "using upstream"
    );

    // HTTP client for relaying
    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .build()
        .expect("failed to build HTTP client");

    let app = server::build_router(upstream, http_client, config.cors_enabled);

    let addr = normalize_addr(&config.addr);
    let listener = TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        error!(addr = addr, error = %e, "failed to bind");
        std::process::exit(1);
    });

    info!(addr = addr, cors = config.cors_enabled, "server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "server error");
            std::process::exit(1);
        });

    info!("server stopped");
}

/// One-shot suggestion search: build a session, run one search against the
/// relay endpoint, and print the records.
async fn run_suggest(ingredients: &str, mode: MatchMode, endpoint: String, model: String) {
    let completion = Arc::new(RelayCompletion::new(endpoint, model));
    let mut session = RecipeSession::new(completion);
    session.set_mode(mode);

    for item in parse_ingredient_list(ingredients) {
        session.add_ingredient(&item);
    }

    if session.ingredients().is_empty() {
        error!("no ingredients given");
        std::process::exit(1);
    }

    session.search().await;

    for recipe in session.recipes() {
        println!();
        println!("{} (match {}%)", recipe.name, recipe.match_score);
        println!("  {}", recipe.description);
        println!(
            "  {} | serves {} | {}",
            recipe.cooking_time, recipe.servings, recipe.difficulty
        );
        if !recipe.ingredients.is_empty() {
            println!("  ingredients: {}", recipe.ingredients.join(", "));
        }
        for (i, step) in recipe.instructions.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }
}

/// Expand ":8787" to "0.0.0.0:8787".
fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
