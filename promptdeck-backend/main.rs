mod api;
mod chat;
mod clock;
mod config;
mod error;
mod folders;
mod ids;
mod library;
mod outline;
mod prompts;
mod store;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::Request;
use clap::Parser;
use dotenvy::dotenv;
use sentry::integrations::tower::{NewSentryLayer, SentryHttpLayer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::api::changes::ResourceChangeEvent;
use crate::chat::client::ChatClient;
use crate::config::Config;
use crate::library::{Library, LibraryPaths};

#[derive(Parser)]
#[command(name = "promptdeck", about = "Personal prompt library with a JSON API")]
enum Cli {
    /// Start the HTTP server (default when no subcommand is given)
    #[command(alias = "run")]
    Serve {
        /// Port to listen on, overrides PORT
        #[arg(long)]
        port: Option<u16>,
        /// Directory holding prompts.json and folders.json, overrides PROMPTDECK_DATA_DIR
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print the library grouped by folder
    List {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // No subcommand means serve; --help and --version still go through clap.
    let args: Vec<String> = std::env::args().collect();
    let cli = if args.len() <= 1 {
        Cli::Serve {
            port: None,
            data_dir: None,
        }
    } else {
        Cli::parse()
    };

    init_tracing();
    let mut config = Config::from_env();

    match cli {
        Cli::Serve { port, data_dir } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_server(config).await
        }
        Cli::List { data_dir } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            print_library(config).await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("promptdeck=info,tower_http=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true).with_bracketed_fields(false))
        .with(sentry::integrations::tracing::layer().event_filter(
            |metadata| match *metadata.level() {
                tracing::Level::ERROR => sentry::integrations::tracing::EventFilter::Event,
                tracing::Level::WARN | tracing::Level::INFO => {
                    sentry::integrations::tracing::EventFilter::Breadcrumb
                }
                _ => sentry::integrations::tracing::EventFilter::Ignore,
            },
        ))
        .init();
}

async fn run_server(config: Config) -> Result<()> {
    let _guard = sentry::init((
        config.sentry_dsn.clone().unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            send_default_pii: true,
            traces_sample_rate: 0.2,
            enable_logs: true,
            ..Default::default()
        },
    ));

    // Completions stream for as long as the model keeps talking, so only
    // connecting is bounded.
    let http_client = Arc::new(
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?,
    );

    let paths = LibraryPaths::new(&config.data_dir);
    tracing::info!(
        prompts = %paths.prompts.display(),
        folders = %paths.folders.display(),
        ids = ?config.id_format,
        "opening library"
    );
    let library = Library::open(&config.data_dir, Arc::from(config.id_format.generator()));

    if config.chat.api_key.is_empty() {
        tracing::info!(base_url = %config.chat.base_url, "CHAT_API_KEY not set, chat requests must supply their own key");
    }

    let (changes_tx, _) = tokio::sync::broadcast::channel::<ResourceChangeEvent>(256);

    let app_state = api::AppState {
        library: Arc::new(library),
        chat_client: Arc::new(ChatClient::new(http_client)),
        chat_settings: Arc::new(config.chat),
        changes_tx,
        static_dir: config.static_dir,
    };

    let app = api::create_app(app_state)
        .layer(SentryHttpLayer::new().enable_transaction())
        .layer(NewSentryLayer::<Request<Body>>::new_from_top());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    println!("Listening on http://{addr}");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn print_library(config: Config) -> Result<()> {
    let library = Library::open(&config.data_dir, Arc::from(config.id_format.generator()));
    let folders = library.folders.list().await.context("failed to read folders")?;
    let prompts = library.prompts.list().await.context("failed to read prompts")?;
    print!("{}", outline::render(&folders, &prompts));
    Ok(())
}
