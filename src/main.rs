use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quotebook::api::{self, PostBoard};
use quotebook::config::AppConfig;
use quotebook::db::Database;
use quotebook::interchange;
use quotebook::models::{SyncOutcome, ALL_CATEGORIES};
use quotebook::presentation::TerminalPresenter;
use quotebook::prompt;
use quotebook::remote::PostsClient;
use quotebook::storage::MemoryStore;
use quotebook::sync::SyncService;
use quotebook::QuoteStore;

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Browse, collect and sync quotes")]
struct Cli {
    /// Base URL of the remote posts endpoint
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Directory holding the quote database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a random quote, optionally from one category
    Show {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List stored quotes
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List the available categories
    Categories,
    /// Add a quote and forward it to the remote
    Add {
        text: String,
        category: String,
        /// Skip forwarding to the remote
        #[arg(long)]
        offline: bool,
    },
    /// Reconcile once against the remote
    Sync,
    /// Sync periodically while reading commands from stdin
    Watch {
        /// Seconds between syncs
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Export all quotes to a JSON file
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Append quotes from a JSON file
    Import { file: PathBuf },
    /// Show recent sync passes
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Run a local mock of the remote posts endpoint
    Serve {
        #[arg(short, long, default_value = "4000")]
        port: u16,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize tracing. Quote output owns stdout, so the CLI logs to stderr.
fn init_tracing(serving: bool) {
    let default_filter = if serving {
        "quotebook=debug,tower_http=debug"
    } else {
        "quotebook=warn"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );

    if serving {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_database(config: &AppConfig) -> anyhow::Result<Database> {
    let db = match config.database_path() {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

fn open_store(db: &Database, config: &AppConfig) -> QuoteStore {
    QuoteStore::builder(
        db.clone(),
        MemoryStore::new(),
        TerminalPresenter::new(config.status_clear_after()),
    )
    .load()
}

fn record(db: &Database, outcome: &SyncOutcome) {
    if let Err(e) = db.record_sync(outcome) {
        tracing::warn!("Failed to record sync: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(matches!(cli.command, Some(Commands::Serve { .. })));

    let mut config = AppConfig::load();
    if let Some(remote) = cli.remote {
        config.remote_url = remote;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    match cli.command.unwrap_or(Commands::Show { category: None }) {
        Commands::Show { category } => {
            let db = open_database(&config)?;
            let mut store = open_store(&db, &config);
            let category = category.unwrap_or_else(|| store.filter().to_string());
            store.filter_and_pick(&category);
        }
        Commands::List { category } => {
            let db = open_database(&config)?;
            let store = open_store(&db, &config);
            let category = category.unwrap_or_else(|| ALL_CATEGORIES.to_string());
            for quote in store.matching(&category) {
                println!("{:<20} {:<12} {}", quote.id, quote.category, quote.text);
            }
        }
        Commands::Categories => {
            let db = open_database(&config)?;
            let store = open_store(&db, &config);
            for category in store.category_options() {
                let marker = if category == store.filter() { "*" } else { " " };
                println!("{} {}", marker, category);
            }
        }
        Commands::Add {
            text,
            category,
            offline,
        } => {
            let db = open_database(&config)?;
            let mut store = open_store(&db, &config);
            let result = if offline {
                store.add_quote(&text, &category)
            } else {
                let client = PostsClient::from_config(&config);
                store.add_and_submit(&client, &text, &category).await
            };
            if let Err(e) = result {
                store.notify(&e.to_string(), false);
            }
        }
        Commands::Sync => {
            let db = open_database(&config)?;
            let mut store = open_store(&db, &config);
            let client = PostsClient::from_config(&config);
            let outcome = store.reconcile(&client).await;
            record(&db, &outcome);
        }
        Commands::Watch { interval } => {
            let db = open_database(&config)?;
            let store = open_store(&db, &config);
            let client = PostsClient::from_config(&config);
            let every = interval
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| config.sync_interval());
            let service = SyncService::new(store, client);
            let stdin = BufReader::new(tokio::io::stdin());
            prompt::run_watch(&service, stdin, every, |outcome| record(&db, outcome)).await;
            // A pending stdin read would otherwise hold the runtime open.
            std::process::exit(0);
        }
        Commands::Export { output } => {
            let db = open_database(&config)?;
            let mut store = open_store(&db, &config);
            if store.is_empty() {
                store.notify("No quotes to export!", false);
                return Ok(());
            }

            let path = output.unwrap_or_else(|| {
                PathBuf::from(interchange::export_file_name(
                    chrono::Local::now().date_naive(),
                ))
            });
            let json = store.export_json()?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            store.notify(
                &format!("Quotes exported successfully! ({})", path.display()),
                true,
            );
        }
        Commands::Import { file } => {
            let db = open_database(&config)?;
            let mut store = open_store(&db, &config);
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            if let Err(e) = store.import_json(&json) {
                tracing::debug!("Import of {} rejected: {}", file.display(), e);
            }
        }
        Commands::History { limit } => {
            let db = open_database(&config)?;
            for entry in db.recent_syncs(limit)? {
                println!(
                    "{}  {:<9} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.outcome,
                    entry.message
                );
            }
        }
        Commands::Serve { port } => {
            tracing::info!("Starting mock posts server on port {}", port);

            let app = api::create_router(PostBoard::seeded());
            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("Mock posts server listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = config.save()?;
                eprintln!("Saved to {}", path.display());
            }
        }
    }

    Ok(())
}
