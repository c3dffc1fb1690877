use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use confirm_core::model::ContentId;
use confirm_core::model::statement::{StatementFactory, Verbs, XapiStatementFactory};
use confirm_core::upgrade::{ContentVersion, Upgrades};
use serde_json::Value;
use services::{Clock, ConfirmationService, ContentMetadata, HtmlContainer};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

/// Self-reported completion checkbox: state, reports and params upgrades.
#[derive(Parser, Debug)]
#[command(name = "confirm")]
#[command(version = "0.1.0")]
#[command(about = "Completion confirmation content tooling.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upgrade content params written for an older library version
    Upgrade {
        /// Params file (`-` for stdin)
        params: PathBuf,

        /// Version the params were written for
        #[arg(long, default_value = "1.0")]
        from: ContentVersion,

        /// Target version (default: newest known)
        #[arg(long)]
        to: Option<ContentVersion>,
    },

    /// Click the checkbox once, print the emitted statements and save the state
    Toggle {
        #[command(flatten)]
        content: ContentArgs,

        /// Checkbox value after the click
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        checked: bool,

        /// Base IRI that activity ids are built from
        #[arg(long, default_value = "https://localhost/h5p/content/")]
        activity_base: String,

        /// Report `completed` for both records, for hosts that predate `answered`/`progressed`
        #[arg(long)]
        legacy_verbs: bool,
    },

    /// Render the checkbox with its saved state as HTML
    Render {
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Print the saved state
    State {
        #[command(flatten)]
        db: DbArgs,

        #[arg(long)]
        content_id: ContentId,
    },

    /// Forget the saved state
    Reset {
        #[command(flatten)]
        db: DbArgs,

        #[arg(long)]
        content_id: ContentId,
    },
}

#[derive(Args, Debug)]
struct DbArgs {
    /// `SQLite` database holding saved states
    #[arg(long = "db", env = "CONFIRM_DB_URL", default_value = "sqlite:confirm.sqlite3")]
    url: String,
}

#[derive(Args, Debug)]
struct ContentArgs {
    #[command(flatten)]
    db: DbArgs,

    #[arg(long)]
    content_id: ContentId,

    /// Params file (`-` for stdin)
    #[arg(long)]
    params: PathBuf,

    /// Content metadata title, used when params carry no title
    #[arg(long)]
    title: Option<String>,
}

impl ContentArgs {
    fn metadata(&self) -> Option<ContentMetadata> {
        self.title.clone().map(|title| ContentMetadata { title: Some(title) })
    }
}

fn read_params(path: &Path) -> Result<Value> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading params from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading params from {}", path.display()))?
    };
    serde_json::from_str(&raw).context("params are not valid JSON")
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

async fn open_service(db: &DbArgs) -> Result<ConfirmationService> {
    let url = normalize_sqlite_url(&db.url);
    prepare_sqlite_file(&url)?;
    let storage = Storage::sqlite(&url)
        .await
        .with_context(|| format!("opening {url}"))?;
    Ok(ConfirmationService::new(Clock::default(), Arc::clone(&storage.states)))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Upgrade { params, from, to } => {
            let upgrades = Upgrades::completion_confirmation();
            let to = to.unwrap_or_else(|| upgrades.latest());
            let upgraded = upgrades.upgrade(read_params(&params)?, from, to)?;
            println!("{}", serde_json::to_string_pretty(&upgraded)?);
        }
        Command::Toggle {
            content,
            checked,
            activity_base,
            legacy_verbs,
        } => {
            let service = open_service(&content.db).await?;
            let params = read_params(&content.params)?;
            let mut component = service
                .open(content.content_id, &params, content.metadata())
                .await?;
            if !component.is_interactive() {
                bail!("content {} is locked; reset it first", content.content_id);
            }

            let base = activity_base
                .parse()
                .with_context(|| format!("invalid --activity-base: {activity_base}"))?;
            let verbs = if legacy_verbs {
                Verbs::legacy()
            } else {
                Verbs::current()
            };
            let factory = XapiStatementFactory::new(base).with_verbs(verbs);
            let content_id = content.content_id;
            component.on_any(services::dispatcher::log_record);
            component.on_any(move |record| {
                let statement = factory.build(content_id, record);
                match serde_json::to_string(&statement) {
                    Ok(line) => println!("{line}"),
                    Err(err) => tracing::error!(error = %err, "statement.serialize"),
                }
            });

            service.toggle(&mut component, checked).await?;
        }
        Command::Render { content } => {
            let service = open_service(&content.db).await?;
            let params = read_params(&content.params)?;
            let mut component = service
                .open(content.content_id, &params, content.metadata())
                .await?;
            let mut container = HtmlContainer::new();
            component.attach(&mut container);
            println!("{}", container.to_html());
        }
        Command::State { db, content_id } => {
            let service = open_service(&db).await?;
            let state = service.saved_state(content_id).await?.unwrap_or_default();
            println!("{}", serde_json::to_string(&state)?);
        }
        Command::Reset { db, content_id } => {
            let service = open_service(&db).await?;
            service.reset(content_id).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("CONFIRM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
