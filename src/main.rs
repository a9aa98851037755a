pub mod api {
    pub mod error;
    pub mod routes;
    pub mod server;
    pub mod state;
    #[cfg(test)]
    mod tests;
}
pub mod models {
    pub mod dto;
    pub mod entity;
}

pub mod client;
pub mod config;
pub mod db {
    pub mod memory;
    pub mod models;
    pub mod pg;
    pub mod store;
}
pub mod mapper;
pub mod schema;
pub mod services {
    pub mod error;
    pub mod fake_data;
    pub mod plan_pattern;
    pub mod plans;
    pub mod topics;
    pub mod validation;
}

use crate::api::state::AppState;
use crate::client::HygimeterClient;
use crate::config::{Config, StoreBackend};
use crate::db::memory::MemoryStore;
use crate::db::pg::PgStore;
use crate::db::store::Store;
use crate::services::fake_data;
use diesel::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{error, info};
use std::path::PathBuf;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn apply_database_migrations(conn: &mut PgConnection) -> Result<(), String> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) if applied.is_empty() => {
            info!("Database schema is up to date; no migrations were applied");
            Ok(())
        }
        Ok(applied) => {
            let names = applied.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
            info!("Applied {} database migration(s): {}", applied.len(), names);
            Ok(())
        }
        Err(e) => Err(format!("Applying database migrations failed: {}", e)),
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Serve,
    Client(Vec<String>),
}

#[derive(Debug, PartialEq)]
struct Cli {
    env_file: Option<PathBuf>,
    command: Command,
}

fn parse_cli(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut args = args.into_iter();
    let mut env_file: Option<PathBuf> = None;
    let mut set_env_file = |path: String| {
        if env_file.replace(PathBuf::from(&path)).is_some() {
            return Err("`--env-file` provided more than once".to_string());
        }
        if path.is_empty() {
            return Err("`--env-file` requires a path argument".to_string());
        }
        Ok(())
    };

    let command = loop {
        match args.next().as_deref() {
            None | Some("serve") => break Command::Serve,
            Some("client") => break Command::Client(args.by_ref().collect()),
            Some("--env-file") => {
                set_env_file(args.next().ok_or_else(|| "`--env-file` requires a path argument".to_string())?)?
            }
            Some(s) if s.starts_with("--env-file=") => set_env_file(s["--env-file=".len()..].to_string())?,
            Some(other) => return Err(format!("unrecognised argument: {}", other)),
        }
    };
    if command == Command::Serve
        && let Some(extra) = args.next()
    {
        return Err(format!("unrecognised argument: {}", extra));
    }
    Ok(Cli { env_file, command })
}

/// Load the explicit env file, or `.env` from the working directory if present.
fn load_env(cli: &Cli) -> Result<Option<String>, String> {
    if let Some(path) = &cli.env_file {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        let count = config::load_env_file(path)?;
        return Ok(Some(format!("CLI-specified env file {} ({} variable(s))", path.display(), count)));
    }
    let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
    let default_path = cwd.join(".env");
    if default_path.is_file() {
        let count = config::load_env_file(&default_path)?;
        return Ok(Some(format!("default env file {} ({} variable(s))", default_path.display(), count)));
    }
    Ok(None)
}

fn open_store(cfg: &Config) -> Result<Box<dyn Store>, String> {
    match cfg.store_backend {
        StoreBackend::Postgres => {
            let mut conn =
                PgConnection::establish(&cfg.database_url).map_err(|e| format!("DB connection failed: {}", e))?;
            info!("Connected to database");
            apply_database_migrations(&mut conn)?;
            Ok(Box::new(PgStore::new(conn)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on exit");
            Ok(Box::new(MemoryStore::new()))
        }
    }
}

fn serve() -> Result<(), String> {
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (bind_addr={}, store_backend={:?}, seed_demo_data={}, seed_count={})",
        cfg.bind_addr,
        cfg.store_backend,
        cfg.seed_demo_data,
        cfg.seed_count.get()
    );

    let mut store = open_store(&cfg)?;

    if cfg.seed_demo_data {
        let existing = store
            .list_plan_patterns()
            .map_err(|e| format!("Checking for existing data failed: {}", e))?;
        if existing.is_empty() {
            fake_data::run(store.as_mut(), cfg.seed_count, fake_data::DEMO_SEED)?;
        } else {
            info!("Demo data skipped: store already holds {} plan pattern(s)", existing.len());
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Starting async runtime failed: {}", e))?;
    runtime.block_on(api::server::serve(cfg.bind_addr, AppState::new(store)))
}

fn run_client(args: &[String]) -> Result<(), String> {
    let cfg = Config::from_env()?;
    let client = HygimeterClient::new(cfg.api_url.clone(), cfg.client_timeout);
    info!("Client targeting {}", cfg.api_url);
    let output = client::run_command(&client, args)?;
    println!("{}", output);
    Ok(())
}

fn main() {
    let cli = match parse_cli(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(2);
        }
    };
    let loaded_env = match load_env(&cli) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(origin) = loaded_env {
        info!("Environment loaded from {}", origin);
    }

    info!(
        "hygimeter {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    let result = match &cli.command {
        Command::Serve => serve(),
        Command::Client(args) => run_client(args),
    };
    if let Err(e) = result {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
