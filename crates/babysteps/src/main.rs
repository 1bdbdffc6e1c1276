//! `babysteps` - maintenance CLI for the BabySteps local store
//!
//! Works directly on the database and flags file the app uses.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use babysteps::cli::{
    Cli, Command, ConfigCommand, ExportCommand, ImportCommand, PinCommand, WipeCommand,
};
use babysteps::model::Snapshot;
use babysteps::{init_logging, snapshot, Config, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let store = Store::from_config(&config);

    let result = match cli.command {
        Command::Status(cmd) => handle_status(&config, &store, cmd.json).await,
        Command::Export(cmd) => handle_export(&store, cmd).await,
        Command::Import(cmd) => handle_import(&store, &cmd).await,
        Command::Pin(cmd) => handle_pin(&store, cmd),
        Command::Wipe(cmd) => handle_wipe(&store, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cli.config, cmd),
    };

    store.close().await;
    result
}

async fn handle_status(config: &Config, store: &Store, json: bool) -> anyhow::Result<()> {
    let stats = store.record_stats().await?;
    let snapshot = store.try_load_snapshot().await;

    if json {
        let status = serde_json::json!({
            "backend": config.storage.backend,
            "database_path": config.database_path(),
            "flags_path": config.flags_path(),
            "first_launch": store.is_first_launch(),
            "has_pin": store.has_credential(),
            "record_bytes": stats.as_ref().map(|s| s.bytes),
            "record_updated_at": stats.as_ref().and_then(|s| s.updated_at.clone()),
            "record_readable": matches!(snapshot, Ok(Some(_))),
            "counts": snapshot.as_ref().ok().and_then(Option::as_ref).map(counts),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("babysteps status");
    println!("----------------");
    println!("Backend:       {:?}", config.storage.backend);
    println!("Database:      {}", config.database_path().display());
    println!("Flags:         {}", config.flags_path().display());
    println!("First launch:  {}", store.is_first_launch());
    println!("PIN set:       {}", store.has_credential());
    println!();

    match &stats {
        Some(stats) => println!(
            "Record:        {} bytes, updated {}",
            stats.bytes,
            stats.updated_at.as_deref().unwrap_or("unknown")
        ),
        None => println!("Record:        none"),
    }

    match snapshot {
        Ok(Some(snapshot)) => {
            println!("Profile:       {}", snapshot.profile.name);
            for (name, count) in counts(&snapshot).as_object().into_iter().flatten() {
                println!("  {name:<16} {count}");
            }
        }
        Ok(None) => {}
        Err(e) => println!("Record is unreadable and would load as defaults: {e}"),
    }
    Ok(())
}

fn counts(snapshot: &Snapshot) -> serde_json::Value {
    serde_json::json!({
        "entries": snapshot.entries.len(),
        "growthRecords": snapshot.growth_records.len(),
        "vaccines": snapshot.vaccines.len(),
        "milestones": snapshot.milestones.len(),
        "customEvents": snapshot.custom_events.len(),
        "medicalHistory": snapshot.medical_history.len(),
        "documents": snapshot.documents.len(),
    })
}

async fn handle_export(store: &Store, cmd: ExportCommand) -> anyhow::Result<()> {
    let Some(snapshot) = store.try_load_snapshot().await? else {
        bail!("no snapshot stored");
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    match cmd.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Exported snapshot to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn handle_import(store: &Store, cmd: &ImportCommand) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let snapshot = snapshot::deserialize(&text)
        .with_context(|| format!("{} is not a valid snapshot", cmd.file.display()))?;

    store.try_save_snapshot(&snapshot).await?;
    println!(
        "Imported snapshot for {} ({} entries)",
        snapshot.profile.name,
        snapshot.entries.len()
    );
    Ok(())
}

fn handle_pin(store: &Store, cmd: PinCommand) -> anyhow::Result<()> {
    match cmd {
        PinCommand::Set { pin } => {
            if pin.is_empty() {
                bail!("PIN must not be empty");
            }
            store.try_set_credential(&pin)?;
            println!("PIN updated.");
        }
        PinCommand::Verify { pin } => {
            if !store.verify_credential(&pin) {
                bail!("PIN does not match");
            }
            println!("PIN matches.");
        }
        PinCommand::Remove => {
            store.remove_credential();
            println!("PIN removed.");
        }
    }
    Ok(())
}

async fn handle_wipe(store: &Store, cmd: &WipeCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This deletes the PIN, the launch flag and every stored record.");
        println!("Use --yes to confirm.");
        return Ok(());
    }
    store.wipe_all().await;
    println!("All local data wiped.");
    Ok(())
}

fn handle_config(
    config: &Config,
    config_path: Option<PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    let config_path = config_path.unwrap_or_else(Config::default_config_path);
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {:?}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Flags path:         {}", config.flags_path().display());
                println!();
                println!("[Session]");
                println!(
                    "  Autosave debounce:  {} ms",
                    config.session.autosave_debounce_ms
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or(config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_file(&path) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
