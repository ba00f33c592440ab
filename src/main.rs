use clap::Parser;
use ledgerd::application::engine::LedgerEngine;
use ledgerd::config::{CliArgs, LedgerConfig, StorageConfig};
use ledgerd::domain::ports::SharedLedgerStore;
use ledgerd::infrastructure::in_memory::InMemoryLedgerStore;
use ledgerd::interfaces::csv::ledger_writer::LedgerWriter;
use ledgerd::interfaces::csv::operation_reader::{OperationReader, Request};
use ledgerd::interfaces::user_message;
use ledgerd::telemetry;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config = LedgerConfig::load(&cli).into_diagnostic()?;
    telemetry::init(&config.logging);

    let (store, persistent) = open_store(&config.storage)?;
    store.initialize().await.into_diagnostic()?;
    let engine = LedgerEngine::new(store);

    if persistent {
        for discrepancy in engine.reconcile().await.into_diagnostic()? {
            tracing::warn!(%discrepancy, "Ledger inconsistency found on startup");
        }
    }

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for request in reader.requests() {
        let outcome = match request {
            Ok(Request::Open {
                account,
                pin,
                name,
                opening_balance,
            }) => engine
                .open_account(account, pin, &name, opening_balance)
                .await
                .map(|_| ()),
            Ok(Request::Apply(operation)) => engine.execute(operation).await.map(|_| ()),
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
                continue;
            }
        };
        if let Err(e) = outcome {
            eprintln!("Error processing operation: {}", user_message(&e));
        }
    }

    // Output final state
    let accounts = engine.accounts().await.into_diagnostic()?;
    let stdout = io::stdout();
    LedgerWriter::new(stdout.lock())
        .write_accounts(&accounts)
        .into_diagnostic()?;

    if let Some(path) = &cli.history {
        let records = engine.history().await.into_diagnostic()?;
        LedgerWriter::new(File::create(path).into_diagnostic()?)
            .write_history(&records)
            .into_diagnostic()?;
    }

    Ok(())
}

/// Picks the backend for the configured storage. The flag tells whether the
/// store outlives the process.
fn open_store(config: &StorageConfig) -> Result<(SharedLedgerStore, bool)> {
    match &config.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use ledgerd::infrastructure::rocksdb::RocksDBLedgerStore;
            let store = RocksDBLedgerStore::open(path, config.sync_writes).into_diagnostic()?;
            Ok((Arc::new(store), true))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            tracing::warn!(
                db_path = %path.display(),
                "Persistent storage requested, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok((Arc::new(InMemoryLedgerStore::new()), false))
        }
        None => Ok((Arc::new(InMemoryLedgerStore::new()), false)),
    }
}
