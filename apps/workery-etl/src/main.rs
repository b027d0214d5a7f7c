//! `workery-etl`: moves one franchise's legacy data into the multi-tenant
//! schema, one entity kind per invocation.

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use etl_db::{DbConnConfig, DbEngine};
use legacy_migration::{
    BlobStore, EntityKind, FsBlobStore, LegacyId, MigrationPipeline, Migrator, NewId,
    ProgressSink, SeaOrmDestinationStore, SeaOrmLegacySource, TenantSelector, import_tenants,
};
use sea_orm_migration::MigratorTrait;

use crate::config::EtlConfig;

#[derive(Parser, Debug)]
#[command(name = "workery-etl", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace) when no level is configured.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print the effective configuration with secrets masked, then exit.
    #[arg(long, global = true)]
    print_config: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the destination schema migrations.
    Schema,
    /// Create or refresh one tenant per legacy franchise.
    Tenant,
    /// Migrate every legacy row of one entity kind into one tenant.
    #[command(group(
        ArgGroup::new("tenant")
            .required(true)
            .args(["schema_name", "tenant_id"])
    ))]
    Migrate {
        kind: EntityKind,
        /// Legacy schema of the franchise; also the legacy search path.
        #[arg(long)]
        schema_name: Option<String>,
        /// Legacy franchise id.
        #[arg(long, value_parser = parse_legacy_id)]
        tenant_id: Option<LegacyId>,
    },
    /// List entity kinds in dependency order.
    Kinds,
}

fn parse_legacy_id(raw: &str) -> Result<LegacyId, String> {
    let n = raw.parse::<i64>().map_err(|e| e.to_string())?;
    LegacyId::try_from(n).map_err(|e| e.to_string())
}

/// Prints one line per migrated or skipped row.
struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn imported(&self, legacy_id: LegacyId, _new_id: NewId) {
        println!("Imported legacy id #{legacy_id}");
    }

    fn skipped(&self, legacy_id: LegacyId, reason: &str) {
        println!("Skipped legacy id #{legacy_id}, reason: {reason}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = EtlConfig::load(cli.config.as_deref())?;
    cfg.apply_cli_overrides(cli.verbose);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg.redacted())?);
        return Ok(());
    }
    logging::init(&cfg.logging)?;

    match cli.command {
        Command::Schema => apply_schema(&cfg).await,
        Command::Tenant => tenants(&cfg, cli.json).await,
        Command::Migrate {
            kind,
            schema_name,
            tenant_id,
        } => {
            let selector = match (schema_name, tenant_id) {
                (Some(name), _) => TenantSelector::SchemaName(name),
                (None, Some(id)) => TenantSelector::LegacyId(id),
                (None, None) => anyhow::bail!("either --schema-name or --tenant-id is required"),
            };
            migrate(&cfg, kind, &selector, cli.json).await
        }
        Command::Kinds => print_kinds(cli.json),
    }
}

async fn destination(cfg: &EtlConfig) -> anyhow::Result<SeaOrmDestinationStore> {
    let conn = etl_db::connect(&cfg.destination)
        .await
        .context("cannot connect to the destination database")?;
    Ok(SeaOrmDestinationStore::new(conn))
}

async fn legacy(cfg: &DbConnConfig) -> anyhow::Result<SeaOrmLegacySource> {
    let conn = etl_db::connect(cfg)
        .await
        .context("cannot connect to the legacy database")?;
    Ok(SeaOrmLegacySource::new(conn))
}

/// Legacy connection settings for a run; a schema-name run on Postgres reads
/// through that schema's search path.
fn legacy_config(cfg: &EtlConfig, selector: &TenantSelector) -> anyhow::Result<DbConnConfig> {
    let mut legacy = cfg.legacy.clone();
    if let TenantSelector::SchemaName(name) = selector {
        let engine = etl_db::engine_from_dsn(&etl_db::build_dsn(&legacy)?)?;
        if engine == DbEngine::Postgres {
            legacy.schema = Some(name.clone());
        }
    }
    Ok(legacy)
}

async fn apply_schema(cfg: &EtlConfig) -> anyhow::Result<()> {
    let store = destination(cfg).await?;
    Migrator::up(store.conn(), None)
        .await
        .context("destination schema migration failed")?;
    tracing::info!("destination schema is up to date");
    Ok(())
}

async fn tenants(cfg: &EtlConfig, json: bool) -> anyhow::Result<()> {
    let source = legacy(&cfg.legacy).await?;
    let store = destination(cfg).await?;
    let import = import_tenants(&source, &store).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&import)?);
    } else {
        for tenant in &import.tenants {
            println!(
                "Imported tenant {} ({}) from franchise #{}",
                tenant.schema_name, tenant.id, tenant.old_id
            );
        }
        for skipped in &import.skipped {
            println!(
                "Skipped franchise #{}, reason: {}",
                skipped.legacy_id, skipped.reason
            );
        }
        println!("{import}");
    }
    Ok(())
}

/// Blob store for a run. Private files cannot be migrated without one.
fn blob_store(cfg: &EtlConfig, kind: EntityKind) -> anyhow::Result<Option<Arc<dyn BlobStore>>> {
    match &cfg.blobs {
        Some(b) => Ok(Some(Arc::new(FsBlobStore::new(
            b.source_dir.clone(),
            b.destination_dir.clone(),
        )))),
        None if kind == EntityKind::PrivateFile => {
            anyhow::bail!("migrating {kind} requires `blobs.source_dir` and `blobs.destination_dir`")
        }
        None => Ok(None),
    }
}

async fn migrate(
    cfg: &EtlConfig,
    kind: EntityKind,
    selector: &TenantSelector,
    json: bool,
) -> anyhow::Result<()> {
    let blobs = blob_store(cfg, kind)?;
    let source = legacy(&legacy_config(cfg, selector)?).await?;
    let store = destination(cfg).await?;

    let mut pipeline = MigrationPipeline::new(
        cfg.pipeline_config(),
        Arc::new(store),
        Arc::new(source),
        blobs,
    );
    if cfg.pipeline.progress && !json {
        pipeline = pipeline.with_progress(Arc::new(StdoutProgress));
    }

    let report = pipeline.run(selector, kind).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn print_kinds(json: bool) -> anyhow::Result<()> {
    if json {
        let kinds: Vec<_> = EntityKind::ALL
            .iter()
            .map(|k| {
                serde_json::json!({
                    "kind": k.as_str(),
                    "legacy_table": k.legacy_table(),
                    "target_table": k.target_table(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&kinds)?);
    } else {
        for kind in EntityKind::ALL {
            println!(
                "{:<32} {} -> {}",
                kind.as_str(),
                kind.legacy_table(),
                kind.target_table()
            );
        }
    }
    Ok(())
}
