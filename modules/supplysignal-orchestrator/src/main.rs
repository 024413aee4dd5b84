use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use supplysignal_common::Config;
use supplysignal_ingest::{HttpClient, IngestDeps, WeatherFetcher};
use supplysignal_orchestrator::{CapabilityRegistry, WorkflowOrchestrator, WorkflowRequest};
use supplysignal_store::{demo, DisruptionRepository, DisruptionStore, PgStore, ShipmentSource};

#[derive(Parser)]
#[command(name = "supplysignal", about = "Supply chain disruption ingestion and risk workflows")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one ingestion pass and print its statistics
    Ingest,
    /// Run ingestion on the configured interval until Ctrl-C
    Watch,
    /// Run a named workflow
    Workflow {
        name: String,
        /// Workflow input as a JSON object
        #[arg(long)]
        input: Option<String>,
    },
    /// List available workflows
    Workflows,
    /// List active disruptions
    Disruptions,
    /// Mark a disruption resolved
    Resolve { id: Uuid },
}

struct Backend {
    repository: Arc<dyn DisruptionRepository>,
    shipments: Arc<dyn ShipmentSource>,
}

async fn open_backend(config: &Config) -> Result<Backend> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url).await.context("connecting to Postgres")?;
            store.migrate().await.context("applying schema")?;
            let store = Arc::new(store);
            Ok(Backend {
                repository: store.clone(),
                shipments: store,
            })
        }
        None => {
            info!("DATABASE_URL not set, using in-memory demo data");
            let store = Arc::new(demo::seeded_store());
            Ok(Backend {
                repository: store.clone(),
                shipments: store,
            })
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive("supplysignal=info".parse()?);
    if cli.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env()?;

    match cli.command {
        Command::Workflows => {
            let orchestrator = WorkflowOrchestrator::new(CapabilityRegistry::new());
            for name in orchestrator.available_workflows() {
                println!("{name}");
            }
        }
        Command::Ingest => {
            let backend = open_backend(&config).await?;
            let deps = IngestDeps::builder()
                .config(config)
                .repository(backend.repository)
                .build();
            let pipeline = deps.build_pipeline()?;
            let report = pipeline.run().await;
            println!("{}", report.stats);
        }
        Command::Watch => {
            let backend = open_backend(&config).await?;
            let deps = IngestDeps::builder()
                .config(config)
                .repository(backend.repository)
                .build();
            let scheduler = deps.build_scheduler()?;
            scheduler.start();
            info!(interval_secs = scheduler.interval().as_secs(), "Watching, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
            scheduler.stop();
            info!("Scheduler stopped");
        }
        Command::Workflow { name, input } => {
            let input_data: Value = match input {
                Some(raw) => serde_json::from_str(&raw).context("--input is not valid JSON")?,
                None => Value::Null,
            };
            let backend = open_backend(&config).await?;
            let http = Arc::new(HttpClient::from_config(&config)?);
            let weather = Arc::new(WeatherFetcher::new(
                http,
                &config.weather_api_url,
                config.weather_api_key.clone(),
            ));
            let registry =
                CapabilityRegistry::standard(backend.shipments, backend.repository, weather);
            let orchestrator = WorkflowOrchestrator::new(registry);

            let response = orchestrator
                .process(WorkflowRequest::new(name.as_str(), input_data))
                .await;
            print_json(&response)?;
            if response.is_error() {
                bail!("workflow {name} failed");
            }
        }
        Command::Disruptions => {
            let backend = open_backend(&config).await?;
            let store = DisruptionStore::new(backend.repository);
            print_json(&store.get_active_disruptions().await?)?;
        }
        Command::Resolve { id } => {
            let backend = open_backend(&config).await?;
            let store = DisruptionStore::new(backend.repository);
            let disruption = store
                .resolve_disruption(id)
                .await
                .with_context(|| format!("resolving disruption {id}"))?;
            print_json(&disruption)?;
        }
    }

    Ok(())
}
