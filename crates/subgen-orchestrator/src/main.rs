//! Subtitle generation pipeline binary: wires the Durable Job Store (C2),
//! Blob Adapter (C5), Model Adapter (C6), and Quality Gate's linguistic
//! scorer (C9) into a [`subgen_orchestrator::Scheduler`] and runs it until
//! a shutdown signal arrives.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use subgen_blob::{BlobAdapter, S3BlobAdapter, S3Client};
use subgen_jobstore::{FileJobStore, JobStore};
use subgen_modelclient::{ModelClient, ModelHttpClient, PromptTemplateRegistry};
use subgen_models::SystemClock;
use subgen_orchestrator::{OrchestratorConfig, Scheduler};
use subgen_quality::{IdentityScorer, LinguisticScorer};

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("subgen=info".parse().unwrap()))
        .init();

    info!("starting subgen-orchestrator");

    let config = OrchestratorConfig::from_env();
    info!(?config, "loaded configuration");

    let store: Arc<dyn JobStore> = match FileJobStore::new(&config.subgen.job_store_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "failed to open job store directory");
            std::process::exit(1);
        }
    };

    let s3_client = match S3Client::from_env().await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to configure object store client");
            std::process::exit(1);
        }
    };
    let blob: Arc<dyn BlobAdapter> = Arc::new(S3BlobAdapter::new(s3_client, &config.subgen));

    let model_http = match ModelHttpClient::from_env() {
        Ok(http) => http,
        Err(e) => {
            error!(error = %e, "failed to configure model client");
            std::process::exit(1);
        }
    };
    let templates = match PromptTemplateRegistry::load_dir(&config.subgen.prompt_template_registry_dir) {
        Ok(templates) => templates,
        Err(e) => {
            error!(error = %e, "failed to load prompt template registry");
            std::process::exit(1);
        }
    };
    let model = Arc::new(ModelClient::new(model_http, templates, &config.subgen));

    // Same-language jobs never invoke the scorer (spec.md §4.8), so the
    // always-accept identity scorer is a correct default; swap in a real
    // external scorer here once one is available.
    let scorer: Arc<dyn LinguisticScorer> = Arc::new(IdentityScorer);

    let clock = Arc::new(SystemClock);

    let scheduler = Arc::new(Scheduler::new(store, blob, model, scorer, clock, config));

    let shutdown_scheduler = Arc::clone(&scheduler);
    let shutdown_handle = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        shutdown_scheduler.shutdown();
    });

    scheduler.run().await;
    shutdown_handle.abort();

    info!("subgen-orchestrator shutdown complete");
}
