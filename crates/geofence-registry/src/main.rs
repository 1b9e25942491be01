//! geofencectl - manage named geofences from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geofence_registry::{
    Config, GeofenceController, GeofenceListener, NamedGeofence, RegistryError,
};
use geofencing_client::HttpGeofencingClient;
use preference_store::FilePreferences;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "geofencectl", version, about = "Manage named geofences")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered geofences
    List,
    /// Register a geofence
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Radius in meters
        #[arg(long)]
        radius: f32,
        /// Expire the fence after this many milliseconds
        #[arg(long)]
        expiration_ms: Option<u64>,
    },
    /// Remove geofences by id
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Remove every registered geofence
    Clear,
    /// Check that the geofencing service is reachable
    Health,
}

/// Logs each operation's outcome.
struct LogListener;

impl GeofenceListener for LogListener {
    fn on_geofences_updated(&self) {
        info!("Geofences updated");
    }

    fn on_error(&self, error: &RegistryError) {
        error!("Geofence operation failed: {}", error);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = HttpGeofencingClient::new(
        &config.service.base_url,
        config.service.api_key.clone(),
        config.service.request_timeout,
    )
    .context("Failed to create geofencing client")?;
    let client = Arc::new(client);

    let store = FilePreferences::open(&config.registry.data_dir, &config.registry.namespace)
        .context("Failed to open geofence store")?;

    let controller = GeofenceController::initialize(
        Arc::new(store),
        client.clone(),
        config.registry.controller_settings(),
    )
    .await
    .context("Failed to load geofences")?;

    match cli.command {
        Command::List => {
            for fence in controller.named_geofences().await {
                println!(
                    "{}\t{}\t{:.6},{:.6}\t{}m",
                    fence.id, fence.name, fence.latitude, fence.longitude, fence.radius
                );
            }
        }
        Command::Add {
            id,
            name,
            latitude,
            longitude,
            radius,
            expiration_ms,
        } => {
            let mut fence = NamedGeofence::new(id, name, latitude, longitude, radius);
            if let Some(ms) = expiration_ms {
                fence = fence.with_expiration(Duration::from_millis(ms));
            }
            controller.add_geofence(fence, &LogListener).await?;
        }
        Command::Remove { ids } => {
            let mut fences = Vec::with_capacity(ids.len());
            for id in &ids {
                let fence = controller
                    .get(id)
                    .await
                    .with_context(|| format!("No geofence with id {}", id))?;
                fences.push(fence);
            }
            controller.remove_geofences(&fences, &LogListener).await?;
        }
        Command::Clear => {
            controller.remove_all_geofences(&LogListener).await?;
        }
        Command::Health => {
            if !client.health_check().await {
                anyhow::bail!("Geofencing service at {} is unreachable", client.base_url());
            }
            println!("{}: healthy", client.base_url());
        }
    }

    Ok(())
}
