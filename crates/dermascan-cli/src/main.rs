mod output;

use clap::{Parser, Subcommand};
use dermascan_client::DermascanClient;
use dermascan_session::Session;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dermascan")]
#[command(about = "Skin image analysis and nearby dermatologist lookup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload a photo for classification and print the top label
    Classify {
        /// Path to the image (any format the decoder supports)
        path: std::path::PathBuf,
    },
    /// List dermatologists and doctor offices near a location
    Doctors {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Simulate a refused location permission (no request is made)
        #[arg(long)]
        permission_denied: bool,
        /// Print providers as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = dermascan_core::load_client_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "loaded configuration");

    let session = Session::new(DermascanClient::new(&config)?);

    match cli.command {
        Commands::Classify { path } => {
            let decoded = image::open(&path)
                .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", path.display()))?;
            let mut rx = session.subscribe_analysis();
            session.set_image(decoded);
            if session.analyze().is_some() {
                let state = rx.wait_for(|s| !s.is_analyzing && s.result.is_some()).await?;
                println!("{}", state.result_label().unwrap_or_default());
            }
        }
        Commands::Doctors {
            lat,
            lon,
            permission_denied,
            json,
        } => {
            let mut rx = session.subscribe_doctors();
            if permission_denied {
                session.location_permission_denied();
            } else {
                session.fetch_nearby_doctors(lat, lon);
            }
            let state = rx
                .wait_for(|s| !s.is_loading() && s.phase != dermascan_session::LookupPhase::Idle)
                .await?
                .clone();
            if json {
                if let Some(message) = state.error_message() {
                    eprintln!("{message}");
                }
                println!("{}", serde_json::to_string_pretty(&state.providers)?);
            } else {
                print!("{}", output::render_doctors(&state));
            }
        }
    }

    Ok(())
}
