//! Clickzin tracker CLI
//!
//! Usage:
//!   clickzin-tracker fingerprint --address 10.0.0.5 --user-agent "iOS 17.0"
//!   clickzin-tracker track --api-key KEY --install-id VENDOR-ID \
//!     --address en0=10.0.0.5 --os "iOS 17.0" --event purchase
//!
//! Set RUST_LOG=debug to see every postback.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracker_client::{StaticDevice, TrackerBuilder, TrackerConfig};
use tracker_core::{compute_fingerprint, MatchContract};

#[derive(Parser, Debug)]
#[command(name = "clickzin-tracker")]
#[command(about = "Report install attribution and events to the Clickzin postback endpoint")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the deferred-match fingerprint for an address and user agent
    Fingerprint {
        #[arg(long)]
        address: String,

        #[arg(long)]
        user_agent: String,
    },

    /// Attribute this install, then report any events
    Track {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Publisher API key (overrides the config file)
        #[arg(long, env = "CLICKZIN_API_KEY")]
        api_key: Option<String>,

        /// Confirm a sentinel install without fingerprint matching
        #[arg(long)]
        test_mode: bool,

        #[arg(long)]
        base_url: Option<String>,

        /// Match reply contract: marker (v1) or structured (v2)
        #[arg(long, value_parser = parse_contract)]
        contract: Option<MatchContract>,

        /// Vendor-scoped install identifier (required unless --test-mode)
        #[arg(long, required_unless_present = "test_mode")]
        install_id: Option<String>,

        #[arg(long, default_value = "")]
        app_name: String,

        /// OS name and version, fingerprinted as the user agent
        #[arg(long, default_value = "")]
        os: String,

        /// Network address as IFACE=ADDR (repeatable)
        #[arg(long = "address", value_parser = parse_interface)]
        addresses: Vec<(String, String)>,

        /// Event to report after attribution (repeatable)
        #[arg(long = "event")]
        events: Vec<String>,
    },
}

fn parse_interface(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((iface, addr)) if !iface.is_empty() => Ok((iface.to_string(), addr.to_string())),
        _ => Err(format!("expected IFACE=ADDR, got {:?}", raw)),
    }
}

fn parse_contract(raw: &str) -> std::result::Result<MatchContract, String> {
    match raw {
        "marker" | "v1" => Ok(MatchContract::Marker),
        "structured" | "v2" => Ok(MatchContract::Structured),
        other => Err(format!("unknown match contract {:?}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Fingerprint {
            address,
            user_agent,
        } => {
            println!("{}", compute_fingerprint(&address, &user_agent));
        }
        Command::Track {
            config,
            api_key,
            test_mode,
            base_url,
            contract,
            install_id,
            app_name,
            os,
            addresses,
            events,
        } => {
            let mut tracker_config = match (&config, api_key) {
                (Some(path), key) => {
                    let mut loaded = TrackerConfig::load(path)
                        .with_context(|| format!("loading {}", path.display()))?;
                    if let Some(key) = key {
                        loaded.api_key = key;
                    }
                    loaded
                }
                (None, Some(key)) => TrackerConfig::new(key),
                (None, None) => anyhow::bail!("either --config or --api-key is required"),
            };
            if test_mode {
                tracker_config.test_mode = true;
            }
            if let Some(url) = base_url {
                tracker_config.base_url = url;
            }
            if let Some(contract) = contract {
                tracker_config.match_contract = contract;
            }

            let mut device = StaticDevice::new(install_id.unwrap_or_default())
                .with_app_name(app_name)
                .with_os_version(os);
            for (iface, addr) in addresses {
                device = device.with_interface(iface, addr);
            }

            let tracker = TrackerBuilder::new(device).config(tracker_config).build()?;

            tracker
                .start_tracking()
                .await
                .context("install attribution failed")?;

            for event in &events {
                tracker
                    .track_event(event)
                    .await
                    .with_context(|| format!("reporting event {}", event))?;
            }

            println!("{}", serde_json::to_string_pretty(&tracker.snapshot())?);
        }
    }

    Ok(())
}
