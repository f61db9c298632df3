use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gladius_config::ConfigLoader;
use gladius_reactor::system_clock;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gladius")]
#[command(about = "Gladius partially fillable Dutch order tooling", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Configuration file path
	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, env = "GLADIUS_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the order hash, ABI encoding and Permit2 digest of an order
	Hash {
		/// JSON file holding a GladiusOrder
		order: PathBuf,
	},
	/// Resolve an order for a filler, quantity and time, including fees
	Resolve {
		/// JSON file holding a GladiusOrder
		order: PathBuf,
		/// Fill quantity in input token units; defaults to the full order
		#[arg(long)]
		quantity: Option<U256>,
		#[arg(long, default_value_t = Address::ZERO)]
		filler: Address,
		/// Unix timestamp to resolve at; defaults to now
		#[arg(long)]
		timestamp: Option<u64>,
	},
	/// Dry-run a signed order through the reactor checks
	Quote {
		/// JSON file holding a SignedOrder
		order: PathBuf,
		#[arg(long)]
		quantity: Option<U256>,
		#[arg(long, default_value_t = Address::ZERO)]
		filler: Address,
		#[arg(long)]
		timestamp: Option<u64>,
	},
	/// Sign an order with a swapper key
	Sign {
		/// JSON file holding a GladiusOrder
		order: PathBuf,
		/// Hex-encoded swapper private key
		#[arg(long, env = "GLADIUS_SWAPPER_KEY", hide_env_values = true)]
		key: String,
	},
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	info!("Starting gladius v{}", env!("CARGO_PKG_VERSION"));

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

	let now = || system_clock()();

	match cli.command {
		Commands::Hash { order } => {
			let order = commands::read_order(&order).await?;
			print_json(&commands::hash_order(&config, &order))?;
		}
		Commands::Resolve {
			order,
			quantity,
			filler,
			timestamp,
		} => {
			let order = commands::read_order(&order).await?;
			let now = timestamp.unwrap_or_else(now);
			let resolved = commands::resolve_order(&config, &order, quantity, filler, now)?;
			print_json(&resolved)?;
		}
		Commands::Quote {
			order,
			quantity,
			filler,
			timestamp,
		} => {
			let signed = commands::read_signed_order(&order).await?;
			let now = timestamp.unwrap_or_else(now);
			let resolved = commands::quote_order(&config, &signed, quantity, filler, now).await?;
			print_json(&resolved)?;
		}
		Commands::Sign { order, key } => {
			let order = commands::read_order(&order).await?;
			print_json(&commands::sign_order(&config, &order, &key)?)?;
		}
		Commands::Validate => {
			info!(
				reactor = %config.reactor.address,
				chain_id = config.reactor.chain_id,
				permit2 = %config.reactor.permit2,
				fees_enabled = config.fees.as_ref().is_some_and(|f| f.enabled),
				"Configuration is valid"
			);
		}
	}

	Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	Ok(())
}
