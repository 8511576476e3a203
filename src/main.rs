//! Command-line front end for the Karobar sync layer.
//!
//! Runs one gateway operation against a local JSON-backed store and prints
//! the result as JSON. Useful for exercising retries, throttling and bulk
//! deletion without the app.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Map, Value};

use karobar_sync::config::loader::{load_config, load_from_env};
use karobar_sync::config::Platform;
use karobar_sync::ledger::{
    BsDate, CustomerUpdate, NewCustomer, NewTransactionEntry, TransactionType, TransactionUpdate,
};
use karobar_sync::observability::{logging, metrics};
use karobar_sync::{Gateway, MemoryStore, SyncContext};

const DEFAULT_DATA_PATH: &str = "karobar-data.json";

#[derive(Parser)]
#[command(name = "karobar-sync")]
#[command(about = "Resilient sync layer for the Karobar ledger", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, defaults plus KAROBAR_* variables apply.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file backing the local store.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Override the platform profile (android, ios, web).
    #[arg(short, long)]
    platform: Option<Platform>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check store settings and connectivity
    Check,
    /// Add a customer
    AddCustomer {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// List the most recently updated customers
    Customers {
        #[arg(long)]
        user: String,
    },
    /// Change a customer's name or phone
    UpdateCustomer {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a customer
    DeleteCustomer {
        #[arg(long)]
        id: String,
    },
    /// Record money given to or received from a customer
    AddEntry {
        #[arg(long)]
        user: String,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        customer_id: Option<String>,
        #[arg(long)]
        amount: Decimal,
        /// given or received
        #[arg(long)]
        kind: TransactionType,
        /// Bikram Sambat date, YYYY-MM-DD
        #[arg(long)]
        date: BsDate,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = Decimal::ZERO)]
        balance_after: Decimal,
    },
    /// List transaction entries, newest first
    Entries {
        #[arg(long)]
        user: String,
        /// Only entries for this exact customer name
        #[arg(long)]
        customer: Option<String>,
    },
    /// Change fields of a transaction entry
    UpdateEntry {
        #[arg(long)]
        id: String,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        kind: Option<TransactionType>,
        #[arg(long)]
        date: Option<BsDate>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        balance_after: Option<Decimal>,
    },
    /// Delete a transaction entry
    DeleteEntry {
        #[arg(long)]
        id: String,
    },
    /// Show a user's profile
    Profile {
        #[arg(long)]
        user: String,
    },
    /// Merge fields into a user's profile
    SetProfile {
        #[arg(long)]
        user: String,
        /// key=value; values that parse as JSON are stored as JSON
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },
    /// Delete a user's profile
    DeleteProfile {
        #[arg(long)]
        user: String,
    },
    /// Delete all customers, entries and the profile of a user
    Wipe {
        #[arg(long)]
        user: String,
    },
    /// Show the resolved platform profile and connection health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };
    if let Some(platform) = cli.platform {
        config.platform = platform;
    }

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let data_path = cli
        .data
        .clone()
        .or_else(|| config.store.data_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let store = Arc::new(MemoryStore::load_from_file(&data_path)?);
    tracing::debug!(path = %data_path.display(), documents = store.count(), "Store loaded");

    let gateway = Gateway::new(Arc::clone(&store), SyncContext::new(config));

    let mutated = match cli.command {
        Commands::Check => {
            print_json(&gateway.check_connection().await)?;
            false
        }
        Commands::AddCustomer { user, name, phone } => {
            let customer = gateway
                .add_customer(NewCustomer {
                    user_id: user,
                    name,
                    phone,
                    metadata: Map::new(),
                })
                .await?;
            print_json(&customer)?;
            true
        }
        Commands::Customers { user } => {
            print_json(&gateway.get_customers(&user).await?)?;
            false
        }
        Commands::UpdateCustomer { id, name, phone } => {
            let update = CustomerUpdate {
                name,
                phone,
                metadata: None,
            };
            gateway.update_customer(&id, update).await?;
            print_json(&json!({ "updated": id }))?;
            true
        }
        Commands::DeleteCustomer { id } => {
            gateway.delete_customer(&id).await?;
            print_json(&json!({ "deleted": id }))?;
            true
        }
        Commands::AddEntry {
            user,
            customer,
            customer_id,
            amount,
            kind,
            date,
            description,
            balance_after,
        } => {
            let entry = gateway
                .add_transaction_entry(NewTransactionEntry {
                    user_id: user,
                    customer_id,
                    customer_name: customer,
                    amount,
                    transaction_type: kind,
                    description,
                    transaction_date: date,
                    balance_after,
                })
                .await?;
            print_json(&entry)?;
            true
        }
        Commands::Entries { user, customer } => {
            let entries = match customer {
                Some(name) => {
                    gateway
                        .get_transaction_entries_by_customer_name(&user, &name)
                        .await?
                }
                None => gateway.get_transaction_entries(&user).await?,
            };
            print_json(&entries)?;
            false
        }
        Commands::UpdateEntry {
            id,
            customer,
            amount,
            kind,
            date,
            description,
            balance_after,
        } => {
            let update = TransactionUpdate {
                customer_name: customer,
                amount,
                transaction_type: kind,
                description,
                transaction_date: date,
                balance_after,
            };
            gateway.update_transaction_entry(&id, update).await?;
            print_json(&json!({ "updated": id }))?;
            true
        }
        Commands::DeleteEntry { id } => {
            gateway.delete_transaction_entry(&id).await?;
            print_json(&json!({ "deleted": id }))?;
            true
        }
        Commands::Profile { user } => {
            print_json(&gateway.get_user_profile(&user).await?)?;
            false
        }
        Commands::SetProfile { user, fields } => {
            let fields: Map<String, Value> = fields.into_iter().collect();
            print_json(&gateway.upsert_user_profile(&user, fields).await?)?;
            true
        }
        Commands::DeleteProfile { user } => {
            gateway.delete_user_profile(&user).await?;
            print_json(&json!({ "deleted": user }))?;
            true
        }
        Commands::Wipe { user } => {
            let report = gateway.delete_all_user_data(&user).await?;
            print_json(&report)?;
            true
        }
        Commands::Health => {
            let ctx = gateway.context();
            let health = ctx.health();
            print_json(&json!({
                "platform": ctx.config().platform.to_string(),
                "timeout_ms": ctx.profile().timeout_ms,
                "base_delay_ms": ctx.profile().base_delay_ms,
                "max_retries": ctx.retry_policy().max_retries,
                "health_monitoring": health.is_enabled(),
                "is_healthy": health.is_healthy(),
                "consecutive_failures": health.consecutive_failures(),
                "should_throttle": health.should_throttle(),
            }))?;
            false
        }
    };

    if mutated {
        store.save_to_file()?;
        tracing::debug!(path = %data_path.display(), "Store saved");
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
