use campus_pay::config::Config;
use campus_pay::error::{Error, Result};
use campus_pay::ledger::Ledger;
use campus_pay::logger::Logger;
use campus_pay::service::LedgerService;
use campus_pay::storage::{FileStorage, Storage};
use clap::{Parser, Subcommand};
use std::fs;

/// Genesis owner when `init` is run without an explicit address.
const DEFAULT_OWNER: &str = "admin";

#[derive(Parser)]
#[command(name = "campus-pay")]
#[command(about = "Campus Pay CLI - token ledger for campus service payments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: "human" or "json"
    #[arg(short, long, default_value = "human")]
    pub format: String,

    /// Data directory path
    #[arg(short, long)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the data directory and genesis ledger
    Init {
        /// Owner address (defaults to "admin")
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Buy tokens with base currency
    Buy {
        /// Buyer address
        caller: String,

        /// Token units to purchase
        tokens: u64,

        /// Base currency sent (excess over the price is retained)
        currency: u64,
    },

    /// Pay for a campus service
    Pay {
        /// Payer address
        caller: String,

        /// Service name (e.g. "Laundry")
        service: String,

        /// Token units to spend
        amount: u64,
    },

    /// Owner-only: distribute tokens to an account
    Distribute {
        /// Caller address (must be the owner)
        caller: String,

        /// Recipient address
        to: String,

        /// Token units to credit
        amount: u64,
    },

    /// Owner-only: withdraw the accumulated currency balance
    Withdraw {
        /// Caller address (must be the owner)
        caller: String,
    },

    /// Show account information
    Account {
        /// Account address
        address: String,
    },

    /// Show payment history for an account
    History {
        /// Account address
        address: String,

        /// Show only the most recent N records
        #[arg(short, long, default_value_t = 5)]
        last: usize,
    },

    /// Show ledger metadata and currency balance
    Info,
}

/// Format output based on format type
fn format_output<T: serde::Serialize + std::fmt::Debug>(data: &T, format: &str) -> Result<String> {
    match format {
        "json" => serde_json::to_string_pretty(data)
            .map_err(|e| Error::StateError(format!("Failed to serialize JSON: {}", e))),
        _ => Ok(format!("{:#?}", data)),
    }
}

fn open_service(config: &Config) -> Result<LedgerService<FileStorage>> {
    let storage = FileStorage::new(config);
    LedgerService::open(DEFAULT_OWNER.to_string(), storage)
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.set_data_dir(std::path::PathBuf::from(dir));
    }
    if cli.format == "json" {
        config.set_output_format("json".to_string());
    }
    Logger::set_level(config.get_log_level());
    Logger::debug(&format!("Using data directory: {}", config.get_data_dir().display()));

    match cli.command {
        Commands::Init { owner } => {
            fs::create_dir_all(config.get_data_dir())
                .map_err(|e| Error::StateError(format!("Failed to create data directory: {}", e)))?;

            let mut storage = FileStorage::new(&config);
            if storage.load_ledger()?.is_none() {
                let owner = owner.unwrap_or_else(|| DEFAULT_OWNER.to_string());
                storage.persist_ledger(&Ledger::new(owner), 0)?;
            }

            println!(
                "Initialized data directory at: {}",
                config.get_data_dir().display()
            );
            Ok(())
        }

        Commands::Buy {
            caller,
            tokens,
            currency,
        } => {
            let service = open_service(&config)?;
            service.buy_tokens(&caller, tokens, currency)?;
            println!("✓ Purchased {} tokens for {}", tokens, caller);
            Ok(())
        }

        Commands::Pay {
            caller,
            service: service_name,
            amount,
        } => {
            let service = open_service(&config)?;
            let record = service.pay_for_service(&caller, &service_name, amount)?;
            println!("✓ Paid {} tokens for {}", amount, service_name);
            println!("  Receipt: {}", record.receipt);
            Ok(())
        }

        Commands::Distribute { caller, to, amount } => {
            let service = open_service(&config)?;
            service.distribute_tokens(&caller, &to, amount)?;
            println!("✓ Distributed {} tokens to {}", amount, to);
            Ok(())
        }

        Commands::Withdraw { caller } => {
            let service = open_service(&config)?;
            let amount = service.withdraw_currency(&caller)?;
            println!("✓ Withdrew {} currency units", amount);
            Ok(())
        }

        Commands::Account { address } => {
            let service = open_service(&config)?;
            let output = AccountOutput {
                address: address.clone(),
                balance: service.balance_of(&address)?,
                total_spent: service.total_spent_by(&address)?,
                payment_count: service.payment_count(&address)?,
            };
            println!("{}", format_output(&output, &cli.format)?);
            Ok(())
        }

        Commands::History { address, last } => {
            let service = open_service(&config)?;
            let payments: Vec<PaymentOutput> = service
                .recent_payments(&address, last)?
                .iter()
                .map(|r| PaymentOutput {
                    service: r.service.clone(),
                    amount: r.amount,
                    timestamp: r.timestamp,
                    receipt: r.receipt.clone(),
                })
                .collect();

            let output = HistoryOutput {
                address: address.clone(),
                total: service.payment_count(&address)?,
                payments,
            };
            println!("{}", format_output(&output, &cli.format)?);
            Ok(())
        }

        Commands::Info => {
            let service = open_service(&config)?;
            let ledger = service.snapshot()?;
            let output = InfoOutput {
                name: ledger.name().to_string(),
                symbol: ledger.symbol().to_string(),
                decimals: ledger.decimals(),
                owner: ledger.owner().to_string(),
                currency_balance: ledger.currency_balance(),
                accounts: ledger.accounts.len(),
            };
            println!("{}", format_output(&output, &cli.format)?);
            Ok(())
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct AccountOutput {
    address: String,
    balance: u64,
    total_spent: u64,
    payment_count: usize,
}

#[derive(Debug, serde::Serialize)]
struct PaymentOutput {
    service: String,
    amount: u64,
    timestamp: i64,
    receipt: String,
}

#[derive(Debug, serde::Serialize)]
struct HistoryOutput {
    address: String,
    total: usize,
    payments: Vec<PaymentOutput>,
}

#[derive(Debug, serde::Serialize)]
struct InfoOutput {
    name: String,
    symbol: String,
    decimals: u8,
    owner: String,
    currency_balance: u64,
    accounts: usize,
}
