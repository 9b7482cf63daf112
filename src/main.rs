//! ccloud - command line client for the Currencycloud API
//!
//! Main entry point. Every command prints its result as pretty JSON.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use currencycloud::types::{BankAccountType, EntityType, PaymentType};
use currencycloud::config::validate_config_result;
use currencycloud::{
    cancellable, with_retry, BalanceFilter, BeneficiaryDetails, BeneficiaryFilter,
    BeneficiaryUpdate, ClientConfig, CurrencyCloudClient, NewBeneficiary, PageRequest,
    RetryConfig, SortOrder,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::process;

/// ccloud - Currencycloud beneficiaries, accounts and balances
#[derive(Parser, Debug)]
#[command(name = "ccloud")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/currencycloud/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Auth token from an earlier `ccloud login`
    #[arg(long, env = "CURRENCYCLOUD_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Retry transient failures this many times
    #[arg(long, default_value = "0")]
    retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a session and print the auth token
    Login {
        /// Login id (default: login_id from the config file)
        #[arg(short, long)]
        login_id: Option<String>,

        /// API key (default: read from the config's api_key_env)
        #[arg(long, env = "CURRENCYCLOUD_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Close the session behind the current token
    Logout,

    /// Manage beneficiaries
    #[command(subcommand)]
    Beneficiary(BeneficiaryCommands),

    /// Account information
    #[command(subcommand)]
    Account(AccountCommands),

    /// Balance lookups
    #[command(subcommand)]
    Balance(BalanceCommands),
}

#[derive(Subcommand, Debug)]
enum BeneficiaryCommands {
    /// Check bank details without saving them
    Validate {
        #[command(flatten)]
        details: DetailsArgs,
    },

    /// Create a beneficiary
    Create {
        /// Account holder's name
        #[arg(long)]
        holder: String,

        /// Nickname for the beneficiary
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,

        /// Make this the default beneficiary for its currency
        #[arg(long)]
        default: bool,

        #[command(flatten)]
        details: DetailsArgs,
    },

    /// Show one beneficiary
    Get { id: String },

    /// Show the first beneficiary matching the filter
    First {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Search beneficiaries
    Find {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Change fields on a beneficiary
    Update {
        id: String,

        #[command(flatten)]
        update: UpdateArgs,
    },

    /// Delete a beneficiary
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum AccountCommands {
    /// Show the account behind the current token
    Current,
}

#[derive(Subcommand, Debug)]
enum BalanceCommands {
    /// Show the balance held in one currency
    Get {
        /// ISO 4217 currency code (e.g. GBP)
        currency: String,
    },

    /// Search balances
    Find {
        #[arg(long)]
        amount_from: Option<Decimal>,

        #[arg(long)]
        amount_to: Option<Decimal>,

        #[command(flatten)]
        page: PageArgs,
    },
}

/// Bank details shared by validate and create
#[derive(Args, Debug)]
struct DetailsArgs {
    /// Two-letter country code of the bank
    #[arg(long)]
    bank_country: String,

    /// Currency the beneficiary is paid in
    #[arg(long)]
    currency: String,

    #[arg(long)]
    beneficiary_country: Option<String>,

    #[arg(long)]
    account_number: Option<String>,

    /// e.g. sort_code, aba, bsb_code
    #[arg(long)]
    routing_code_type: Option<String>,

    #[arg(long)]
    routing_code_value: Option<String>,

    #[arg(long)]
    bic_swift: Option<String>,

    #[arg(long)]
    iban: Option<String>,

    #[arg(long)]
    bank_account_type: Option<BankAccountType>,

    #[arg(long)]
    entity_type: Option<EntityType>,

    /// Repeat for each payment type (regular, priority)
    #[arg(long = "payment-type")]
    payment_types: Vec<PaymentType>,

    /// Repeat for each address line
    #[arg(long = "beneficiary-address")]
    beneficiary_address: Vec<String>,
}

impl DetailsArgs {
    fn into_details(self) -> BeneficiaryDetails {
        BeneficiaryDetails {
            beneficiary_country: self.beneficiary_country,
            account_number: self.account_number,
            routing_code_type_1: self.routing_code_type,
            routing_code_value_1: self.routing_code_value,
            bic_swift: self.bic_swift,
            iban: self.iban,
            bank_account_type: self.bank_account_type,
            beneficiary_entity_type: self.entity_type,
            payment_types: self.payment_types,
            beneficiary_address: self.beneficiary_address,
            ..BeneficiaryDetails::new(self.bank_country, self.currency)
        }
    }
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Account holder's name
    #[arg(long)]
    holder: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    currency: Option<String>,

    #[arg(long)]
    beneficiary_country: Option<String>,

    #[arg(long)]
    account_number: Option<String>,

    #[arg(long)]
    iban: Option<String>,

    /// Only default beneficiaries
    #[arg(long)]
    default: bool,

    #[arg(long = "payment-type")]
    payment_types: Vec<PaymentType>,
}

impl From<FilterArgs> for BeneficiaryFilter {
    fn from(args: FilterArgs) -> Self {
        BeneficiaryFilter {
            bank_account_holder_name: args.holder,
            name: args.name,
            currency: args.currency,
            beneficiary_country: args.beneficiary_country,
            account_number: args.account_number,
            iban: args.iban,
            default_beneficiary: args.default.then_some(true),
            payment_types: args.payment_types,
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    per_page: Option<u32>,

    /// Field to sort by (e.g. created_at)
    #[arg(long)]
    order: Option<String>,

    /// asc or desc
    #[arg(long)]
    direction: Option<SortOrder>,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        PageRequest {
            page: args.page,
            per_page: args.per_page,
            order: args.order,
            order_asc_desc: args.direction,
        }
    }
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[arg(long)]
    holder: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long, conflicts_with = "clear_email")]
    email: Option<String>,

    /// Remove the stored email address
    #[arg(long)]
    clear_email: bool,

    #[arg(long)]
    account_number: Option<String>,

    #[arg(long)]
    iban: Option<String>,

    #[arg(long)]
    bic_swift: Option<String>,

    #[arg(long)]
    default: Option<bool>,

    #[arg(long = "payment-type")]
    payment_types: Vec<PaymentType>,
}

impl From<UpdateArgs> for BeneficiaryUpdate {
    fn from(args: UpdateArgs) -> Self {
        let email = if args.clear_email {
            Some(None)
        } else {
            args.email.map(Some)
        };

        BeneficiaryUpdate {
            bank_account_holder_name: args.holder,
            name: args.name,
            email,
            account_number: args.account_number.map(Some),
            iban: args.iban.map(Some),
            bic_swift: args.bic_swift.map(Some),
            default_beneficiary: args.default,
            payment_types: (!args.payment_types.is_empty()).then_some(args.payment_types),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = currencycloud::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    validate_config_result(&config)?;

    let client = CurrencyCloudClient::from_config(&config)
        .context("Failed to create API client")?;
    if let Some(token) = cli.token {
        client.set_auth_token(token);
    }

    let retry = if cli.retries == 0 {
        RetryConfig::none()
    } else {
        RetryConfig::default().with_max_retries(cli.retries)
    };

    tracing::debug!(base_url = %client.base_url(), retries = cli.retries, "Client ready");

    match cli.command {
        Commands::Login { login_id, api_key } => {
            let login_id = login_id
                .or_else(|| config.login_id.clone())
                .context("No login id given. Pass --login-id or set login_id in the config file")?;
            let api_key = api_key.or_else(|| config.api_key()).with_context(|| {
                format!(
                    "No API key given. Pass --api-key or set {}",
                    config.api_key_env.trim_start_matches('$')
                )
            })?;

            let token = call(&retry, "authenticate", || {
                client.authenticate(&login_id, &api_key)
            })
            .await?;
            print_json(&serde_json::json!({ "auth_token": token }))
        }
        Commands::Logout => {
            call(&retry, "end_session", || client.end_session()).await?;
            print_json(&serde_json::json!({ "closed": true }))
        }
        Commands::Beneficiary(cmd) => run_beneficiary(&client, &retry, cmd).await,
        Commands::Account(AccountCommands::Current) => {
            let account = call(&retry, "current_account", || client.current_account()).await?;
            print_json(&account)
        }
        Commands::Balance(BalanceCommands::Get { currency }) => {
            let balance = call(&retry, "find_balance", || client.find_balance(&currency)).await?;
            print_json(&balance)
        }
        Commands::Balance(BalanceCommands::Find {
            amount_from,
            amount_to,
            page,
        }) => {
            let filter = BalanceFilter {
                amount_from,
                amount_to,
                as_at_date: None,
            };
            let page = PageRequest::from(page);
            let balances = call(&retry, "find_balances", || {
                client.find_balances(&filter, &page)
            })
            .await?;
            print_json(&balances)
        }
    }
}

async fn run_beneficiary(
    client: &CurrencyCloudClient,
    retry: &RetryConfig,
    cmd: BeneficiaryCommands,
) -> anyhow::Result<()> {
    match cmd {
        BeneficiaryCommands::Validate { details } => {
            let details = details.into_details();
            let validated = call(retry, "validate_beneficiary", || {
                client.validate_beneficiary(&details)
            })
            .await?;
            print_json(&validated)
        }
        BeneficiaryCommands::Create {
            holder,
            name,
            email,
            default,
            details,
        } => {
            let beneficiary = NewBeneficiary {
                bank_account_holder_name: holder,
                name,
                email,
                default_beneficiary: default.then_some(true),
                details: details.into_details(),
            };
            let created = call(retry, "create_beneficiary", || {
                client.create_beneficiary(&beneficiary)
            })
            .await?;
            print_json(&created)
        }
        BeneficiaryCommands::Get { id } => {
            let beneficiary = call(retry, "retrieve_beneficiary", || {
                client.retrieve_beneficiary(&id)
            })
            .await?;
            print_json(&beneficiary)
        }
        BeneficiaryCommands::First { filter } => {
            let filter = BeneficiaryFilter::from(filter);
            let beneficiary = call(retry, "first_beneficiary", || {
                client.first_beneficiary(&filter)
            })
            .await?;
            print_json(&beneficiary)
        }
        BeneficiaryCommands::Find { filter, page } => {
            let filter = BeneficiaryFilter::from(filter);
            let page = PageRequest::from(page);
            let found = call(retry, "find_beneficiaries", || {
                client.find_beneficiaries(&filter, &page)
            })
            .await?;
            print_json(&found)
        }
        BeneficiaryCommands::Update { id, update } => {
            let update = BeneficiaryUpdate::from(update);
            if update.is_empty() {
                bail!("Nothing to update. Pass at least one field to change");
            }
            let updated = call(retry, "update_beneficiary", || {
                client.update_beneficiary(&id, &update)
            })
            .await?;
            print_json(&updated)
        }
        BeneficiaryCommands::Delete { id } => {
            let deleted = call(retry, "delete_beneficiary", || {
                client.delete_beneficiary(&id)
            })
            .await?;
            print_json(&deleted)
        }
    }
}

/// Explicit --config must exist; the default path may be absent
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ClientConfig> {
    if let Some(path) = path {
        return ClientConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = ClientConfig::default_path();
    if default_path.exists() {
        ClientConfig::load(&default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display()))
    } else {
        tracing::debug!(path = %default_path.display(), "No config file, using defaults");
        Ok(ClientConfig::default())
    }
}

/// Run one API call under the retry policy, abandoning it on Ctrl-C
async fn call<T, F, Fut>(retry: &RetryConfig, operation: &str, op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = currencycloud::Result<T>>,
{
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    cancellable(with_retry(retry, operation, op), ctrl_c)
        .await
        .with_context(|| format!("{} failed", operation))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to render result")?;
    println!("{}", json);
    Ok(())
}
