use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use timebank_signer::chain::{AccountAddress, ChainClient, Ledger, MoveValue, TxBuilder, TypeTag};
use timebank_signer::config::load_or_default;
use timebank_signer::custodial::{HttpCustodialWallet, ProviderClient};
use timebank_signer::observability::logging;
use timebank_signer::{TransactionRequest, UnifiedWallet};

#[derive(Parser)]
#[command(name = "timebank-cli")]
#[command(about = "Operator CLI for the Time Dollar signing layer", long_about = None)]
struct Cli {
    /// Key service base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8787")]
    url: String,

    /// Config file (chain, contracts, custodial provider)
    #[arg(short, long, env = "TIMEBANK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check key service and fullnode status
    Status,
    /// Fetch the normalized public key of a custodial wallet
    PublicKey { wallet_id: String },
    /// Show an account's sequence number on chain
    Account { address: String },
    /// Sign and submit an entry function with a custodial wallet
    Submit {
        /// Provider wallet id to sign with
        #[arg(long)]
        wallet_id: String,
        /// Function id, e.g. 0xC::members::request_membership
        function: String,
        /// Argument as kind:value (u64:10, address:0x1, bytes:0xdead, string:hi)
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Type argument, e.g. 0x1::aptos_coin::AptosCoin
        #[arg(long = "type-arg")]
        type_args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability);
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::PublicKey { wallet_id } => {
            let res = client
                .get(format!("{}/api/wallets/{}/public-key", cli.url, wallet_id))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Account { address } => {
            let address: AccountAddress = address.parse()?;
            let chain = ChainClient::new(config.chain.clone())?;
            let ledger = chain.ledger_info().await?;
            let sequence_number = chain.account_sequence_number(address).await?;
            print_json(&json!({
                "address": address.to_string(),
                "sequenceNumber": sequence_number.to_string(),
                "chainId": ledger.chain_id,
                "ledgerVersion": ledger.ledger_version,
            }))?;
        }
        Commands::Submit {
            wallet_id,
            function,
            args,
            type_args,
        } => {
            let arguments = args
                .iter()
                .map(|a| a.parse::<MoveValue>())
                .collect::<Result<Vec<_>, _>>()?;
            let type_arguments = type_args
                .iter()
                .map(|t| t.parse::<TypeTag>())
                .collect::<Result<Vec<_>, _>>()?;
            let request =
                TransactionRequest::parse(&function, arguments)?.with_type_arguments(type_arguments);

            let chain = ChainClient::new(config.chain.clone())?;
            chain.verify_chain_id().await?;
            let builder = TxBuilder::new(Arc::new(chain) as Arc<dyn Ledger>, config.chain.clone());

            let custodial = Arc::new(HttpCustodialWallet::new(
                ProviderClient::new(&config.custodial)?,
                &wallet_id,
            ));
            custodial.login().await?;

            let wallet = UnifiedWallet::builder(builder, &config.custodial.chain_type)
                .embedded(custodial)
                .explorer(config.explorer.clone())
                .build();

            let result = wallet.sign_and_submit(&request).await;
            wallet.disconnect().await;
            let result = result?;

            print_json(&json!({
                "hash": result.hash,
                "success": result.success,
                "vmStatus": result.vm_status,
                "wallet": result.wallet,
                "explorer": wallet.explorer_url(&result.hash),
            }))?;
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: key service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    print_json(&json)
}
