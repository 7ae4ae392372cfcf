//! Signed Withdrawal Example
//!
//! Withdraws funds to a TON address. Requires `XJET_PRIVATE_KEY` in
//! addition to `XJET_API_KEY`; run against testnet (`XJET_NETWORK=testnet`)
//! unless you mean it.
//!
//! Usage:
//!   cargo run --example signed_withdraw -- <TON_ADDRESS> <CURRENCY> <AMOUNT>

use xjet_rs::{ApiClient, CallError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: signed_withdraw <TON_ADDRESS> <CURRENCY> <AMOUNT>");
        std::process::exit(2);
    }
    let (ton_address, currency) = (&args[1], &args[2]);
    let amount: f64 = args[3].parse()?;

    let client = ApiClient::from_env()?;
    if !client.can_sign() {
        eprintln!("❌ XJET_PRIVATE_KEY is not set; withdrawals must be signed");
        std::process::exit(1);
    }
    if let Some(public_key) = client.verifying_key_hex() {
        println!("Signing with public key {}", public_key);
    }

    println!("Withdrawing {} {} to {}...", amount, currency, ton_address);
    match client.account().withdraw(ton_address, currency, amount).await {
        Ok(receipt) => {
            println!("✓ Withdrawal accepted:");
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Err(CallError::Application(error)) => {
            println!("❌ Rejected by xJet: {}", error);
        }
        Err(e) => {
            println!("❌ Request failed: {}", e);
        }
    }

    Ok(())
}
