//! Account Overview Example
//!
//! Prints the application info, balances and the latest operations of the
//! account behind `XJET_API_KEY`.
//!
//! Usage:
//!   cargo run --example account_overview
//!   cargo run --example account_overview -- <LIMIT>

use xjet_rs::ApiClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let limit = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u32>())
        .transpose()?
        .unwrap_or(10);

    println!("=== xJet Account Overview ===\n");

    let client = ApiClient::from_env()?;
    println!("✓ API client initialized ({})\n", client.transport().base_url());

    match client.account().me().await {
        Ok(me) => println!("Application:\n{}\n", serde_json::to_string_pretty(&me)?),
        Err(e) => println!("❌ account.me failed: {}\n", e),
    }

    match client.account().balance().await {
        Ok(balances) => println!("Balances:\n{}\n", serde_json::to_string_pretty(&balances)?),
        Err(e) => println!("❌ account.balances failed: {}\n", e),
    }

    match client.account().operations(limit, 0).await {
        Ok(operations) => println!(
            "Last {} operations:\n{}",
            limit,
            serde_json::to_string_pretty(&operations)?
        ),
        Err(e) => println!("❌ account.operations failed: {}", e),
    }

    Ok(())
}
