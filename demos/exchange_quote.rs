//! Exchange Quote Example
//!
//! Lists the tradable pairs and quotes a buy on the first one.
//!
//! Usage:
//!   cargo run --example exchange_quote
//!   cargo run --example exchange_quote -- <AMOUNT>

use serde_json::Value;
use xjet_rs::{ApiClient, OrderSide};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let amount: f64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 1.0,
    };

    let client = ApiClient::from_env()?;

    let pairs = match client.exchanges().pairs().await {
        Ok(pairs) => pairs,
        Err(e) => {
            println!("❌ exchanges.pairs failed: {}", e);
            return Ok(());
        }
    };
    println!("Pairs:\n{}\n", serde_json::to_string_pretty(&pairs)?);

    // Either a bare list of pairs or {"pairs": [...]}
    let list = pairs.get("pairs").unwrap_or(&pairs);
    let first = list
        .as_array()
        .and_then(|pairs| pairs.first())
        .and_then(Value::as_array)
        .and_then(|pair| Some([pair.first()?.as_str()?, pair.get(1)?.as_str()?]));

    let Some(pair) = first else {
        println!("No pairs available");
        return Ok(());
    };

    println!("Quoting a buy of {} on {}/{}...", amount, pair[0], pair[1]);
    match client.exchanges().estimate(pair, OrderSide::Buy, amount).await {
        Ok(quote) => println!("{}", serde_json::to_string_pretty(&quote)?),
        Err(e) => println!("❌ exchanges.estimate failed: {}", e),
    }

    Ok(())
}
