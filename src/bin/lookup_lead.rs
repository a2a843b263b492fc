//! One-shot lead lookup: fetches a lead and prints its normalized features.
//!
//! **Usage:**
//! ```bash
//! lookup_lead phone=3124784892 [email=someone@example.com ...]
//! ```

use clap::Parser;
use rust_tu_leads::config::Config;
use rust_tu_leads::enrichment::lookup_features;
use rust_tu_leads::models::LeadQuery;
use rust_tu_leads::normalizer::Normalizer;
use rust_tu_leads::transunion_client::TransunionClient;
use serde_json::Value;

/// Transunion lead lookup
#[derive(Parser, Debug)]
#[clap(name = "lookup_lead")]
#[clap(about = "Look a lead up at Transunion and print its normalized features")]
struct Cli {
    /// Identifiers sent to Transunion, as key=value pairs
    #[arg(required = true, value_name = "KEY=VALUE", value_parser = parse_key_val)]
    params: Vec<(String, Value)>,
}

impl Cli {
    fn query(&self) -> LeadQuery {
        let mut query = LeadQuery::new();
        for (key, value) in &self.params {
            query.insert(key.clone(), value.clone());
        }
        query
    }
}

/// Parses one `key=value` pair. Values made only of digits, without a leading
/// zero, are sent as numbers.
fn parse_key_val(arg: &str) -> Result<(String, Value), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", arg));
    }

    let value = match value.parse::<u64>() {
        Ok(n) if !value.starts_with('0') || value == "0" => Value::from(n),
        _ => Value::from(value),
    };
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let query = cli.query();
    let config = Config::from_env()?;
    let client = TransunionClient::new(&config.transunion)?;

    let response = lookup_features(&client, &Normalizer::default(), &query).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
