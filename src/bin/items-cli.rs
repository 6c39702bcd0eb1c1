use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use items_api::items::ItemQuality;

#[derive(Parser)]
#[command(name = "items-cli")]
#[command(about = "Command-line client for the items API", long_about = None)]
struct Cli {
    /// Base URL of the versioned API.
    #[arg(short, long, default_value = "http://localhost:8080/api/v1")]
    url: String,

    /// Accept self-signed TLS certificates.
    #[arg(long)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API answers
    Ping,
    /// List all items
    List,
    /// Show one item
    Get { id: String },
    /// Add an item
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quality: ItemQuality,
        #[arg(long)]
        value: f64,
    },
    /// Change some fields of an item
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quality: Option<ItemQuality>,
        #[arg(long)]
        value: Option<f64>,
    },
    /// Remove an item
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(cli.insecure)
        .build()?;
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Ping => client.get(format!("{}/", base)),
        Commands::List => client.get(format!("{}/items", base)),
        Commands::Get { id } => client.get(format!("{}/items/{}", base, id)),
        Commands::Create { name, quality, value } => client
            .post(format!("{}/items", base))
            .json(&json!({ "name": name, "quality": quality, "value": value })),
        Commands::Update { id, name, quality, value } => {
            let mut patch = Map::new();
            if let Some(name) = name {
                patch.insert("name".into(), json!(name));
            }
            if let Some(quality) = quality {
                patch.insert("quality".into(), json!(quality));
            }
            if let Some(value) = value {
                patch.insert("value".into(), json!(value));
            }
            client
                .put(format!("{}/items/{}", base, id))
                .json(&Value::Object(patch))
        }
        Commands::Delete { id } => client.delete(format!("{}/items/{}", base, id)),
    };

    let ok = print_response(request.send().await?).await?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let pretty = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or(text);

    if status.is_success() {
        println!("{}", pretty);
        Ok(true)
    } else {
        eprintln!("Error: API returned status {}", status);
        eprintln!("{}", pretty);
        Ok(false)
    }
}
