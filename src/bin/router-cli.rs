use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the worker router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a JSON payload through the router
    Route {
        /// JSON object to send, e.g. '{"game":"chess"}'
        payload: String,
    },
    /// List instances and their health
    Instances,
    /// Check router liveness
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Route { payload } => {
            let body: Value = serde_json::from_str(&payload)?;
            client.post(format!("{}/route", cli.url)).json(&body).send().await?
        }
        Commands::Instances => client.get(format!("{}/instances", cli.url)).send().await?,
        Commands::Status => client.get(format!("{}/health", cli.url)).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: router returned status {}", status);
        eprintln!("{}", rendered);
    }
    Ok(())
}
