use clap::{Parser, Subcommand};
use client::{AccountData, AccountError, ClientConfig, HttpAccountData};
use serde_json::{Map, Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing session token; pass --token or set ACCOUNT_DATA_TOKEN")]
    MissingToken,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed with HTTP {0}")]
    Unhealthy(u16),
    #[error("{0}")]
    Account(#[from] AccountError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("`put` expects a JSON object")]
    NotAnObject,
}

#[derive(Parser, Debug)]
#[command(name = "accountdata-cli", about = "Account Data Service CLI")]
struct Cli {
    /// Service base URL; defaults to `ACCOUNT_DATA_URL` or the local server.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "ACCOUNT_DATA_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the service is up.
    Ping,
    /// Read one key, or every key when none is given.
    Get { key: Option<String> },
    /// Store one JSON value under a key.
    Set { key: String, value: String },
    /// Store every entry of a JSON object.
    Put { entries: String },
    /// Remove one key.
    Delete { key: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = with_base_url(ClientConfig::from_env(), cli.base_url);
    let api = HttpAccountData::from_config(&config)?;

    let token = cli.token.as_deref();
    let result = match cli.command {
        Command::Ping => return run_ping(api.base_url()).await,
        Command::Get { key: Some(key) } => {
            json!({ "value": api.fetch(require_token(token)?, &key).await? })
        }
        Command::Get { key: None } => Value::Object(api.fetch_all(require_token(token)?).await?),
        Command::Set { key, value } => {
            api.save(require_token(token)?, &key, &parse_value(&value)).await?;
            json!({ "success": true })
        }
        Command::Put { entries } => {
            let entries = parse_object(&entries)?;
            let saved = api.save_many(require_token(token)?, &entries).await?;
            json!({ "success": true, "saved": saved })
        }
        Command::Delete { key } => {
            api.delete(require_token(token)?, &key).await?;
            json!({ "success": true })
        }
    };
    print_json(&result)
}

/// Apply a `--base-url` override on top of environment configuration.
fn with_base_url(config: ClientConfig, base_url: Option<String>) -> ClientConfig {
    match base_url {
        Some(base_url) => ClientConfig { base_url, ..config },
        None => config,
    }
}

fn require_token(token: Option<&str>) -> Result<&str, CliError> {
    token.filter(|t| !t.trim().is_empty()).ok_or(CliError::MissingToken)
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::Client::new().get(format!("{base_url}/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

/// Parse a command-line value as JSON, treating anything that is not valid
/// JSON as a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::NotAnObject),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
