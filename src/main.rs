use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use pathsql::client::PathSqlClient;
use pathsql::config::PathSqlConfig;
use pathsql::executor::QueryParams;
use serde_json::Value;

/// pathsql - run SQL and print the result as nested JSON
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["query", "file"])))]
struct Cli {
    /// YAML configuration file (overrides environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named parameter `name=value`, bound to `:name`. Values parse as JSON, else as text.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// SQL text to run
    #[arg(long)]
    query: Option<String>,

    /// File containing the SQL to run
    #[arg(long)]
    file: Option<PathBuf>,
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.trim().to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = PathSqlConfig::from_env().context("Configuration error")?;
    if let Some(path) = &cli.config {
        let file_config = PathSqlConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        config.merge(file_config).context("Configuration error")?;
    }

    let sql = match (&cli.query, &cli.file) {
        (Some(sql), _) => sql.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("either --query or --file is required"),
    };
    let params: QueryParams = cli.params.into_iter().collect();

    let client = PathSqlClient::from_config(&config);
    let tree = client.path_query(&sql, &params).await?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&tree)?
    } else {
        serde_json::to_string(&tree)?
    };
    println!("{}", output);
    Ok(())
}
