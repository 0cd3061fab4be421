//! Run one query from the command line and print the response as JSON.
//!
//! ```sh
//! autoquery --configuration ./config QueryRockstars Age=27 take=2 include='COUNT(*)'
//! ```

use std::path::PathBuf;

use clap::Parser;

use autoquery::{AutoQuery, QueryRequest, Registry};
use autoquery_configuration::environment::ProcessEnvironment;

#[derive(Debug, Parser)]
#[command(name = "autoquery")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query tables through the descriptors of a configuration")]
struct Cli {
    /// The configuration directory
    #[arg(long, env = "AUTOQUERY_CONFIGURATION")]
    configuration: PathBuf,

    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,

    /// The query descriptor to run
    descriptor: String,

    /// Request parameters in key=value format
    #[arg(value_parser = parse_param)]
    params: Vec<(String, String)>,
}

fn parse_param(param: &str) -> Result<(String, String), String> {
    match param.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, found '{param}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the response
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let parsed = autoquery_configuration::parse_configuration(&cli.configuration).await?;
    let configuration =
        autoquery_configuration::make_runtime_configuration(parsed, ProcessEnvironment)?;

    let mut metrics_registry = prometheus::Registry::new();
    let engine = AutoQuery::connect(configuration, Registry::new(), &mut metrics_registry).await?;

    let request = QueryRequest::from_params(cli.descriptor, cli.params);
    let response = engine.query(request).await?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_split_on_the_first_equals_sign() {
        assert_eq!(
            parse_param("_where=\"Age\" = 27"),
            Ok(("_where".to_string(), "\"Age\" = 27".to_string()))
        );
        assert_eq!(parse_param("Age="), Ok(("Age".to_string(), String::new())));
        assert!(parse_param("Age").is_err());
        assert!(parse_param("=27").is_err());
    }

    #[test]
    fn arguments_bind_a_request() {
        let cli = Cli::try_parse_from([
            "autoquery",
            "--configuration",
            "config",
            "QueryRockstars",
            "Age=27",
            "take=2",
        ])
        .unwrap();
        assert_eq!(cli.configuration, PathBuf::from("config"));
        let request = QueryRequest::from_params(cli.descriptor, cli.params);
        assert_eq!(
            request,
            QueryRequest::new("QueryRockstars")
                .param("Age", "27")
                .param("take", "2")
        );
    }
}
