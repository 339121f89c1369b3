use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result, bail};
use clap::Parser;
use pdns_auth_zone::{
    ApiConfig, PowerDnsClient, ZoneRequest, ZoneState,
    config::{DEFAULT_API_URL, DEFAULT_SERVER_ID},
    converge,
    zone::{PropertiesInput, ZoneKind},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// PowerDNS API URL
    #[arg(long, value_name = "URL", env = "PDNS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// PowerDNS API key
    #[arg(long, value_name = "KEY", env = "PDNS_API_KEY", hide_env_values = true)]
    api_key: String,
    /// PowerDNS server ID
    #[arg(long, value_name = "ID", env = "PDNS_SERVER_ID", default_value = DEFAULT_SERVER_ID)]
    server_id: String,
    /// JSON file holding the whole request (name, state, properties, metadata)
    #[arg(long, value_name = "PATH")]
    task: Option<PathBuf>,
    /// Zone name (e.g. d2.example.)
    #[arg(long, value_name = "FQDN", required_unless_present = "task", conflicts_with = "task")]
    name: Option<String>,
    /// exists, present, absent, notify or retrieve [default: present]
    #[arg(long, value_name = "STATE", conflicts_with = "task")]
    state: Option<ZoneState>,
    /// Native, Master or Slave
    #[arg(long, value_name = "KIND", conflicts_with = "task")]
    kind: Option<ZoneKind>,
    /// Account string used for local policy
    #[arg(long, value_name = "ACCOUNT", conflicts_with = "task")]
    account: Option<String>,
    /// Nameserver FQDN used when creating the zone (repeat for multiple values)
    #[arg(long = "nameserver", value_name = "FQDN", conflicts_with = "task")]
    nameservers: Vec<String>,
    /// Master address for Slave zones (repeat for multiple values)
    #[arg(long = "master", value_name = "ADDR", conflicts_with = "task")]
    masters: Vec<String>,
    /// Metadata item; VALUE is parsed as JSON when possible (repeat for multiple values)
    #[arg(long = "meta", value_name = "KEY=VALUE", conflicts_with = "task")]
    meta: Vec<String>,
    /// Report what would change without changing anything
    #[arg(long)]
    check: bool,
    /// Only act on the zone if its SOA serial is this value
    #[arg(long, value_name = "SERIAL")]
    if_serial: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let request = match build_request(&cli) {
        Ok(request) => request,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::from(2);
        }
    };

    let config = ApiConfig::new(&cli.api_url, &cli.api_key, &cli.server_id);
    info!(
        zone = %request.name,
        state = %request.state,
        server = %config.server_id,
        "converging zone"
    );
    let client = PowerDnsClient::from_config(&config);

    match converge(&client, &request).await {
        Ok(report) => {
            print_json(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(kind = err.kind(), changed = err.changed(), "{err}");
            print_json(&err.to_report());
            ExitCode::FAILURE
        }
    }
}

fn build_request(cli: &Cli) -> Result<ZoneRequest> {
    if let Some(path) = &cli.task {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read task file {}", path.display()))?;
        let mut request: ZoneRequest = serde_json::from_str(&raw)
            .with_context(|| format!("invalid task file {}", path.display()))?;
        request.check_mode |= cli.check;
        if cli.if_serial.is_some() {
            request.if_serial = cli.if_serial;
        }
        return Ok(request);
    }

    let Some(name) = &cli.name else {
        bail!("either --task or --name is required");
    };
    let mut request = ZoneRequest::new(name, cli.state.unwrap_or_default());

    if cli.kind.is_some()
        || cli.account.is_some()
        || !cli.nameservers.is_empty()
        || !cli.masters.is_empty()
    {
        request.properties = Some(PropertiesInput {
            kind: cli.kind,
            account: cli.account.clone(),
            nameservers: (!cli.nameservers.is_empty()).then(|| cli.nameservers.clone()),
            masters: (!cli.masters.is_empty()).then(|| cli.masters.clone()),
        });
    }

    if !cli.meta.is_empty() {
        let mut metadata = Map::new();
        for item in &cli.meta {
            let (key, value) = parse_meta(item)?;
            metadata.insert(key, value);
        }
        request.metadata = Some(metadata);
    }

    request.check_mode = cli.check;
    request.if_serial = cli.if_serial;
    Ok(request)
}

fn parse_meta(item: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = item.split_once('=') else {
        bail!("invalid --meta '{item}' (expected KEY=VALUE)");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("invalid --meta '{item}' (empty key)");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(body) => println!("{body}"),
        Err(err) => error!("failed to serialize result: {err}"),
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
