//! Orca Gate
//!
//! Applies orchestrator access control to captured API responses offline.

use anyhow::{Context, bail};
use axum::body::Bytes;
use axum::http::{Method, Response, StatusCode, header};
use clap::{Parser, Subcommand};
use orca_gate::{
    access_control::{CallerContext, Labels, ResourceKind, decide, resolve},
    config::{LogFormat, load_config},
    registry::open_store,
};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Orca Gate - Access control decoration for orchestrator API responses
#[derive(Parser, Debug)]
#[command(name = "orca-gate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ORCA_GATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the configuration
    #[arg(long, env = "ORCA_GATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Resource control registry file; overrides the configuration
    #[arg(long, env = "ORCA_GATE_REGISTRY")]
    registry: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct CallerArgs {
    /// Identity of the caller
    #[arg(long, env = "ORCA_GATE_USER")]
    user: String,

    /// Team the caller belongs to (repeatable)
    #[arg(long = "team")]
    teams: Vec<String>,

    /// Treat the caller as an administrator
    #[arg(long)]
    admin: bool,
}

impl CallerArgs {
    fn into_context(self) -> CallerContext {
        let caller = if self.admin {
            CallerContext::administrator(self.user)
        } else {
            CallerContext::user(self.user)
        };
        caller.with_teams(self.teams)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decorate a captured upstream response and print the result
    Decorate {
        /// Request path the response answered (e.g. /v1.41/secrets)
        #[arg(long)]
        path: String,

        /// Request method
        #[arg(long, default_value = "GET")]
        method: Method,

        /// Upstream status code
        #[arg(long, default_value_t = 200)]
        status: u16,

        /// File holding the upstream JSON body, or "-" for stdin
        #[arg(long, default_value = "-")]
        body: String,

        #[command(flatten)]
        caller: CallerArgs,
    },

    /// Decide whether a caller may see a single object
    Check {
        /// Resource kind (secret, config, service, task, volume, network, container, stack)
        #[arg(long)]
        kind: ResourceKind,

        /// Object identifier
        #[arg(long)]
        id: Option<String>,

        /// Object label as key=value (repeatable)
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,

        #[command(flatten)]
        caller: CallerArgs,
    },

    /// Print the loaded resource controls
    Controls,
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("label '{}' is not key=value", s))
}

async fn read_body(source: &str) -> anyhow::Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        Ok(buf)
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("reading response body from {}", source))
    }
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so its level and format apply
    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = args.registry {
        config.registry.path = Some(path);
    }

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, config.logging.format);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting orca-gate");

    let store = open_store(&config.registry)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to open resource control registry"))?;

    match args.command {
        Command::Decorate {
            path,
            method,
            status,
            body,
            caller,
        } => {
            let decorator = config
                .decorator()
                .inspect_err(|e| error!(error = %e, "Failed to build decorator"))?;
            let caller = caller.into_context();
            let snapshot = store.snapshot().await?;

            let mut response = Response::builder()
                .status(StatusCode::from_u16(status)?)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Bytes::from(read_body(&body).await?))?;

            match decorator.decorate(&method, &path, &mut response, &snapshot, &caller)? {
                Some(route) => info!(kind = %route.kind, mode = %route.mode, status = %response.status(), "Response decorated"),
                None => info!(status = %response.status(), "Response passed through"),
            }

            println!("{}", String::from_utf8_lossy(response.body()));
            if !response.status().is_success() {
                bail!("response status {}", response.status());
            }
        }
        Command::Check {
            kind,
            id,
            labels,
            caller,
        } => {
            let caller = caller.into_context();
            let labels: Labels = labels.into_iter().collect();
            let snapshot = store.snapshot().await?;

            let resolved = resolve(kind, id.as_deref(), &labels, &snapshot);
            let decision = decide(resolved.map(|r| r.control()), &caller);

            let report = json!({
                "allowed": decision.is_allowed(),
                "reason": match &decision {
                    orca_gate::AccessDecision::Denied(reason) => Some(reason.as_str()),
                    orca_gate::AccessDecision::Allowed => None,
                },
                "resource_control": resolved.map(|r| r.control()),
                "inherited": resolved.map(|r| r.is_inherited()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Controls => {
            let controls = store.list_resource_controls().await?;
            info!(store = store.store_type(), count = controls.len(), "Listing resource controls");
            println!("{}", serde_json::to_string_pretty(&controls)?);
        }
    }

    Ok(())
}
