//! netvlanmgr - VLAN Interface Configuration Manager
//!
//! Entry point for the netvlanmgr binary. Prints the run report as JSON on
//! stdout; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ontap_cfgmgr_common::{
    CfgMgrError, CfgMgrResult, DesiredState, ErrorReport, RunReport, ZapiHttpSession,
};
use ontap_netvlanmgr::config::DEFAULT_CONFIG_PATH;
use ontap_netvlanmgr::{reconcile, NetVlanConfig};

/// Create or delete a VLAN interface on an ONTAP controller
#[derive(Parser, Debug)]
#[command(name = "netvlanmgr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Whether the VLAN interface should exist (present, absent)
    #[arg(long)]
    state: Option<DesiredState>,

    /// Interface hosting the VLAN interface
    #[arg(long)]
    parent_interface: Option<String>,

    /// VLAN ID (1-4094)
    #[arg(long)]
    vlanid: Option<String>,

    /// Node name of the VLAN interface
    #[arg(long)]
    node: Option<String>,

    /// Name of the VLAN interface
    #[arg(long)]
    interface_name: Option<String>,

    /// Enable GVRP (ignored by the controller in cluster mode)
    #[arg(long)]
    gvrp_enabled: bool,

    /// Report what would change without modifying the controller
    #[arg(long)]
    check: bool,

    /// Cluster management hostname or address
    #[arg(long)]
    hostname: Option<String>,

    /// Login user
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Login password
    #[arg(long, env = "NETAPP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Use plain HTTP
    #[arg(long)]
    http: bool,

    /// Skip certificate validation
    #[arg(long)]
    no_validate_certs: bool,

    /// Port of the ZAPI endpoint
    #[arg(long)]
    http_port: Option<u16>,

    /// Tunnel calls to this vserver
    #[arg(long)]
    vserver: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

/// Initializes tracing/logging subsystem
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("netvlanmgr: failed to set tracing subscriber: {}", e);
    }
}

/// Loads the configuration file and applies command line overrides
fn load_config(args: &Args) -> CfgMgrResult<NetVlanConfig> {
    let mut config = match &args.config {
        Some(path) => NetVlanConfig::load(path)?,
        None => NetVlanConfig::load_or_default(DEFAULT_CONFIG_PATH)?,
    };

    let vlan = &mut config.vlan;
    if let Some(state) = args.state {
        vlan.state = state;
    }
    if let Some(parent) = &args.parent_interface {
        vlan.parent_interface = parent.clone();
    }
    if let Some(vlanid) = &args.vlanid {
        vlan.vlanid = vlanid.clone();
    }
    if let Some(node) = &args.node {
        vlan.node = node.clone();
    }
    if let Some(name) = &args.interface_name {
        vlan.interface_name = Some(name.clone());
    }
    vlan.gvrp_enabled |= args.gvrp_enabled;
    vlan.check_mode |= args.check;

    let conn = &mut config.connection;
    if let Some(hostname) = &args.hostname {
        conn.hostname = hostname.clone();
    }
    if let Some(username) = &args.username {
        conn.username = username.clone();
    }
    if let Some(password) = &args.password {
        conn.password = password.clone();
    }
    if args.http {
        conn.https = false;
    }
    if args.no_validate_certs {
        conn.validate_certs = false;
    }
    if let Some(port) = args.http_port {
        conn.http_port = Some(port);
    }
    if let Some(vserver) = &args.vserver {
        conn.vserver = Some(vserver.clone());
    }

    Ok(config)
}

async fn run(args: &Args) -> CfgMgrResult<RunReport> {
    let config = load_config(args)?;
    config.validate()?;

    let session = ZapiHttpSession::connect(&config.connection)?;
    info!("Connected to {}", session.url());

    reconcile(session, &config.vlan).await
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting netvlanmgr ---");

    let (output, code) = match run(&args).await {
        Ok(report) => (print_json(&report), ExitCode::SUCCESS),
        Err(err) => {
            error!("netvlanmgr failed: {}", err);
            (print_json(&ErrorReport::from(&err)), exit_code(&err))
        }
    };

    if let Err(e) = output {
        eprintln!("netvlanmgr: {:#}", e);
        return ExitCode::FAILURE;
    }
    code
}

fn exit_code(err: &CfgMgrError) -> ExitCode {
    match err {
        CfgMgrError::InvalidConfig { .. } => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
