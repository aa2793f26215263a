use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::Parser;

use phd_config::{SharedConfig, StackRole, toml_config};
use phd_core::{Role, debug};
use phd_dim::MemoryMds;
use phd_engine::{Context, Event, EventData, Listener, RequestOutcome};
use phd_transport::tcp::{TcpTransport, TcpTransportConfig};
use phd_apdu::BitcodeCodec;

/// Loads the stack configuration, exiting the process on failure rather
/// than unwinding through `main`.
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Logs every association-lifecycle occurrence the CLI cares about: a thin
/// `Listener`/sink implementation that only forwards to `tracing` rather
/// than accumulating state of its own.
struct LoggingListener;

impl Listener for LoggingListener {
    fn on_state_changed(&mut self, from: phd_core::State, to: phd_core::State) {
        tracing::info!("association state: {} -> {}", from, to);
    }

    fn on_config_report(&mut self, report: &phd_apdu::ConfigReport) {
        tracing::info!(
            "configuration report received: config_report_id={} ({} object(s))",
            report.config_report_id,
            report.config_object_list.objects.len()
        );
    }

    fn on_request_complete(&mut self, invoke_id: u16, outcome: &RequestOutcome) {
        match outcome {
            RequestOutcome::Success(_) => tracing::debug!("request {} completed", invoke_id),
            RequestOutcome::Error(err) => tracing::warn!("request {} failed: {:?}", invoke_id, err),
            RequestOutcome::Reject(rej) => tracing::warn!("request {} rejected: {:?}", invoke_id, rej),
            RequestOutcome::TimedOut => tracing::warn!("request {} timed out", invoke_id),
            RequestOutcome::Aborted => tracing::warn!("request {} aborted", invoke_id),
        }
    }
}

/// Builds a `Context` for `role` from `cfg`: a `MemoryMds` seeded from the
/// configuration catalog, a `TcpTransport` pointed at the configured peer,
/// and the `BitcodeCodec` worked codec implementation.
///
/// `TcpTransport` only dials out; standing up a listening counterpart for a
/// Manager binary is left to the enclosing deployment (see DESIGN.md) — the
/// same `Transport` trait lets one be swapped in without touching the
/// engine.
fn build_context(role: Role, cfg: SharedConfig) -> Context {
    let dev_config_id = cfg.config().identity.dev_config_id;
    let mut mds = MemoryMds::new(dev_config_id);

    if role == Role::Agent {
        // A minimal configuration object list so ConfigSending has something
        // to report if the manager does not already know our dev_config_id.
        mds.register_configuration(dev_config_id, Vec::new());
    }

    let transport_cfg = TcpTransportConfig::new(cfg.config().transport.host.clone(), cfg.config().transport.port);
    let transport = TcpTransport::new(transport_cfg);

    let mut ctx = Context::new(role, cfg, Box::new(mds), Box::new(transport), Box::new(BitcodeCodec));
    ctx.add_listener(Box::new(LoggingListener));
    ctx
}

#[derive(Parser, Debug)]
#[command(author, version, about = "IEEE 11073-20601 PHD communication engine CLI", long_about = "Runs an Agent or Manager association stack using the provided TOML configuration")]
struct Args {
    /// TOML config with role, identity, timeouts and transport parameters.
    #[arg(help = "TOML config with role/identity/timeout/transport parameters")]
    config: String,
}

fn main() {
    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    let role: Role = match cfg.config().stack_role {
        Some(StackRole::Agent) => Role::Agent,
        Some(StackRole::Manager) => Role::Manager,
        None => {
            eprintln!("stack_role must be set in the configuration file");
            std::process::exit(1);
        }
    };

    let mut ctx = build_context(role, cfg);

    if let Err(e) = ctx.connect() {
        eprintln!("failed to connect transport: {}", e);
        std::process::exit(1);
    }

    if role == Role::Agent {
        ctx.push_event(Event::ReqAssoc, EventData::None);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    tracing::info!("{} stack running ({})", role, phd_core::STACK_VERSION);

    while running.load(Ordering::SeqCst) {
        ctx.run_to_quiescence();
        thread::sleep(Duration::from_millis(50));
    }
}
