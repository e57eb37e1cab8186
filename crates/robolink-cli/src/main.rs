//! robolink operator console.
//!
//! This is the entry point for the `robolink` binary. It connects to the
//! configured robot and reads one command per line from stdin.

mod repl;

use std::sync::Arc;

use clap::Parser;
use robolink_control::{
    CommandDispatcher, ControlConfig, ControlHandle, ControlStateMachine, DispatchOutcome,
    TracingSink,
};
use robolink_core::endpoint::{DEFAULT_HOST, DEFAULT_PORT};
use robolink_core::Endpoint;
use robolink_transport::{HttpTransportFactory, TransportConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use repl::Input;

const DEBUG_FILTER: &str =
    "info,robolink_core=debug,robolink_transport=debug,robolink_control=debug,robolink_cli=debug";

/// robolink - drive a robot over HTTP from the terminal.
#[derive(Parser, Debug)]
#[command(name = "robolink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Robot host.
    #[arg(long, env = "ROBOLINK_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Robot port.
    #[arg(long, env = "ROBOLINK_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Heartbeat period in milliseconds.
    #[arg(
        long,
        env = "ROBOLINK_HEARTBEAT_MS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    heartbeat_ms: u64,

    /// Status poll period in milliseconds.
    #[arg(
        long,
        env = "ROBOLINK_STATUS_MS",
        default_value_t = 500,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    status_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ROBOLINK_TIMEOUT_SECS", default_value_t = 5)]
    timeout_secs: u64,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,
}

impl Args {
    fn control_config(&self) -> ControlConfig {
        ControlConfig {
            heartbeat_interval_ms: self.heartbeat_ms,
            status_interval_ms: self.status_ms,
            ..ControlConfig::default()
        }
    }

    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            request_timeout_seconds: self.timeout_secs,
            ..TransportConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { DEBUG_FILTER } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let endpoint = Endpoint::new(args.host.as_str(), args.port)?;
    let factory = HttpTransportFactory::new(args.transport_config());
    let handle = ControlStateMachine::new(Arc::new(factory))
        .with_config(args.control_config())
        .with_endpoint(endpoint.clone())
        .with_sink(Arc::new(TracingSink))
        .spawn();

    tracing::info!(endpoint = %endpoint, "Starting robolink console");
    handle.connect(endpoint).await?;
    print_summary(&handle);

    let result = run_console(&handle).await;

    handle.shutdown().await?;
    result
}

/// Read commands until `quit`, end of input, or Ctrl-C.
async fn run_console(handle: &ControlHandle) -> anyhow::Result<()> {
    let dispatcher = handle.dispatcher();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            return Ok(());
        };

        match repl::parse(&line) {
            Ok(None) => {}
            Ok(Some(Input::Quit)) => return Ok(()),
            Ok(Some(input)) => execute(handle, &dispatcher, input).await?,
            Err(e) => eprintln!("{e}"),
        }
    }
}

async fn execute(
    handle: &ControlHandle,
    dispatcher: &CommandDispatcher,
    input: Input,
) -> anyhow::Result<()> {
    let outcome = match input {
        Input::Press(direction) => dispatcher.press_direction(direction).await,
        Input::Release => dispatcher.release_direction().await,
        Input::Stop => dispatcher.emergency_stop().await,
        Input::Actuator {
            actuator,
            engage: true,
        } => dispatcher.activate_actuator(actuator).await,
        Input::Actuator {
            actuator,
            engage: false,
        } => dispatcher.release_actuator(actuator).await,
        Input::Reason(reason) => {
            handle.set_stop_reason(reason).await?;
            print_summary(handle);
            return Ok(());
        }
        Input::Acknowledge => {
            handle.acknowledge_stop_reason().await?;
            print_summary(handle);
            return Ok(());
        }
        Input::ClearError => {
            handle.clear_error().await?;
            print_summary(handle);
            return Ok(());
        }
        Input::Connect(endpoint) => {
            handle.connect(endpoint).await?;
            print_summary(handle);
            return Ok(());
        }
        Input::Disconnect => {
            handle.disconnect().await?;
            print_summary(handle);
            return Ok(());
        }
        Input::State => {
            println!("{}", serde_json::to_string_pretty(&handle.snapshot())?);
            return Ok(());
        }
        Input::Help => {
            println!("{}", repl::HELP);
            return Ok(());
        }
        Input::Quit => return Ok(()),
    };

    println!("{}", describe(&outcome));
    Ok(())
}

fn describe(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Delivered(response) => format!("ok: {}", response.status),
        DispatchOutcome::Failed(e) => format!("failed: {e}"),
        DispatchOutcome::Superseded => "superseded by a newer command".to_string(),
        DispatchOutcome::NoSession => "not connected".to_string(),
        DispatchOutcome::MachineStopped => "control core stopped".to_string(),
    }
}

fn print_summary(handle: &ControlHandle) {
    let state = handle.snapshot();
    match &state.error_message {
        Some(message) => println!("[{}] {} - {message}", state.phase, state.endpoint),
        None => println!("[{}] {}", state.phase, state.endpoint),
    }
    if state.stop_reason.is_active() {
        println!("stopped: {}", state.stop_reason);
    }
}
