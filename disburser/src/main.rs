//! Main entry point for the disburser binary
//!
//! Wires the real service implementations into the engine and hands it to the
//! daily scheduler.

use clap::Parser;
use tokio::signal;

use disburser::{
    services::{AlloyTokenClient, FileStateStore, HttpEligibilitySource, SystemClock, TelegramNotifier, ThreadRandom},
    Args, DisbursementConfig, DisbursementEngine, Scheduler,
};
use shared::{component_debug, component_info, logging, Component};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(Component::Config, "token disbursement job");

    // Configuration problems are fatal before any run starts
    let config = match DisbursementConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            logging::log_error(Component::Config, "Loading configuration", &e);
            eprintln!("disburser: {e}");
            std::process::exit(1);
        }
    };

    component_debug!(
        Component::Config,
        "RPC: {}, token: {}, state dir: {}, telegram: {}",
        config.rpc_url,
        config.token_address,
        config.state_dir.display(),
        if config.telegram.is_some() { "enabled" } else { "disabled" }
    );

    // Initialize services
    let token = match AlloyTokenClient::new(&config) {
        Ok(token) => token,
        Err(e) => {
            logging::log_error(Component::Chain, "Building token client", &e);
            eprintln!("disburser: {e}");
            std::process::exit(1);
        }
    };
    let eligibility = match HttpEligibilitySource::new(config.eligibility_url.clone()) {
        Ok(source) => source,
        Err(e) => {
            logging::log_error(Component::Eligibility, "Building eligibility client", &e);
            eprintln!("disburser: {e}");
            std::process::exit(1);
        }
    };
    let store = FileStateStore::new(config.state_dir.clone());
    let notifier = TelegramNotifier::new(config.telegram.clone());

    // Create engine with dependency injection
    let engine = DisbursementEngine::new(config, store, eligibility, token, notifier, ThreadRandom, SystemClock);
    let mut scheduler = Scheduler::new(engine);

    if args.once {
        if let Some(report) = scheduler.run_once().await {
            logging::log_success(Component::Scheduler, &format!("Run finished: {}", report.summary));
        }
        return;
    }

    component_info!(Component::Scheduler, "📅 Running daily until interrupted");
    tokio::select! {
        _ = scheduler.run_forever() => {}
        result = signal::ctrl_c() => match result {
            Ok(()) => logging::log_shutdown(Component::Scheduler, "Received Ctrl+C signal"),
            Err(err) => logging::log_error(Component::Scheduler, "Signal handling", &err),
        },
    }
}
