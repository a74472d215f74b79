use log::{error, info};
use logto::configuration::{Args, RelayConfig};
use logto::controller::Controller;

/// Exit status for an unusable command line, matching clap's own.
const EXIT_USAGE: i32 = 2;

fn main() {
    // Diagnostics go to stderr, the terminal that started us; the relayed
    // output itself never passes through here.
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = Args::from_args();

    let config = RelayConfig::load(args).unwrap_or_else(|e| {
        error!("Error: {}", e);
        error!("Try 'logto --help' for more information.");
        std::process::exit(EXIT_USAGE);
    });

    info!(
        "Relaying {:?} to {}",
        config.command,
        config.destination.kind().as_str()
    );

    match Controller::new(config).run() {
        Ok(report) => std::process::exit(report.exit_code()),
        Err(e) => {
            error!("{}, exiting...", e);
            std::process::exit(1);
        }
    }
}
