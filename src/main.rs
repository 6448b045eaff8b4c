//! puppet-cron: guarded single-shot launcher for the Puppet agent.
//!
//! This is the main entry point. It parses arguments, takes the run lock,
//! settles the agent environment and replaces itself with `puppet agent`.
//! It only ever exits on its own when something went wrong before the
//! hand-off.

mod cli;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod identity;
pub mod lock;
mod logging;
pub mod process;
pub mod puppet;
pub mod run;
pub mod validator;

#[cfg(test)]
mod test_support;

use cli::Cli;
use error::Result;
use puppet::PuppetConfig;
use run::{Orchestrator, RemoteCheck};
use std::convert::Infallible;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match launch(&cli) {
        Ok(never) => match never {},
        Err(err) => {
            // The subscriber may not be up yet if settings were the problem.
            logging::init(cli.debug);
            tracing::error!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Run up to the hand-off. Returns only on failure.
fn launch(cli: &Cli) -> Result<Infallible> {
    let settings = cli.settings()?;
    logging::init(settings.debug);

    tracing::info!("Starting puppet-cron...");

    let options = settings.run_options();
    let config = PuppetConfig::new(&settings.puppet);
    let check = RemoteCheck::new(settings.timeout());

    let prepared = Orchestrator::new(&options, &config, &check).prepare()?;
    tracing::debug!(
        environment = ?prepared.environment(),
        lock = %prepared.lock().path().display(),
        command = %prepared.command(),
        "ready to hand off"
    );
    Err(prepared.launch())
}
