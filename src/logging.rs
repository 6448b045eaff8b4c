//! Log output for puppet-cron.
//!
//! Everything goes to stderr so cron mails it to the operator. `RUST_LOG`
//! overrides the default level unless debug output was requested. Colour is
//! only used when stderr is a terminal.

use std::io::IsTerminal;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber.
pub fn init(debug: bool) {
    let ansi = std::io::stderr().is_terminal();

    // A second init (e.g. from tests) is not an error worth reporting.
    let _ = subscriber(debug, ansi, std::io::stderr).try_init();
}

fn subscriber<W>(debug: bool, ansi: bool, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(ansi)
        .finish()
}
