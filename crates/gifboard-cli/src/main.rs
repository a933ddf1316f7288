use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod context;
mod output;
mod prompt;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = args::Cli::parse();
    output::init(cli.json);
    init_tracing(cli.json);

    match cmd::dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over the default.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
