//! `prcomment` 바이너리 진입점.

use prcomment::interface::cli::{AppComposition, Cli, CliAction};

#[tokio::main]
async fn main() {
    let invocation = match Cli::parse_action() {
        Ok(invocation) => invocation,
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(2);
        }
    };

    let default_level = if invocation.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let composition = AppComposition::default();

    match invocation.action {
        CliAction::InspectConfig => match composition.inspect_config_usecase().execute() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err:#}");
                std::process::exit(1);
            }
        },
        CliAction::PullRequest(request) => {
            if let Err(err) = composition.pull_request_usecase().execute(request).await {
                eprintln!("error: {err:#}");
                std::process::exit(1);
            }
        }
    }
}
