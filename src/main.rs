use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    let cli = topicpages::cli::Cli::parse();
    topicpages::logging::init(cli.log_level()).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        topicpages::cli::Command::Generate(args) => {
            topicpages::generate::run(args).context("generate")?;
        }
        topicpages::cli::Command::Report(args) => {
            topicpages::report::run(args).context("report")?;
        }
    }

    Ok(())
}
