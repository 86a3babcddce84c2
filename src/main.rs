use sprint::{cli, logging};

fn main() -> anyhow::Result<()> {
    // Held until exit so buffered log lines are flushed
    let _log_guard = logging::init_logging_with_config(&logging::LogConfig::from_env())?;
    cli::run_cli()
}
