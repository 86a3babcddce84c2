use crate::{
    echo,
    logger::{Logger, TracingLogger},
    module::RouteTable,
    runtime_config::RuntimeConfig,
    server::{FramingMode, Server},
};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line interface for Sprint
#[derive(Parser, Debug)]
#[command(name = "sprint")]
#[command(about = "Sprint HTTP server", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the demo application
    Serve {
        /// YAML runtime configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Message framing mode
        #[arg(long, value_enum)]
        framing: Option<FramingArg>,
    },
    /// Print the flattened route table of the demo application
    Routes,
}

/// `--framing` values
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FramingArg {
    /// Header terminator, then exactly `Content-Length` body bytes
    ContentLength,
    /// Zero-padded chunk loop
    Legacy,
}

impl From<FramingArg> for FramingMode {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::ContentLength => FramingMode::ContentLength,
            FramingArg::Legacy => FramingMode::Legacy,
        }
    }
}

/// Parse the process arguments and execute the command
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

/// Execute a parsed command
///
/// # Errors
///
/// Returns an error if the config file cannot be read, the demo module
/// graph is invalid, or the server fails to bind.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            framing,
        } => {
            let config = resolve_config(config.as_deref(), host, port, framing)?;
            may::config().set_stack_size(config.stack_size);
            let table = echo::route_table(logger.as_ref())?;
            Server::new(config, logger)
                .run(&table)
                .context("server terminated")?;
            Ok(())
        }
        Commands::Routes => {
            let table = echo::route_table(logger.as_ref())?;
            let stdout = io::stdout();
            print_routes(&table, &mut stdout.lock())?;
            Ok(())
        }
    }
}

/// YAML file, then environment, then flags
pub(crate) fn resolve_config(
    path: Option<&std::path::Path>,
    host: Option<String>,
    port: Option<u16>,
    framing: Option<FramingArg>,
) -> anyhow::Result<RuntimeConfig> {
    let mut config = RuntimeConfig::load(path)?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(framing) = framing {
        config.framing = framing.into();
    }
    Ok(config)
}

pub(crate) fn print_routes<W: Write>(table: &RouteTable, out: &mut W) -> io::Result<()> {
    for route in table.routes() {
        writeln!(out, "{} /{}", route.method, route.path)?;
    }
    Ok(())
}
