//! # CLI Module
//!
//! Command-line interface for the `sprint` binary, built on `clap`.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve the demo application (see [`crate::echo`]):
//!
//! ```bash
//! sprint serve --port 8080
//! sprint serve --config sprint.yaml --framing legacy
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML runtime configuration
//! - `--host <HOST>` / `--port <PORT>` - override the bind address
//! - `--framing <MODE>` - `content-length` (default) or `legacy`
//!
//! Settings are layered: YAML file, then `SPRINT_*` environment variables,
//! then these flags.
//!
//! ### `routes`
//!
//! Print the flattened route table, one `METHOD /path` per line:
//!
//! ```bash
//! sprint routes
//! ```

mod commands;


pub use commands::{run, run_cli, Cli, Commands, FramingArg};
