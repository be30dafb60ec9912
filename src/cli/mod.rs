//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create a `.workpiece/` project |
//! | `validate` | Check a document against a ruleset |
//! | `tree` | Show the logical or physical tree |
//! | `pages` | List media units in page order |
//! | `rules` | Inspect divisions and fields of a ruleset |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Exit Codes
//!
//! `validate` exits with 0 for `SUCCESS` and `WARNING`, 2 for `ERROR`.
//! Any failure to complete a command exits with 1.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output. Library diagnostics go
//! through `tracing` and honor `RUST_LOG`:
//! ```bash
//! RUST_LOG=workpiece=debug workpiece validate meta.json -r rules.yaml
//! ```

mod app;
mod output;
mod rules;
mod tree;
mod validate;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
