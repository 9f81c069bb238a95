//! # photo-similar CLI
//!
//! Command-line interface for the similar photo finder.
//!
//! ## Usage
//! ```bash
//! photo-similar dedup ~/Photos --threshold 96
//! photo-similar search ~/Downloads/img.jpg ~/Photos --format json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    similar_photo_finder::init_tracing();
    ExitCode::from(cli::run())
}
