//! The `settings` module is a simple utility that requires manual verification.
//! See `bin/lifecycle_demo.rs` for a demo binary exercising it.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
