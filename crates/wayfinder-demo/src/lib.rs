#![forbid(unsafe_code)]

pub mod card;
pub mod cli;
pub mod error;
pub mod logging;
pub mod script;

pub use cli::run_from_env;
pub use error::{DemoError, Result};
