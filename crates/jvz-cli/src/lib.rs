//! Command-line front end for jvz.
//!
//! - `args` - clap argument definitions
//! - `config` - `jvz.json` loading and the merge with flags
//! - `discovery` - source tree scanning with exclude globs
//! - `reporter` - text and JSON reports
//! - `driver` - one end-to-end run

pub mod args;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod reporter;

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod driver_tests;
