#![cfg_attr(not(test), no_std)]

// must come first so the logging macros are visible below
mod fmt;

pub mod board;
pub mod config;
pub mod drivers;
pub mod ipc;
pub mod tasks;

#[cfg(feature = "firmware")]
pub use board::Board;
pub use drivers::dac::{Channel, ConfigError, Dac};
pub use ipc::{Params, Tunables, TUNABLES};
