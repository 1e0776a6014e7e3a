pub mod dac;
pub mod registers;

pub use dac::{Channel, ChannelConfig, ConfigError, Dac, Invert, Scale};
pub use registers::{RegisterAccess, RegisterFile};
#[cfg(feature = "firmware")]
pub use registers::SarDacRegisters;
