use crate::drivers::dac::Channel;

// Synchronization loop
pub const DAC_SYNC_PERIOD_MS: u64 = 1000;
/// Only this channel is retuned so it can be compared against the other one on a scope.
pub const DAC_SYNC_CHANNEL: Channel = Channel::B;

// Power-on tunables
pub const DEFAULT_FREQUENCY: u32 = 8; // about 1 kHz
pub const DEFAULT_SCALE: u32 = 1; // 1/2 of full scale
pub const DEFAULT_OFFSET: u32 = 0;
pub const DEFAULT_INVERT: u32 = 2; // invert MSB for a true cosine
