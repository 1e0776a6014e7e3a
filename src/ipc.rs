//! State shared between the sync task and whoever tunes the waveform.
//!
//! [`TUNABLES`] is exported unmangled so a debugger attached over JTAG can
//! find and poke it while the firmware runs. Each field is its own atomic:
//! a reader may see half of a multi-field update, which the next sync
//! iteration corrects.
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex as RawMutex, signal::Signal};
use portable_atomic::{AtomicU32, Ordering};

use crate::config::*;

/// One consistent-enough set of waveform parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Params {
    pub frequency: u32,
    pub scale: u32,
    pub offset: u32,
    pub invert: u32,
}

impl Params {
    pub const DEFAULT: Params = Params {
        frequency: DEFAULT_FREQUENCY,
        scale: DEFAULT_SCALE,
        offset: DEFAULT_OFFSET,
        invert: DEFAULT_INVERT,
    };
}

impl Default for Params {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[repr(C)]
pub struct Tunables {
    frequency: AtomicU32,
    scale: AtomicU32,
    offset: AtomicU32,
    invert: AtomicU32,
}

impl Tunables {
    pub const fn new(initial: Params) -> Self {
        Self {
            frequency: AtomicU32::new(initial.frequency),
            scale: AtomicU32::new(initial.scale),
            offset: AtomicU32::new(initial.offset),
            invert: AtomicU32::new(initial.invert),
        }
    }

    /// Four independent loads, no lock.
    pub fn snapshot(&self) -> Params {
        Params {
            frequency: self.frequency.load(Ordering::Relaxed),
            scale: self.scale.load(Ordering::Relaxed),
            offset: self.offset.load(Ordering::Relaxed),
            invert: self.invert.load(Ordering::Relaxed),
        }
    }

    pub fn store(&self, params: Params) {
        self.set_frequency(params.frequency);
        self.set_scale(params.scale);
        self.set_offset(params.offset);
        self.set_invert(params.invert);
    }

    pub fn set_frequency(&self, step: u32) {
        self.frequency.store(step, Ordering::Relaxed);
    }

    pub fn set_scale(&self, scale: u32) {
        self.scale.store(scale, Ordering::Relaxed);
    }

    pub fn set_offset(&self, offset: u32) {
        self.offset.store(offset, Ordering::Relaxed);
    }

    pub fn set_invert(&self, invert: u32) {
        self.invert.store(invert, Ordering::Relaxed);
    }
}

#[no_mangle]
pub static TUNABLES: Tunables = Tunables::new(Params::DEFAULT);

/* sync task cancellation */
pub static DAC_SYNC_STOP: Signal<RawMutex, ()> = Signal::new();
