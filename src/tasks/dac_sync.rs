//! Periodic re-application of the tunables to the DAC.
//!
//! Every period the task snapshots [`Tunables`], writes the shared frequency
//! and then scale, offset and invert of the channel under test, in that
//! order, and logs what it wrote. Nothing is read back.
use core::fmt::{self, Write as _};

use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use embassy_time::{Duration, Ticker};

use crate::drivers::dac::{Channel, Dac};
use crate::drivers::registers::RegisterAccess;
use crate::ipc::{Params, Tunables};

/// Longest possible status line is 88 bytes (four full-width `u32`s).
pub type StatusLine = heapless::String<96>;

/// What one iteration wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub channel: Channel,
    pub params: Params,
}

impl Status {
    pub fn line(&self) -> StatusLine {
        let mut line = StatusLine::new();
        // capacity covers the widest u32 rendering
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DAC frequency: {:5}, DAC{} scale: {}, offset {:3}, invert: {}",
            self.params.frequency,
            self.channel.number(),
            self.params.scale,
            self.params.offset,
            self.params.invert
        )
    }
}

/// Write `params` to the hardware: frequency first, then the channel's
/// scale, offset and invert.
pub fn apply<R: RegisterAccess>(dac: &mut Dac<R>, channel: Channel, params: Params) -> Status {
    dac.set_frequency(params.frequency);

    // A typed channel cannot fail to resolve
    let _ = dac.set_scale(channel, params.scale);
    let _ = dac.set_offset(channel, params.offset);
    let _ = dac.set_invert(channel, params.invert);

    Status { channel, params }
}

/// One loop iteration: snapshot, apply, report.
pub fn sync_once<R: RegisterAccess>(
    dac: &mut Dac<R>,
    tunables: &Tunables,
    channel: Channel,
) -> Status {
    let status = apply(dac, channel, tunables.snapshot());
    info!("{=str}", status.line().as_str());
    status
}

/// Run [`sync_once`] every `period` until `stop` is signalled.
///
/// The stop signal is only looked at between iterations; an iteration that
/// has started always completes. Returns the number of iterations run.
pub async fn run<R: RegisterAccess, M: RawMutex>(
    dac: &mut Dac<R>,
    tunables: &Tunables,
    channel: Channel,
    period: Duration,
    stop: &Signal<M, ()>,
) -> u32 {
    info!(
        "DAC sync started - channel {} every {}ms",
        channel.number(),
        period.as_millis()
    );
    let mut ticker = Ticker::every(period);
    let mut iterations = 0u32;

    loop {
        sync_once(dac, tunables, channel);
        iterations = iterations.wrapping_add(1);

        match select(ticker.next(), stop.wait()).await {
            Either::First(()) => {}
            Either::Second(()) => {
                info!("DAC sync stopped after {} iterations", iterations);
                return iterations;
            }
        }
    }
}

#[cfg(feature = "firmware")]
#[embassy_executor::task]
pub async fn dac_sync_task(mut dac: Dac<crate::drivers::registers::SarDacRegisters>) {
    use crate::config::{DAC_SYNC_CHANNEL, DAC_SYNC_PERIOD_MS};
    use crate::ipc::{DAC_SYNC_STOP, TUNABLES};

    run(
        &mut dac,
        &TUNABLES,
        DAC_SYNC_CHANNEL,
        Duration::from_millis(DAC_SYNC_PERIOD_MS),
        &DAC_SYNC_STOP,
    )
    .await;
}
