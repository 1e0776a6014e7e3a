use crate::drivers::dac::{Channel, Dac};
use crate::drivers::registers::RegisterAccess;

// ── Board struct ──────────────────────────────────────────
#[cfg(feature = "firmware")]
pub struct Board {
    pub dac: Dac<crate::drivers::registers::SarDacRegisters>,
}

#[cfg(feature = "firmware")]
impl Board {
    /// Bring up the HAL and the embassy time driver, then both DAC channels.
    ///
    /// Must run once, before the sync task is spawned.
    pub fn init() -> Self {
        use crate::drivers::registers::SarDacRegisters;
        use esp_hal::timer::timg::TimerGroup;

        let p = esp_hal::init(esp_hal::Config::default());

        // embassy time driver
        let timg0 = TimerGroup::new(p.TIMG0);
        esp_hal_embassy::init(timg0.timer0);

        let regs = SarDacRegisters::new(p.SENS, p.RTC_IO);
        Self {
            dac: bootstrap(regs),
        }
    }
}

/// Enable the cosine generator on both channels, then both output stages.
///
/// Scope the two pads (GPIO25 and GPIO26) to compare the tuned channel
/// against the untouched one.
pub fn bootstrap<R: RegisterAccess>(regs: R) -> Dac<R> {
    let mut dac = Dac::new(regs);

    for channel in Channel::ALL {
        // typed channels always resolve
        let _ = dac.enable_waveform_generator(channel);
    }
    for channel in Channel::ALL {
        let _ = dac.enable_output(channel);
        info!(
            "DAC channel {} output enabled on GPIO{}",
            channel.number(),
            channel.gpio()
        );
    }

    dac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::dac::{Invert, Scale};
    use crate::drivers::registers::{Reg, RegisterFile};

    #[test]
    fn bootstrap_enables_both_channels() {
        let dac = bootstrap(RegisterFile::new());

        assert!(dac.tone_enabled());
        for channel in Channel::ALL {
            let cfg = dac.channel_config(channel);
            assert!(cfg.generator_connected);
            assert!(cfg.output_enabled);
            assert_eq!(cfg.invert, Invert::Msb);
            assert_eq!(cfg.scale, Scale::Full);
            assert_eq!(cfg.offset, 0);
        }
        assert_eq!(dac.frequency(), 0);
        assert_eq!(
            dac.registers().read(Reg::SarDacCtrl2),
            (1 << 25) | (1 << 24) | (2 << 22) | (2 << 20)
        );
    }

    #[test]
    fn bootstrap_preserves_reset_values() {
        let dac = bootstrap(RegisterFile::with_words([0x0000_0010, 0x0000_4321, 0, 0]));
        // frequency and offsets from reset are left alone
        assert_eq!(dac.frequency(), 0x10);
        assert_eq!(dac.channel_config(Channel::A).offset, 0x21);
        assert_eq!(dac.channel_config(Channel::B).offset, 0x43);
    }
}
