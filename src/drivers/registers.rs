//! Register access for the SAR DAC and its RTC pads
//! ===========================================================
//!
//! Everything above this module talks in terms of [`Field`]s: a bit range
//! inside one of the [`Reg`]s. The backend behind [`RegisterAccess`] only has
//! to provide whole-word reads and writes (esp-hal's register blocks on the
//! chip, [`RegisterFile`] on the host); the read/modify/write helpers that
//! keep neighbouring bits intact are provided on top of those.

/* ------------------------------------------------------------------------- */
/*  Registers                                                                */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
    /// `SENS_SAR_DAC_CTRL1_REG`: tone generator step and enable.
    SarDacCtrl1,
    /// `SENS_SAR_DAC_CTRL2_REG`: per-channel offset, scale, invert, CW connect.
    SarDacCtrl2,
    /// `RTCIO_PAD_DAC1_REG`: pad of channel A (GPIO25).
    PadDac1,
    /// `RTCIO_PAD_DAC2_REG`: pad of channel B (GPIO26).
    PadDac2,
}

impl Reg {
    pub const COUNT: usize = 4;
    pub const ALL: [Reg; Reg::COUNT] = [
        Reg::SarDacCtrl1,
        Reg::SarDacCtrl2,
        Reg::PadDac1,
        Reg::PadDac2,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/* ------------------------------------------------------------------------- */
/*  Bit fields                                                               */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pub reg: Reg,
    pub shift: u8,
    pub width: u8,
}

impl Field {
    pub const fn new(reg: Reg, shift: u8, width: u8) -> Self {
        assert!(width >= 1 && shift as u32 + width as u32 <= 32);
        Self { reg, shift, width }
    }

    /// Single-bit field.
    pub const fn bit(reg: Reg, shift: u8) -> Self {
        Self::new(reg, shift, 1)
    }

    /// Value mask, not yet shifted into position.
    #[inline]
    pub const fn value_mask(self) -> u32 {
        ((1u64 << self.width) - 1) as u32
    }

    /// Mask of the bits this field occupies in its register.
    #[inline]
    pub const fn mask(self) -> u32 {
        self.value_mask() << self.shift
    }

    /// Replace this field inside `word`. Bits of `value` above the field
    /// width are dropped.
    #[inline]
    pub const fn insert(self, word: u32, value: u32) -> u32 {
        (word & !self.mask()) | ((value & self.value_mask()) << self.shift)
    }

    #[inline]
    pub const fn extract(self, word: u32) -> u32 {
        (word >> self.shift) & self.value_mask()
    }
}

/* ------------------------------------------------------------------------- */
/*  Access capability                                                        */
/* ------------------------------------------------------------------------- */
pub trait RegisterAccess {
    fn read(&self, reg: Reg) -> u32;
    fn write(&mut self, reg: Reg, value: u32);

    /// Set `field` to `value`, preserving all other bits of its register.
    fn set_bits(&mut self, field: Field, value: u32) {
        let word = self.read(field.reg);
        self.write(field.reg, field.insert(word, value));
    }

    fn get_bits(&self, field: Field) -> u32 {
        field.extract(self.read(field.reg))
    }

    fn set_mask(&mut self, reg: Reg, mask: u32) {
        let word = self.read(reg);
        self.write(reg, word | mask);
    }

    fn clear_mask(&mut self, reg: Reg, mask: u32) {
        let word = self.read(reg);
        self.write(reg, word & !mask);
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    fn read(&self, reg: Reg) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Reg, value: u32) {
        (**self).write(reg, value)
    }
}

/// The real registers, reached through esp-hal's `SENS` and `RTC_IO`
/// register blocks. Owning both peripherals makes this the only writer.
#[cfg(feature = "firmware")]
pub struct SarDacRegisters {
    _sens: esp_hal::peripherals::SENS,
    _rtc_io: esp_hal::peripherals::RTC_IO,
}

#[cfg(feature = "firmware")]
impl SarDacRegisters {
    pub fn new(sens: esp_hal::peripherals::SENS, rtc_io: esp_hal::peripherals::RTC_IO) -> Self {
        Self {
            _sens: sens,
            _rtc_io: rtc_io,
        }
    }
}

#[cfg(feature = "firmware")]
impl RegisterAccess for SarDacRegisters {
    fn read(&self, reg: Reg) -> u32 {
        use esp_hal::peripherals::{RTC_IO, SENS};
        match reg {
            Reg::SarDacCtrl1 => SENS::regs().sar_dac_ctrl1().read().bits(),
            Reg::SarDacCtrl2 => SENS::regs().sar_dac_ctrl2().read().bits(),
            Reg::PadDac1 => RTC_IO::regs().pad_dac(0).read().bits(),
            Reg::PadDac2 => RTC_IO::regs().pad_dac(1).read().bits(),
        }
    }

    fn write(&mut self, reg: Reg, value: u32) {
        use esp_hal::peripherals::{RTC_IO, SENS};
        match reg {
            Reg::SarDacCtrl1 => SENS::regs()
                .sar_dac_ctrl1()
                .write(|w| unsafe { w.bits(value) }),
            Reg::SarDacCtrl2 => SENS::regs()
                .sar_dac_ctrl2()
                .write(|w| unsafe { w.bits(value) }),
            Reg::PadDac1 => RTC_IO::regs().pad_dac(0).write(|w| unsafe { w.bits(value) }),
            Reg::PadDac2 => RTC_IO::regs().pad_dac(1).write(|w| unsafe { w.bits(value) }),
        };
    }
}

/// In-memory register file with the same layout as the hardware. Used for
/// host-side simulation and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    words: [u32; Reg::COUNT],
}

impl RegisterFile {
    pub const fn new() -> Self {
        Self {
            words: [0; Reg::COUNT],
        }
    }

    /// Start from arbitrary reset values, in [`Reg::ALL`] order.
    pub const fn with_words(words: [u32; Reg::COUNT]) -> Self {
        Self { words }
    }

    pub fn snapshot(&self) -> [u32; Reg::COUNT] {
        self.words
    }
}

impl RegisterAccess for RegisterFile {
    fn read(&self, reg: Reg) -> u32 {
        self.words[reg.index()]
    }

    fn write(&mut self, reg: Reg, value: u32) {
        self.words[reg.index()] = value;
    }
}
