//! SAR DAC cosine-wave generator driver
//! ===========================================================
//!
//! The tone generator is shared by both channels and driven by a single
//! frequency step. Each channel then has its own scale, DC offset and
//! bit-inversion settings, plus a switch that connects the generator to it.
//!
//! Every setter is one immediate read/modify/write of one field. Values are
//! never range-checked: whatever does not fit the field width is dropped by
//! the hardware and the same happens here.

use core::fmt;

use super::registers::{Field, Reg, RegisterAccess};

/* ------------------------------------------------------------------------- */
/*  Field map                                                                */
/* ------------------------------------------------------------------------- */
const SW_FSTEP: Field = Field::new(Reg::SarDacCtrl1, 0, 16);
const SW_TONE_EN: Field = Field::bit(Reg::SarDacCtrl1, 16);

const DAC_DC1: Field = Field::new(Reg::SarDacCtrl2, 0, 8);
const DAC_DC2: Field = Field::new(Reg::SarDacCtrl2, 8, 8);
const DAC_SCALE1: Field = Field::new(Reg::SarDacCtrl2, 16, 2);
const DAC_SCALE2: Field = Field::new(Reg::SarDacCtrl2, 18, 2);
const DAC_INV1: Field = Field::new(Reg::SarDacCtrl2, 20, 2);
const DAC_INV2: Field = Field::new(Reg::SarDacCtrl2, 22, 2);
const DAC_CW_EN1: Field = Field::bit(Reg::SarDacCtrl2, 24);
const DAC_CW_EN2: Field = Field::bit(Reg::SarDacCtrl2, 25);

// RTC pad bits, identical layout in PAD_DAC1 and PAD_DAC2
const PAD_XPD_FORCE: u8 = 10;
const PAD_FUN_IE: u8 = 11;
const PAD_FUN_SEL: u8 = 15; // 2 bits
const PAD_MUX_SEL: u8 = 17;
const PAD_XPD_DAC: u8 = 18;
const PAD_RUE: u8 = 27;
const PAD_RDE: u8 = 28;

/* ------------------------------------------------------------------------- */
/*  Channels                                                                 */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    /// DAC channel 1, GPIO25.
    A = 1,
    /// DAC channel 2, GPIO26.
    B = 2,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::A, Channel::B];

    /// Hardware channel number (1 or 2).
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// GPIO the channel's analog output is bonded to.
    pub const fn gpio(self) -> u8 {
        match self {
            Channel::A => 25,
            Channel::B => 26,
        }
    }

    const fn offset_field(self) -> Field {
        match self {
            Channel::A => DAC_DC1,
            Channel::B => DAC_DC2,
        }
    }

    const fn scale_field(self) -> Field {
        match self {
            Channel::A => DAC_SCALE1,
            Channel::B => DAC_SCALE2,
        }
    }

    const fn invert_field(self) -> Field {
        match self {
            Channel::A => DAC_INV1,
            Channel::B => DAC_INV2,
        }
    }

    const fn cw_enable_field(self) -> Field {
        match self {
            Channel::A => DAC_CW_EN1,
            Channel::B => DAC_CW_EN2,
        }
    }

    const fn pad(self) -> Reg {
        match self {
            Channel::A => Reg::PadDac1,
            Channel::B => Reg::PadDac2,
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Channel::A),
            2 => Ok(Channel::B),
            other => Err(ConfigError::InvalidChannel(other)),
        }
    }
}

/// A channel identifier as received from outside, not yet checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub u8);

impl From<Channel> for ChannelId {
    fn from(channel: Channel) -> Self {
        Self(channel.number())
    }
}

impl From<u8> for ChannelId {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

/* ------------------------------------------------------------------------- */
/*  Codes                                                                    */
/* ------------------------------------------------------------------------- */
/// Output attenuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Scale {
    Full = 0b00,
    Half = 0b01,
    Quarter = 0b10,
    Eighth = 0b11,
}

impl Scale {
    /// Decode the low two bits of a raw field value.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Scale::Full,
            0b01 => Scale::Half,
            0b10 => Scale::Quarter,
            _ => Scale::Eighth,
        }
    }
}

impl From<Scale> for u32 {
    fn from(scale: Scale) -> Self {
        scale as u32
    }
}

/// Bit inversion applied to the raw generator sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Invert {
    None = 0b00,
    All = 0b01,
    /// Turns the raw tone into a centered cosine.
    Msb = 0b10,
    AllButMsb = 0b11,
}

impl Invert {
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Invert::None,
            0b01 => Invert::All,
            0b10 => Invert::Msb,
            _ => Invert::AllButMsb,
        }
    }
}

impl From<Invert> for u32 {
    fn from(invert: Invert) -> Self {
        invert as u32
    }
}

/* ------------------------------------------------------------------------- */
/*  Errors                                                                   */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel identifier outside {1, 2}; nothing was written.
    InvalidChannel(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidChannel(raw) => write!(f, "Channel {}", raw),
        }
    }
}

/* ------------------------------------------------------------------------- */
/*  Read-back                                                                */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub scale: Scale,
    pub offset: u8,
    pub invert: Invert,
    pub generator_connected: bool,
    pub output_enabled: bool,
}

/* ------------------------------------------------------------------------- */
/*  Driver                                                                   */
/* ------------------------------------------------------------------------- */
pub struct Dac<R> {
    regs: R,
}

impl<R: RegisterAccess> Dac<R> {
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn release(self) -> R {
        self.regs
    }

    /// Resolve a raw identifier, logging the ones that do not name a channel.
    fn resolve(channel: impl Into<ChannelId>) -> Result<Channel, ConfigError> {
        let ChannelId(raw) = channel.into();
        Channel::try_from(raw).map_err(|e| {
            warn!("Channel {}", raw);
            e
        })
    }

    /// Start the cosine generator and connect it to `channel`.
    ///
    /// The tone enable is shared by both channels; setting it again is a
    /// no-op. The channel's invert field is then set to [`Invert::Msb`],
    /// without which half of the waveform comes out folded. An unknown
    /// channel touches no register at all.
    pub fn enable_waveform_generator(
        &mut self,
        channel: impl Into<ChannelId>,
    ) -> Result<(), ConfigError> {
        let channel = Self::resolve(channel)?;
        self.regs.set_mask(SW_TONE_EN.reg, SW_TONE_EN.mask());
        let cw = channel.cw_enable_field();
        self.regs.set_mask(cw.reg, cw.mask());
        self.regs.set_bits(channel.invert_field(), Invert::Msb.into());
        Ok(())
    }

    /// Route the channel's pad to the DAC and power the output stage.
    pub fn enable_output(&mut self, channel: impl Into<ChannelId>) -> Result<(), ConfigError> {
        let channel = Self::resolve(channel)?;
        let pad = channel.pad();

        // RTC function 0, no input buffer, no pulls
        self.regs.set_mask(pad, 1 << PAD_MUX_SEL);
        self.regs.set_bits(Field::new(pad, PAD_FUN_SEL, 2), 0);
        self.regs
            .clear_mask(pad, (1 << PAD_FUN_IE) | (1 << PAD_RUE) | (1 << PAD_RDE));

        self.regs
            .set_mask(pad, (1 << PAD_XPD_DAC) | (1 << PAD_XPD_FORCE));
        Ok(())
    }

    /// Set the generator frequency step, common to both channels.
    ///
    /// Meaningful range is `0x0001..=0xFFFF`; higher bits are dropped.
    pub fn set_frequency(&mut self, step: impl Into<u32>) {
        self.regs.set_bits(SW_FSTEP, step.into());
    }

    /// 2-bit attenuation code, see [`Scale`].
    pub fn set_scale(
        &mut self,
        channel: impl Into<ChannelId>,
        scale: impl Into<u32>,
    ) -> Result<(), ConfigError> {
        let channel = Self::resolve(channel)?;
        self.regs.set_bits(channel.scale_field(), scale.into());
        Ok(())
    }

    /// DC offset, `0x00..=0xFF`.
    pub fn set_offset(
        &mut self,
        channel: impl Into<ChannelId>,
        offset: impl Into<u32>,
    ) -> Result<(), ConfigError> {
        let channel = Self::resolve(channel)?;
        self.regs.set_bits(channel.offset_field(), offset.into());
        Ok(())
    }

    /// 2-bit inversion code, see [`Invert`].
    pub fn set_invert(
        &mut self,
        channel: impl Into<ChannelId>,
        invert: impl Into<u32>,
    ) -> Result<(), ConfigError> {
        let channel = Self::resolve(channel)?;
        self.regs.set_bits(channel.invert_field(), invert.into());
        Ok(())
    }

    pub fn frequency(&self) -> u16 {
        self.regs.get_bits(SW_FSTEP) as u16
    }

    pub fn tone_enabled(&self) -> bool {
        self.regs.get_bits(SW_TONE_EN) != 0
    }

    pub fn channel_config(&self, channel: Channel) -> ChannelConfig {
        let pad = self.regs.read(channel.pad());
        let powered = (1 << PAD_XPD_DAC) | (1 << PAD_XPD_FORCE);
        ChannelConfig {
            scale: Scale::from_bits(self.regs.get_bits(channel.scale_field())),
            offset: self.regs.get_bits(channel.offset_field()) as u8,
            invert: Invert::from_bits(self.regs.get_bits(channel.invert_field())),
            generator_connected: self.regs.get_bits(channel.cw_enable_field()) != 0,
            output_enabled: (pad & powered) == powered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::registers::RegisterFile;

    fn dac() -> Dac<RegisterFile> {
        Dac::new(RegisterFile::new())
    }

    #[test]
    fn channel_from_raw() {
        assert_eq!(Channel::try_from(1u8), Ok(Channel::A));
        assert_eq!(Channel::try_from(2u8), Ok(Channel::B));
        assert_eq!(Channel::try_from(0u8), Err(ConfigError::InvalidChannel(0)));
        assert_eq!(Channel::try_from(3u8), Err(ConfigError::InvalidChannel(3)));
        assert_eq!(Channel::A.gpio(), 25);
        assert_eq!(Channel::B.gpio(), 26);
    }

    #[test]
    fn codes() {
        assert_eq!(Scale::from_bits(0b101), Scale::Half);
        assert_eq!(Invert::from_bits(2), Invert::Msb);
        assert_eq!(u32::from(Invert::AllButMsb), 3);
        assert_eq!(u32::from(Scale::Quarter), 2);
    }

    #[test]
    fn enable_waveform_generator_channel_a() {
        let mut dac = dac();
        dac.enable_waveform_generator(Channel::A).unwrap();

        let ctrl1 = dac.registers().read(Reg::SarDacCtrl1);
        let ctrl2 = dac.registers().read(Reg::SarDacCtrl2);
        assert_eq!(ctrl1, 1 << 16);
        assert_eq!(ctrl2, (1 << 24) | (2 << 20));

        assert!(dac.tone_enabled());
        let a = dac.channel_config(Channel::A);
        assert!(a.generator_connected);
        assert_eq!(a.invert, Invert::Msb);
        let b = dac.channel_config(Channel::B);
        assert!(!b.generator_connected);
        assert_eq!(b.invert, Invert::None);
    }

    #[test]
    fn enable_waveform_generator_invalid_channel_writes_nothing() {
        let mut dac = dac();
        let before = dac.registers().snapshot();
        assert_eq!(
            dac.enable_waveform_generator(7u8),
            Err(ConfigError::InvalidChannel(7))
        );
        assert_eq!(dac.registers().snapshot(), before);
        assert!(!dac.tone_enabled());
    }

    #[test]
    fn frequency_truncates_to_sixteen_bits() {
        let mut dac = dac();
        dac.set_frequency(0xFFFFu32);
        assert_eq!(dac.frequency(), 0xFFFF);
        dac.set_frequency(0x1_0000u32);
        assert_eq!(dac.frequency(), 0);
        assert_eq!(dac.registers().read(Reg::SarDacCtrl1), 0);
    }

    #[test]
    fn frequency_keeps_tone_enable() {
        let mut dac = dac();
        dac.enable_waveform_generator(Channel::B).unwrap();
        dac.set_frequency(8u32);
        assert!(dac.tone_enabled());
        assert_eq!(dac.frequency(), 8);
    }

    #[test]
    fn per_channel_fields_are_isolated() {
        for channel in Channel::ALL {
            let mut dac = Dac::new(RegisterFile::with_words([0x1234_5678, 0xA5A5_A5A5, 0, 0]));
            let ctrl2 = dac.registers().read(Reg::SarDacCtrl2);

            dac.set_scale(channel, Scale::Eighth).unwrap();
            dac.set_offset(channel, 0x3Cu32).unwrap();
            dac.set_invert(channel, Invert::All).unwrap();

            let cfg = dac.channel_config(channel);
            assert_eq!(cfg.scale, Scale::Eighth);
            assert_eq!(cfg.offset, 0x3C);
            assert_eq!(cfg.invert, Invert::All);

            let touched = channel.scale_field().mask()
                | channel.offset_field().mask()
                | channel.invert_field().mask();
            let now = dac.registers().read(Reg::SarDacCtrl2);
            assert_eq!(now & !touched, ctrl2 & !touched);
            assert_eq!(dac.registers().read(Reg::SarDacCtrl1), 0x1234_5678);
        }
    }

    #[test]
    fn out_of_range_values_are_truncated() {
        let mut dac = dac();
        dac.set_offset(Channel::B, 0x1FFu32).unwrap();
        dac.set_scale(Channel::B, 0b110u32).unwrap();
        dac.set_invert(Channel::B, 0b101u32).unwrap();
        let cfg = dac.channel_config(Channel::B);
        assert_eq!(cfg.offset, 0xFF);
        assert_eq!(cfg.scale, Scale::Quarter);
        assert_eq!(cfg.invert, Invert::All);
        // channel A fields still zero
        assert_eq!(dac.registers().read(Reg::SarDacCtrl2) & 0x0033_00FF, 0);
    }

    #[test]
    fn invalid_channel_writes_nothing() {
        let mut dac = Dac::new(RegisterFile::with_words([0xDEAD_BEEF, 0x0F0F_0F0F, 0x11, 0x22]));
        let before = dac.registers().snapshot();

        assert_eq!(dac.set_scale(0u8, 1u32), Err(ConfigError::InvalidChannel(0)));
        assert_eq!(dac.set_offset(3u8, 9u32), Err(ConfigError::InvalidChannel(3)));
        assert_eq!(dac.set_invert(255u8, 2u32), Err(ConfigError::InvalidChannel(255)));
        assert_eq!(dac.enable_output(4u8), Err(ConfigError::InvalidChannel(4)));

        assert_eq!(dac.registers().snapshot(), before);
    }

    #[test]
    fn raw_identifiers_reach_the_right_channel() {
        let mut dac = dac();
        dac.set_offset(2u8, 0x80u32).unwrap();
        assert_eq!(dac.channel_config(Channel::B).offset, 0x80);
        assert_eq!(dac.channel_config(Channel::A).offset, 0);
    }

    #[test]
    fn enable_output_powers_pad() {
        // FUN_IE (11), RUE (27), FUN_SEL (16:15) on; SLP_IE (13) and drive (31:30) unrelated
        let seeded: u32 = (1 << 11) | (1 << 13) | (1 << 27) | (0b11 << 15) | 0xC000_0000;
        let mut dac = Dac::new(RegisterFile::with_words([0, 0, seeded, 0]));
        dac.enable_output(Channel::A).unwrap();

        let pad = dac.registers().read(Reg::PadDac1);
        assert_eq!(pad & (1 << 11), 0, "input buffer left on");
        assert_ne!(pad & (1 << 13), 0, "sleep input enable disturbed");
        assert_eq!(
            pad,
            (1 << 17) | (1 << 18) | (1 << 10) | (1 << 13) | 0xC000_0000
        );
        assert!(dac.channel_config(Channel::A).output_enabled);
        assert!(!dac.channel_config(Channel::B).output_enabled);
        assert_eq!(dac.registers().read(Reg::PadDac2), 0);
    }

    #[test]
    fn error_display_names_the_identifier() {
        assert_eq!(ConfigError::InvalidChannel(5).to_string(), "Channel 5");
    }
}
