//! Display system commands
//!
//! The display's own registers live in the same VP address space as user
//! variables. These helpers build the writes the controller issues to them:
//! - Reset the display
//! - Switch to another screen (picture)
//! - Configure touch sound, standby backlight and brightness
//! - Recolour a control through its description pointer (SP)

use crate::frame::{Frame, FrameError};

/// System reset register
pub const VP_SYSTEM_RESET: u16 = 0x0004;
/// System configuration register; `LED_Config` follows at 0x0082
pub const VP_SYSTEM_CONFIG: u16 = 0x0080;
/// Picture (screen) select register
pub const VP_PIC_SET: u16 = 0x0084;

/// Offset of the colour word inside a control's description pointer block
pub const SP_COLOR_OFFSET: u16 = 0x0003;

/// Magic written to the reset register
pub const RESET_MAGIC: [u8; 4] = [0x55, 0xAA, 0x5A, 0xA5];

// System_Config bits
const CFG_TOUCH_FILE: u8 = 1 << 5;
const CFG_AUTO_UPLOAD: u8 = 1 << 4;
const CFG_SOUND: u8 = 1 << 3;
const CFG_STANDBY: u8 = 1 << 2;
const CFG_ORIENTATION_NORMAL: u8 = 0b10;
const CFG_ORIENTATION_ROTATED: u8 = 0b11;

/// Touchscreen and backlight configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchConfig {
    /// Dim the backlight after `standby_timeout_s` without touches
    pub standby_enabled: bool,
    /// Beep on touch
    pub sound_enabled: bool,
    /// Backlight level while in standby (%)
    pub standby_brightness: u8,
    /// Backlight level while active (%)
    pub active_brightness: u8,
    /// Idle time before standby, in seconds
    pub standby_timeout_s: u16,
    /// Screen mounted upside down
    pub rotated: bool,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            standby_enabled: true,
            sound_enabled: true,
            standby_brightness: 20,
            active_brightness: 100,
            standby_timeout_s: 60,
            rotated: false,
        }
    }
}

/// Bounds applied to [`TouchConfig`] before it is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchLimits {
    /// Lowest active brightness; keeps the screen from going fully dark
    pub min_active_brightness: u8,
    /// Highest brightness the display accepts
    pub max_brightness: u8,
    /// Shortest standby timeout in seconds
    pub min_standby_timeout_s: u16,
    /// Longest standby timeout in seconds (655 s is the register limit)
    pub max_standby_timeout_s: u16,
}

impl TouchLimits {
    /// Limits matching the display's register ranges
    pub const fn new() -> Self {
        Self {
            min_active_brightness: 10,
            max_brightness: 100,
            min_standby_timeout_s: 10,
            max_standby_timeout_s: 655,
        }
    }
}

impl Default for TouchLimits {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchConfig {
    /// Build the eight bytes written at [`VP_SYSTEM_CONFIG`]
    ///
    /// Layout: `System_Config` (`5A 00 FF cfg`) then `LED_Config`
    /// (`active, standby, timeout_hi, timeout_lo`), the timeout in 10 ms units.
    pub fn encode(&self, limits: &TouchLimits) -> [u8; 8] {
        let mut cfg = CFG_TOUCH_FILE | CFG_AUTO_UPLOAD;
        if self.sound_enabled {
            cfg |= CFG_SOUND;
        }
        if self.standby_enabled {
            cfg |= CFG_STANDBY;
        }
        cfg |= if self.rotated {
            CFG_ORIENTATION_ROTATED
        } else {
            CFG_ORIENTATION_NORMAL
        };

        let active = self
            .active_brightness
            .max(limits.min_active_brightness)
            .min(limits.max_brightness);
        let standby = self.standby_brightness.min(limits.max_brightness);
        let timeout_s = self
            .standby_timeout_s
            .max(limits.min_standby_timeout_s)
            .min(limits.max_standby_timeout_s);
        let [timeout_hi, timeout_lo] = timeout_s.saturating_mul(100).to_be_bytes();

        [0x5A, 0x00, 0xFF, cfg, active, standby, timeout_hi, timeout_lo]
    }
}

/// Commands addressed to the display's system registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemCommand {
    /// Reboot the display
    Reset,
    /// Switch to a screen
    ShowScreen(u16),
    /// Apply touch/backlight configuration
    Touch {
        config: TouchConfig,
        limits: TouchLimits,
    },
    /// Change the colour of the control described at `sp`
    SetColor { sp: u16, color: u16 },
}

impl SystemCommand {
    /// Encode this command into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            SystemCommand::Reset => Frame::write(VP_SYSTEM_RESET, &RESET_MAGIC),
            SystemCommand::ShowScreen(screen) => {
                let [hi, lo] = screen.to_be_bytes();
                Frame::write(VP_PIC_SET, &[0x5A, 0x01, hi, lo])
            }
            SystemCommand::Touch { config, limits } => {
                Frame::write(VP_SYSTEM_CONFIG, &config.encode(limits))
            }
            SystemCommand::SetColor { sp, color } => {
                Frame::write(sp.wrapping_add(SP_COLOR_OFFSET), &color.to_be_bytes())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_frame() {
        let frame = SystemCommand::Reset.to_frame().unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        assert_eq!(
            &encoded[..],
            &[0x5A, 0xA5, 0x07, 0x82, 0x00, 0x04, 0x55, 0xAA, 0x5A, 0xA5]
        );
    }

    #[test]
    fn test_show_screen_frame() {
        let frame = SystemCommand::ShowScreen(0x0102).to_frame().unwrap();
        assert_eq!(frame.address, VP_PIC_SET);
        assert_eq!(&frame.payload[..], &[0x5A, 0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_set_color_targets_sp_offset() {
        let frame = SystemCommand::SetColor {
            sp: 0x5000,
            color: 0xF800,
        }
        .to_frame()
        .unwrap();
        assert_eq!(frame.address, 0x5003);
        assert_eq!(&frame.payload[..], &[0xF8, 0x00]);
    }

    #[test]
    fn test_touch_config_bits() {
        let config = TouchConfig {
            standby_enabled: true,
            sound_enabled: false,
            standby_brightness: 30,
            active_brightness: 80,
            standby_timeout_s: 120,
            rotated: false,
        };
        let bytes = config.encode(&TouchLimits::default());
        assert_eq!(bytes[..3], [0x5A, 0x00, 0xFF]);
        assert_eq!(bytes[3], 0b0011_0110);
        assert_eq!(bytes[4], 80);
        assert_eq!(bytes[5], 30);
        // 120 s in 10 ms units
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 12_000);
    }

    #[test]
    fn test_touch_config_rotated_with_sound() {
        let config = TouchConfig {
            standby_enabled: false,
            sound_enabled: true,
            rotated: true,
            ..TouchConfig::default()
        };
        let bytes = config.encode(&TouchLimits::default());
        assert_eq!(bytes[3], 0b0011_1011);
    }

    #[test]
    fn test_touch_config_clamps() {
        let config = TouchConfig {
            standby_brightness: 250,
            active_brightness: 0,
            standby_timeout_s: 5000,
            ..TouchConfig::default()
        };
        let bytes = config.encode(&TouchLimits::default());
        assert_eq!(bytes[4], 10);
        assert_eq!(bytes[5], 100);
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 65_500);

        let short = TouchConfig {
            standby_timeout_s: 1,
            ..TouchConfig::default()
        };
        let bytes = short.encode(&TouchLimits::default());
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 1_000);
    }

    #[test]
    fn test_touch_frame_is_single_write() {
        let frame = SystemCommand::Touch {
            config: TouchConfig::default(),
            limits: TouchLimits::default(),
        }
        .to_frame()
        .unwrap();
        assert_eq!(frame.address, VP_SYSTEM_CONFIG);
        assert_eq!(frame.payload.len(), 8);
        assert_eq!(frame.encoded_len(), 14);
    }
}
