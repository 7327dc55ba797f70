//! Wire representation of numeric VP values
//!
//! The display stores numbers as big-endian integers. Which integer width a
//! VP uses, and how a firmware-side `f32` maps onto it, is fixed when the VP
//! is registered by picking a [`WireType`].

use heapless::Vec;

/// Encoded numeric value (at most four bytes)
pub type WireBytes = Vec<u8, 4>;

/// Compile-time power of ten, saturating at `u32::MAX`
pub const fn pow10(exp: u8) -> u32 {
    let mut result = 1u32;
    let mut i = 0;
    while i < exp {
        result = result.saturating_mul(10);
        i += 1;
    }
    result
}

/// How a numeric value is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WireType {
    /// Unsigned byte
    U8,
    /// Signed byte
    I8,
    /// Unsigned 16-bit word
    #[default]
    U16,
    /// Signed 16-bit word
    I16,
    /// Signed 32-bit double word
    I32,
    /// IEEE-754 single precision
    Float,
    /// Signed 16-bit word holding `value * 10^decimals`
    Fixed {
        /// Number of implied decimal places
        decimals: u8,
    },
}

impl WireType {
    /// Number of bytes this type occupies on the wire
    pub const fn size(self) -> usize {
        match self {
            WireType::U8 | WireType::I8 => 1,
            WireType::U16 | WireType::I16 | WireType::Fixed { .. } => 2,
            WireType::I32 | WireType::Float => 4,
        }
    }

    /// Encode `value` as big-endian bytes
    ///
    /// Integer types truncate toward zero and saturate at their bounds.
    pub fn encode(self, value: f32) -> WireBytes {
        let mut out = WireBytes::new();
        // Every arm fits in four bytes
        let _ = match self {
            WireType::U8 => out.extend_from_slice(&(value as u8).to_be_bytes()),
            WireType::I8 => out.extend_from_slice(&(value as i8).to_be_bytes()),
            WireType::U16 => out.extend_from_slice(&(value as u16).to_be_bytes()),
            WireType::I16 => out.extend_from_slice(&(value as i16).to_be_bytes()),
            WireType::I32 => out.extend_from_slice(&(value as i32).to_be_bytes()),
            WireType::Float => out.extend_from_slice(&value.to_be_bytes()),
            WireType::Fixed { decimals } => {
                let scaled = value * pow10(decimals) as f32;
                out.extend_from_slice(&(scaled as i16).to_be_bytes())
            }
        };
        out
    }

    /// Decode a value from the leading bytes of `data`
    ///
    /// Returns `None` when `data` is shorter than [`WireType::size`].
    pub fn decode(self, data: &[u8]) -> Option<f32> {
        let bytes = data.get(..self.size())?;
        let value = match self {
            WireType::U8 => bytes[0] as f32,
            WireType::I8 => bytes[0] as i8 as f32,
            WireType::U16 => u16::from_be_bytes([bytes[0], bytes[1]]) as f32,
            WireType::I16 => i16::from_be_bytes([bytes[0], bytes[1]]) as f32,
            WireType::I32 => i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
            WireType::Float => f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            WireType::Fixed { decimals } => {
                i16::from_be_bytes([bytes[0], bytes[1]]) as f32 / pow10(decimals) as f32
            }
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), 1);
        assert_eq!(pow10(2), 100);
        assert_eq!(pow10(9), 1_000_000_000);
        assert_eq!(pow10(12), u32::MAX);
    }

    #[test]
    fn test_encode_u16_big_endian() {
        assert_eq!(&WireType::U16.encode(1234.0)[..], &[0x04, 0xD2]);
    }

    #[test]
    fn test_encode_saturates() {
        assert_eq!(&WireType::U8.encode(300.0)[..], &[0xFF]);
        assert_eq!(&WireType::U16.encode(-5.0)[..], &[0x00, 0x00]);
        assert_eq!(&WireType::I16.encode(-40000.0)[..], &[0x80, 0x00]);
    }

    #[test]
    fn test_encode_signed() {
        assert_eq!(&WireType::I8.encode(-1.0)[..], &[0xFF]);
        assert_eq!(&WireType::I16.encode(-2.0)[..], &[0xFF, 0xFE]);
        assert_eq!(&WireType::I32.encode(70000.0)[..], &[0x00, 0x01, 0x11, 0x70]);
    }

    #[test]
    fn test_fixed_point_truncates() {
        // -1.25 mm probe offset with two decimals
        assert_eq!(
            &WireType::Fixed { decimals: 2 }.encode(-1.25)[..],
            &(-125i16).to_be_bytes()
        );
        // 0.5 with no decimals truncates toward zero
        assert_eq!(&WireType::Fixed { decimals: 0 }.encode(0.5)[..], &[0, 0]);
    }

    #[test]
    fn test_float_is_ieee_big_endian() {
        assert_eq!(&WireType::Float.encode(1.0)[..], &[0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(
            WireType::Float.decode(&[0x3F, 0x80, 0x00, 0x00]),
            Some(1.0)
        );
    }

    #[test]
    fn test_decode() {
        assert_eq!(WireType::U16.decode(&[0x00, 0xC8]), Some(200.0));
        assert_eq!(WireType::I16.decode(&[0xFF, 0x38]), Some(-200.0));
        assert_eq!(WireType::Fixed { decimals: 1 }.decode(&[0x00, 0x19]), Some(2.5));
        // Trailing bytes are ignored
        assert_eq!(WireType::U8.decode(&[0x07, 0x99]), Some(7.0));
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(WireType::U16.decode(&[0x01]), None);
        assert_eq!(WireType::I32.decode(&[]), None);
    }

    #[test]
    fn test_size_matches_encoding() {
        let types = [
            WireType::U8,
            WireType::I8,
            WireType::U16,
            WireType::I16,
            WireType::I32,
            WireType::Float,
            WireType::Fixed { decimals: 3 },
        ];
        for wire in types {
            assert_eq!(wire.encode(1.0).len(), wire.size());
        }
    }
}
