use std::fmt::{Display, Formatter};

use encoding_rs::SHIFT_JIS;

use crate::common::metadata::Version;

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
    Eci = 0b0111,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Alphanumeric => "alphanumeric",
            Self::Byte => "byte",
            Self::Kanji => "kanji",
            Self::Eci => "eci",
        }
    }

    /// Mode indicator value for Micro QR, whose indicator is 0 to 3 bits long.
    pub fn micro_indicator(self) -> u8 {
        match self {
            Self::Numeric => 0,
            Self::Alphanumeric => 1,
            Self::Byte => 2,
            Self::Kanji => 3,
            Self::Eci => unreachable!("Micro QR has no ECI mode"),
        }
    }

    #[inline]
    fn numeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Numeric.contains(char), "Invalid numeric data: {char}");
        (char - b'0') as u16
    }

    #[inline]
    fn alphanumeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Alphanumeric.contains(char), "Invalid alphanumeric data: {char}");
        match char {
            b'0'..=b'9' => (char - b'0') as u16,
            b'A'..=b'Z' => (char - b'A' + 10) as u16,
            b' ' => 36,
            b'$' => 37,
            b'%' => 38,
            b'*' => 39,
            b'+' => 40,
            b'-' => 41,
            b'.' => 42,
            b'/' => 43,
            b':' => 44,
            _ => unreachable!("Invalid alphanumeric {char}"),
        }
    }

    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let len = data.len();
        match self {
            Self::Numeric => {
                debug_assert!(len <= 3, "Data is too long for numeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 10 + Self::numeric_digit(*b))
            }
            Self::Alphanumeric => {
                debug_assert!(len <= 2, "Data is too long for alphanumeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 45 + Self::alphanumeric_digit(*b))
            }
            Self::Byte => {
                debug_assert!(len == 1, "Data is too long for byte conversion: {len}");
                data[0] as u16
            }
            Self::Kanji => {
                debug_assert!(len == 2, "Kanji characters are two bytes long: {len}");
                let sjis = ((data[0] as u16) << 8) | data[1] as u16;
                let offset = if sjis <= 0x9FFC { sjis - 0x8140 } else { sjis - 0xC140 };
                (offset >> 8) * 0xC0 + (offset & 0xFF)
            }
            Self::Eci => unreachable!("Cannot encode in ECI mode"),
        }
    }

    pub fn contains(&self, byte: u8) -> bool {
        match self {
            Self::Numeric => byte.is_ascii_digit(),
            Self::Alphanumeric => {
                matches!(byte, b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':')
            }
            Self::Byte => true,
            Self::Kanji | Self::Eci => false,
        }
    }

    /// Bit length of `char_count` characters encoded in this mode, header excluded.
    pub fn encoded_len(&self, char_count: usize) -> usize {
        match self {
            Self::Numeric => (char_count * 10 + 2) / 3,
            Self::Alphanumeric => (char_count * 11 + 1) / 2,
            Self::Byte => char_count * 8,
            Self::Kanji => char_count * 13,
            Self::Eci => 8,
        }
    }
}

// Kanji
//------------------------------------------------------------------------------

/// Shift JIS bytes of `data` if every character is a double byte character in
/// the ranges QR Kanji mode can hold.
pub fn to_kanji(data: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(data).ok()?;
    if text.is_empty() {
        return None;
    }
    let (sjis, _, unmappable) = SHIFT_JIS.encode(text);
    if unmappable || sjis.len() != text.chars().count() * 2 {
        return None;
    }
    let valid = sjis.chunks(2).all(|c| {
        let v = ((c[0] as u16) << 8) | c[1] as u16;
        (0x8140..=0x9FFC).contains(&v) || (0xE040..=0xEBBF).contains(&v)
    });
    valid.then(|| sjis.into_owned())
}

// Segment
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Segment {
    pub mode: Mode,
    pub indicator: u8,
    pub mode_bits: usize,
    pub len_bits: usize,
    pub data: Vec<u8>,
}

impl Segment {
    /// Segment header layout for `ver`, `None` if the version can't hold the mode.
    pub fn for_version(ver: Version, mode: Mode, data: Vec<u8>) -> Option<Self> {
        let len_bits = ver.char_cnt_bits(mode)?;
        let indicator = if ver.is_micro() { mode.micro_indicator() } else { mode as u8 };
        Some(Self { mode, indicator, mode_bits: ver.mode_bits(), len_bits, data })
    }

    pub fn char_count(&self) -> usize {
        match self.mode {
            Mode::Kanji => self.data.len() / 2,
            _ => self.data.len(),
        }
    }

    pub fn bit_len(&self) -> usize {
        self.mode_bits + self.len_bits + self.mode.encoded_len(self.char_count())
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

// ECI assignment number for UTF-8
pub static ECI_UTF8: u8 = 26;

#[cfg(test)]
mod mode_tests {
    use test_case::test_case;

    use super::{to_kanji, Mode, Segment};
    use crate::common::metadata::Version;

    #[test_case(Mode::Numeric, b"012", 12)]
    #[test_case(Mode::Numeric, b"9", 9)]
    #[test_case(Mode::Alphanumeric, b"AC", 10 * 45 + 12)]
    #[test_case(Mode::Alphanumeric, b" :", 36 * 45 + 44)]
    #[test_case(Mode::Byte, b"a", 97)]
    fn test_encode_chunk(mode: Mode, chunk: &[u8], exp: u16) {
        assert_eq!(mode.encode_chunk(chunk), exp);
    }

    #[test]
    fn test_encode_kanji_chunk() {
        // 点 is 0x935F, 茗 is 0xE4AA in Shift JIS
        assert_eq!(Mode::Kanji.encode_chunk(&[0x93, 0x5F]), 0x0D9F);
        assert_eq!(Mode::Kanji.encode_chunk(&[0xE4, 0xAA]), 0x1AAA);
    }

    #[test]
    fn test_to_kanji() {
        assert_eq!(to_kanji("点茗".as_bytes()), Some(vec![0x93, 0x5F, 0xE4, 0xAA]));
        assert_eq!(to_kanji(b"ABC"), None);
        assert_eq!(to_kanji("点A".as_bytes()), None);
        assert_eq!(to_kanji(&[0xFF, 0xFE]), None);
    }

    #[test]
    fn test_segment_bit_len() {
        let seg = Segment::for_version(Version::Normal(1), Mode::Numeric, b"01234567".to_vec());
        assert_eq!(seg.map(|s| s.bit_len()), Some(4 + 10 + 27));
        let kanji = vec![0x93, 0x5F, 0xE4, 0xAA];
        let seg = Segment::for_version(Version::Normal(1), Mode::Kanji, kanji.clone());
        assert_eq!(seg.map(|s| s.bit_len()), Some(4 + 8 + 26));
        let seg = Segment::for_version(Version::Micro(3), Mode::Kanji, kanji.clone());
        assert_eq!(seg.map(|s| (s.indicator, s.bit_len())), Some((3, 2 + 3 + 26)));
        assert_eq!(Segment::for_version(Version::Micro(2), Mode::Kanji, kanji), None);
    }
}
