use std::fmt::{Display, Formatter};
use std::ops::Deref;

use super::codec::Mode;
use super::error::{BarcodeError, BarcodeResult};

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum Version {
    Micro(usize),
    Normal(usize),
}

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        match self {
            Self::Micro(v) => v,
            Self::Normal(v) => v,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Micro(v) => write!(f, "M{v}"),
            Self::Normal(v) => write!(f, "{v}"),
        }
    }
}

impl Version {
    pub fn new(version: usize, micro: bool) -> BarcodeResult<Self> {
        match (micro, version) {
            (true, 1..=4) => Ok(Self::Micro(version)),
            (false, 1..=40) => Ok(Self::Normal(version)),
            _ => Err(BarcodeError::InvalidVersion),
        }
    }

    pub const fn width(self) -> usize {
        match self {
            Self::Micro(v) => v * 2 + 9,
            Self::Normal(v) => v * 4 + 17,
        }
    }

    pub fn is_micro(self) -> bool {
        matches!(self, Self::Micro(_))
    }

    pub fn quiet_zone(self) -> usize {
        match self {
            Self::Micro(_) => 2,
            Self::Normal(_) => 4,
        }
    }

    /// Every version a symbol of the given kind can take, smallest first.
    pub fn all(micro: bool) -> impl Iterator<Item = Version> {
        let (range, ctor): (_, fn(usize) -> Version) =
            if micro { (1..=4, Self::Micro) } else { (1..=40, Self::Normal) };
        range.map(ctor)
    }

    pub fn supports(self, ecl: ECLevel) -> bool {
        match self {
            Self::Micro(1) => ecl == ECLevel::L,
            Self::Micro(2 | 3) => ecl <= ECLevel::M,
            Self::Micro(_) => ecl <= ECLevel::Q,
            Self::Normal(_) => true,
        }
    }

    pub fn supports_mode(self, mode: Mode) -> bool {
        match (self, mode) {
            (Self::Micro(1), Mode::Numeric) => true,
            (Self::Micro(1), _) => false,
            (Self::Micro(2), Mode::Numeric | Mode::Alphanumeric) => true,
            (Self::Micro(2), _) => false,
            (Self::Micro(_), Mode::Eci) => false,
            _ => true,
        }
    }

    // Raw modules left for data and ecc after all function patterns are drawn
    fn raw_data_modules(self) -> usize {
        match self {
            Self::Micro(v) => [36, 80, 132, 192][v - 1],
            Self::Normal(v) => {
                let mut res = (16 * v + 128) * v + 64;
                if v >= 2 {
                    let num_align = v / 7 + 2;
                    res -= (25 * num_align - 10) * num_align - 55;
                    if v >= 7 {
                        res -= 36;
                    }
                }
                res
            }
        }
    }

    pub fn total_codewords(self) -> usize {
        match self {
            // M1 and M3 carry a trailing 4 bit data codeword
            Self::Micro(v) => [5, 10, 17, 24][v - 1],
            Self::Normal(_) => self.raw_data_modules() >> 3,
        }
    }

    pub fn remainder_bits(self) -> usize {
        match self {
            Self::Micro(_) => 0,
            Self::Normal(_) => self.raw_data_modules() - (self.total_codewords() << 3),
        }
    }

    pub fn ecc_per_block(self, ecl: ECLevel) -> usize {
        match self {
            Self::Micro(v) => MICRO_ECC_CODEWORDS[v - 1][ecl as usize] as usize,
            Self::Normal(v) => ECC_CODEWORDS_PER_BLOCK[ecl as usize][v] as usize,
        }
    }

    pub fn block_count(self, ecl: ECLevel) -> usize {
        match self {
            Self::Micro(_) => 1,
            Self::Normal(v) => NUM_ERROR_CORRECTION_BLOCKS[ecl as usize][v] as usize,
        }
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        match self {
            Self::Micro(v) => MICRO_DATA_BITS[v - 1][ecl as usize] as usize,
            Self::Normal(_) => {
                let ecc = self.ecc_per_block(ecl) * self.block_count(ecl);
                (self.total_codewords() - ecc) << 3
            }
        }
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        (self.data_bit_capacity(ecl) + 7) >> 3
    }

    /// Returns (block1 size, block1 count, block2 size, block2 count) of data codewords.
    pub fn data_codewords_per_block(self, ecl: ECLevel) -> (usize, usize, usize, usize) {
        let data = self.data_codewords(ecl);
        let blocks = self.block_count(ecl);
        let block2_count = data % blocks;
        let block1_count = blocks - block2_count;
        let block1_size = data / blocks;
        let block2_size = if block2_count > 0 { block1_size + 1 } else { 0 };
        (block1_size, block1_count, block2_size, block2_count)
    }

    pub fn mode_bits(self) -> usize {
        match self {
            Self::Micro(v) => v - 1,
            Self::Normal(_) => 4,
        }
    }

    /// Length of the character count indicator, `None` when the version
    /// can't hold the mode at all.
    pub fn char_cnt_bits(self, mode: Mode) -> Option<usize> {
        if !self.supports_mode(mode) {
            return None;
        }
        let bits = match (self, mode) {
            (_, Mode::Eci) => 0,
            (Self::Micro(v), Mode::Numeric) => v + 2,
            (Self::Micro(v), Mode::Alphanumeric) => v + 1,
            (Self::Micro(v), Mode::Byte) => v + 1,
            (Self::Micro(v), Mode::Kanji) => v,
            (Self::Normal(v), m) => {
                let i = match v {
                    1..=9 => 0,
                    10..=26 => 1,
                    _ => 2,
                };
                match m {
                    Mode::Numeric => [10, 12, 14][i],
                    Mode::Alphanumeric => [9, 11, 13][i],
                    Mode::Byte => [8, 16, 16][i],
                    Mode::Kanji => [8, 10, 12][i],
                    Mode::Eci => 0,
                }
            }
        };
        Some(bits)
    }

    pub fn terminator_bits(self) -> usize {
        match self {
            Self::Micro(v) => v * 2 + 1,
            Self::Normal(_) => 4,
        }
    }

    pub fn alignment_pattern(self) -> Vec<i16> {
        let v = match self {
            Self::Micro(_) | Self::Normal(1) => return Vec::new(),
            Self::Normal(v) => v as i16,
        };
        let num_align = v / 7 + 2;
        let step = if v == 32 { 26 } else { (v * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2 };
        let w = self.width() as i16;
        let mut res = vec![6];
        res.extend((0..num_align - 1).map(|i| w - 7 - i * step).rev());
        res
    }

    pub fn info(self) -> u32 {
        match self {
            Self::Micro(_) => unreachable!("Micro QR has no version info"),
            Self::Normal(v) => {
                let v = v as u32;
                (v << 12) | bch_remainder(v << 12, VERSION_INFO_GENERATOR)
            }
        }
    }
}


// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    pub const ALL: [ECLevel; 4] = [Self::L, Self::M, Self::Q, Self::H];

    fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::str::FromStr for ECLevel {
    type Err = BarcodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            _ => Err(BarcodeError::UnsupportedErrorLevel(s.to_string(), "any".to_string())),
        }
    }
}

// Format information
//------------------------------------------------------------------------------

/// 15 bit format information: ec level (or Micro QR symbol number) and mask,
/// BCH(15,5) protected and masked.
pub fn format_info(ver: Version, ecl: ECLevel, mask: u8) -> u32 {
    let (data, xor) = match ver {
        Version::Micro(v) => {
            let symbol_number = match (v, ecl) {
                (1, _) => 0,
                (2, ecl) => 1 + ecl as u32,
                (3, ecl) => 3 + ecl as u32,
                (_, ecl) => 5 + ecl as u32,
            };
            ((symbol_number << 2) | mask as u32, MICRO_FORMAT_MASK)
        }
        Version::Normal(_) => ((ecl.format_bits() << 3) | mask as u32, FORMAT_MASK),
    };
    ((data << 10) | bch_remainder(data << 10, FORMAT_INFO_GENERATOR)) ^ xor
}

fn bch_remainder(mut value: u32, generator: u32) -> u32 {
    let gen_len = 32 - generator.leading_zeros();
    while value != 0 && 32 - value.leading_zeros() >= gen_len {
        let shift = (32 - value.leading_zeros()) - gen_len;
        value ^= generator << shift;
    }
    value
}


// Global constants
//------------------------------------------------------------------------------

pub const FORMAT_INFO_BIT_LEN: usize = 15;

pub const VERSION_INFO_BIT_LEN: usize = 18;

pub const FORMAT_INFO_GENERATOR: u32 = 0b10100110111;

pub const VERSION_INFO_GENERATOR: u32 = 0b1111100100101;

pub const FORMAT_MASK: u32 = 0b101010000010010;

pub const MICRO_FORMAT_MASK: u32 = 0b100010001000101;

// Coordinates are listed most significant bit first
pub static FORMAT_INFO_COORDS_QR_MAIN: [(i16, i16); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

pub static FORMAT_INFO_COORDS_QR_SIDE: [(i16, i16); 15] = [
    (-1, 8),
    (-2, 8),
    (-3, 8),
    (-4, 8),
    (-5, 8),
    (-6, 8),
    (-7, 8),
    (8, -8),
    (8, -7),
    (8, -6),
    (8, -5),
    (8, -4),
    (8, -3),
    (8, -2),
    (8, -1),
];

pub static FORMAT_INFO_COORDS_MICRO: [(i16, i16); 15] = [
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 6),
    (8, 7),
    (8, 8),
    (7, 8),
    (6, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
];

/// Version info coordinates in the bottom left and top right blocks, most
/// significant bit first.
pub fn version_info_coords() -> ([(i16, i16); 18], [(i16, i16); 18]) {
    let mut bl = [(0, 0); 18];
    let mut tr = [(0, 0); 18];
    for (k, i) in (0..18_i16).rev().enumerate() {
        bl[k] = (-11 + i % 3, i / 3);
        tr[k] = (i / 3, -11 + i % 3);
    }
    (bl, tr)
}

// Indexed by [ec level][version], index 0 unused
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

// Indexed by [version - 1][ec level], 0 where the level isn't supported
static MICRO_DATA_BITS: [[u8; 4]; 4] =
    [[20, 0, 0, 0], [40, 32, 0, 0], [84, 68, 0, 0], [128, 112, 80, 0]];

static MICRO_ECC_CODEWORDS: [[u8; 4]; 4] = [[2, 0, 0, 0], [5, 6, 0, 0], [6, 8, 0, 0], [8, 10, 14, 0]];
