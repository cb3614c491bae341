use super::{check_alphabet, widths_to_bars, LinearCode};
use crate::common::error::{BarcodeError, BarcodeResult};

// Interleaved 2 of 5
//------------------------------------------------------------------------------

const NARROW: u8 = 2;
const WIDE: u8 = 5;

// Wide elements of each digit, first element is the most significant bit
static PATTERNS: [u8; 10] =
    [0b00110, 0b10001, 0b01001, 0b11000, 0b00101, 0b10100, 0b01100, 0b00011, 0b10010, 0b01010];

fn element_widths(d: u8) -> impl Iterator<Item = u8> {
    (0..5).rev().map(move |i| if (PATTERNS[d as usize] >> i) & 1 == 1 { WIDE } else { NARROW })
}

/// Pairs of digits, the first drawn in bars and the second in the spaces
/// between them. Odd length data gets a leading zero.
pub(crate) fn encode(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    const FAMILY: &str = "ITF";
    check_alphabet(FAMILY, data, |c| c.is_ascii_digit())?;
    if add_checksum == Some(true) {
        return Err(BarcodeError::ChecksumConflict { family: FAMILY, reason: "no check digit is defined" });
    }
    let code = if data.len() % 2 == 1 { format!("0{data}") } else { data.to_string() };
    let digits = code.bytes().map(|b| b - b'0').collect::<Vec<_>>();

    let mut widths = vec![NARROW; 4];
    for pair in digits.chunks(2) {
        widths.extend(element_widths(pair[0]).zip(element_widths(pair[1])).flat_map(|(b, s)| [b, s]));
    }
    widths.extend([WIDE, NARROW, NARROW]);
    Ok(LinearCode { bars: widths_to_bars(&widths, true), text: code.clone(), code, checksum: None })
}
