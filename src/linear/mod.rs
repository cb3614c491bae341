pub mod code128;
pub mod code39;
pub mod ean;
pub mod itf;

use tracing::debug;

use crate::common::error::{BarcodeError, BarcodeResult};
use crate::common::module::{Color, Module, ModuleMatrix};
use crate::symbol::{Family, SymbolMetadata};

pub const DEFAULT_QUIET_ZONE: usize = 10;
pub const DEFAULT_BAR_HEIGHT: usize = 50;

/// Bars of a linear symbol together with the payload they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinearCode {
    /// One entry per module, `true` for a bar.
    pub bars: Vec<bool>,
    /// Encoded payload, check characters included.
    pub code: String,
    pub checksum: Option<String>,
    /// Human readable line.
    pub text: String,
}

/// Encodes `data` as a linear symbol of the given family. `add_checksum`
/// keeps the family's default when unset.
pub fn encode(
    family: Family,
    data: &str,
    add_checksum: Option<bool>,
    bar_height: usize,
) -> BarcodeResult<(ModuleMatrix, SymbolMetadata)> {
    debug!("Encoding {data:?} as {}", family.name());
    let code = match family {
        Family::Code39 => code39::encode(data, add_checksum)?,
        Family::Pzn => code39::encode_pzn(data, add_checksum)?,
        Family::Code128 => code128::encode(data, add_checksum)?,
        Family::Gs1_128 => code128::encode_gs1(data, add_checksum)?,
        Family::Ean8 => ean::encode_ean8(data, add_checksum)?,
        Family::Ean13 => ean::encode_ean13(data, add_checksum)?,
        Family::Ean14 => ean::encode_ean14(data, add_checksum)?,
        Family::Jan => ean::encode_jan(data, add_checksum)?,
        Family::UpcA => ean::encode_upca(data, add_checksum)?,
        Family::Isbn13 => ean::encode_isbn13(data, add_checksum)?,
        Family::Isbn10 => ean::encode_isbn10(data, add_checksum)?,
        Family::Issn => ean::encode_issn(data, add_checksum)?,
        Family::Itf => itf::encode(data, add_checksum)?,
        Family::Qr | Family::MicroQr => {
            return Err(BarcodeError::InvalidPayload {
                family: family.name(),
                reason: "not a linear family".to_string(),
            })
        }
    };
    if bar_height == 0 {
        return Err(BarcodeError::InvalidGeometry("bar height must be positive".to_string()));
    }
    debug!("Encoded {:?}: {} modules", code.code, code.bars.len());

    let bars = code.bars.iter().map(|&b| Module::Bar(if b { Color::Dark } else { Color::Light })).collect();
    let matrix = ModuleMatrix::linear(bars, DEFAULT_QUIET_ZONE, bar_height);
    let metadata = SymbolMetadata::linear(family, code.code, code.checksum, code.text);
    Ok((matrix, metadata))
}

// Validation helpers
//------------------------------------------------------------------------------

// Rejects empty data and names the first character outside the alphabet
pub(crate) fn check_alphabet(
    family: &'static str,
    data: &str,
    allowed: impl Fn(char) -> bool,
) -> BarcodeResult<()> {
    if data.is_empty() {
        return Err(BarcodeError::EmptyData);
    }
    match data.chars().enumerate().find(|&(_, ch)| !allowed(ch)) {
        Some((pos, ch)) => Err(BarcodeError::AlphabetViolation { family, ch, pos }),
        None => Ok(()),
    }
}

pub(crate) fn mandatory_checksum(family: &'static str, add_checksum: Option<bool>) -> BarcodeResult<()> {
    match add_checksum {
        Some(false) => {
            Err(BarcodeError::ChecksumConflict { family, reason: "the check digit is mandatory" })
        }
        _ => Ok(()),
    }
}

/// Splits a digit string of `len` digits, optionally followed by its check
/// digit.
pub(crate) fn parse_digits(
    family: &'static str,
    digits: &str,
    len: usize,
    expected: &'static str,
) -> BarcodeResult<(Vec<u8>, Option<u8>)> {
    let mut res = digits.bytes().map(|b| b - b'0').collect::<Vec<_>>();
    match res.len() {
        n if n == len => Ok((res, None)),
        n if n == len + 1 => {
            let check = res.pop();
            Ok((res, check))
        }
        found => Err(BarcodeError::InvalidLength { family, expected, found }),
    }
}

pub(crate) fn verify_check(family: &'static str, expected: char, found: Option<char>) -> BarcodeResult<()> {
    match found {
        Some(found) if found != expected => {
            Err(BarcodeError::ChecksumMismatch { family, expected, found })
        }
        _ => Ok(()),
    }
}

/// GTIN mod 10 check digit, weight 3 on the rightmost digit.
pub fn gtin_checksum(digits: &[u8]) -> u8 {
    let sum = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i & 1 == 0 { 3 } else { 1 })
        .sum::<u32>();
    ((10 - sum % 10) % 10) as u8
}

// Bar helpers
//------------------------------------------------------------------------------

pub(crate) fn bits_msb(bits: u32, len: usize) -> impl Iterator<Item = bool> {
    (0..len).rev().map(move |i| (bits >> i) & 1 == 1)
}

/// Expands alternating element widths, starting with a bar.
pub(crate) fn widths_to_bars(widths: &[u8], starts_with_bar: bool) -> Vec<bool> {
    let mut bar = starts_with_bar;
    let mut res = Vec::with_capacity(widths.iter().map(|&w| w as usize).sum());
    for &w in widths {
        res.extend(std::iter::repeat(bar).take(w as usize));
        bar = !bar;
    }
    res
}

#[cfg(test)]
mod linear_tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::{check_alphabet, encode, gtin_checksum, parse_digits, widths_to_bars};
    use crate::common::error::BarcodeError;
    use crate::symbol::Family;

    #[test_case(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3], 1)]
    #[test_case(&[5, 5, 1, 2, 3, 4, 5], 7)]
    #[test_case(&[0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5], 2)]
    fn test_gtin_checksum(digits: &[u8], exp: u8) {
        assert_eq!(gtin_checksum(digits), exp);
    }

    #[test]
    fn test_check_alphabet() {
        assert!(matches!(check_alphabet("X", "", |_| true), Err(BarcodeError::EmptyData)));
        let res = check_alphabet("X", "12a4b", |c| c.is_ascii_digit());
        assert!(matches!(res, Err(BarcodeError::AlphabetViolation { ch: 'a', pos: 2, .. })));
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("X", "123", 3, "3").unwrap(), (vec![1, 2, 3], None));
        assert_eq!(parse_digits("X", "1234", 3, "3").unwrap(), (vec![1, 2, 3], Some(4)));
        assert!(matches!(
            parse_digits("X", "12", 3, "3 or 4"),
            Err(BarcodeError::InvalidLength { found: 2, .. })
        ));
    }

    #[test]
    fn test_widths_to_bars() {
        assert_eq!(widths_to_bars(&[2, 1, 1], true), vec![true, true, false, true]);
    }

    #[test]
    fn test_matrix() {
        let (matrix, metadata) = encode(Family::Ean8, "5512345", None, 30).unwrap();
        assert!(matrix.is_linear());
        assert_eq!(matrix.width(), 67);
        assert_eq!(matrix.rendered_height(), 30);
        assert_eq!(matrix.quiet_zone(), 10);
        assert_eq!(metadata.code, "55123457");
        assert!(matches!(encode(Family::Ean8, "5512345", None, 0), Err(BarcodeError::InvalidGeometry(_))));
        assert!(matches!(encode(Family::Qr, "1", None, 50), Err(BarcodeError::InvalidPayload { .. })));
    }

    proptest! {
        #[test]
        fn proptest_gtin_full_code_sums_to_zero(digits in prop::collection::vec(0u8..10, 1..18)) {
            let check = gtin_checksum(&digits);
            let mut full = digits.clone();
            full.push(check);
            // Weights restart from the check digit at weight 1
            let sum = full.iter().rev().enumerate()
                .map(|(i, &d)| d as u32 * if i & 1 == 0 { 1 } else { 3 })
                .sum::<u32>();
            prop_assert_eq!(sum % 10, 0);
        }
    }
}
