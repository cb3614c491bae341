use super::{bits_msb, check_alphabet, gtin_checksum, mandatory_checksum, parse_digits, verify_check, LinearCode};
use crate::common::error::{BarcodeError, BarcodeResult};

// EAN / UPC tables
//------------------------------------------------------------------------------

// Odd parity left hand digits
static L_CODES: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011, 0b0110001, 0b0101111, 0b0111011,
    0b0110111, 0b0001011,
];

// Right hand digits. Even parity left hand digits are these mirrored
static R_CODES: [u8; 10] = [
    0b1110010, 0b1100110, 0b1101100, 0b1000010, 0b1011100, 0b1001110, 0b1010000, 0b1000100,
    0b1001000, 0b1110100,
];

// Parity of the left half of EAN-13 keyed on the first digit, set bit is even
static PARITY: [u8; 10] =
    [0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110, 0b011010];

const GUARD: (u32, usize) = (0b101, 3);
const CENTER: (u32, usize) = (0b01010, 5);

fn g_code(d: u8) -> u8 {
    R_CODES[d as usize].reverse_bits() >> 1
}

/// Bars of a full EAN-8, EAN-13 or EAN-14 number. EAN-14 keeps the EAN-13
/// layout with a seventh right hand digit.
fn ean_bars(digits: &[u8]) -> Vec<bool> {
    let (parity, left, right) = match digits.len() {
        8 => (0, &digits[..4], &digits[4..]),
        _ => (PARITY[digits[0] as usize], &digits[1..7], &digits[7..]),
    };
    let n = left.len();
    let mut res = Vec::with_capacity(3 + 7 * 2 * n + 5 + 3);
    res.extend(bits_msb(GUARD.0, GUARD.1));
    for (i, &d) in left.iter().enumerate() {
        let even = (parity >> (n - 1 - i)) & 1 == 1;
        let code = if even { g_code(d) } else { L_CODES[d as usize] };
        res.extend(bits_msb(code as u32, 7));
    }
    res.extend(bits_msb(CENTER.0, CENTER.1));
    for &d in right {
        res.extend(bits_msb(R_CODES[d as usize] as u32, 7));
    }
    res.extend(bits_msb(GUARD.0, GUARD.1));
    res
}

fn digit_char(d: u8) -> char {
    char::from(b'0' + d)
}

fn digits_str(digits: &[u8]) -> String {
    digits.iter().map(|&d| digit_char(d)).collect()
}

// Appends the GTIN check digit, verifying a supplied one
fn complete_gtin(family: &'static str, mut digits: Vec<u8>, supplied: Option<u8>) -> BarcodeResult<Vec<u8>> {
    let check = gtin_checksum(&digits);
    verify_check(family, digit_char(check), supplied.map(digit_char))?;
    digits.push(check);
    Ok(digits)
}

fn gtin_code(digits: &[u8], text: String) -> LinearCode {
    let check = digits[digits.len() - 1];
    LinearCode { bars: ean_bars(digits), code: digits_str(digits), checksum: Some(digit_char(check).to_string()), text }
}

fn encode_gtin(
    family: &'static str,
    data: &str,
    add_checksum: Option<bool>,
    len: usize,
    expected: &'static str,
    rule: impl Fn(&[u8]) -> BarcodeResult<()>,
) -> BarcodeResult<Vec<u8>> {
    check_alphabet(family, data, |c| c.is_ascii_digit())?;
    let (digits, supplied) = parse_digits(family, data, len, expected)?;
    rule(&digits)?;
    mandatory_checksum(family, add_checksum)?;
    complete_gtin(family, digits, supplied)
}

fn no_rule(_: &[u8]) -> BarcodeResult<()> {
    Ok(())
}

// Families
//------------------------------------------------------------------------------

pub(crate) fn encode_ean8(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    let digits = encode_gtin("EAN-8", data, add_checksum, 7, "7 or 8", no_rule)?;
    Ok(gtin_code(&digits, digits_str(&digits)))
}

pub(crate) fn encode_ean13(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    let digits = encode_gtin("EAN-13", data, add_checksum, 12, "12 or 13", no_rule)?;
    Ok(gtin_code(&digits, digits_str(&digits)))
}

/// GTIN-14 drawn with EAN-13 guards, the leading digit picks the left parity.
pub(crate) fn encode_ean14(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    let digits = encode_gtin("EAN-14", data, add_checksum, 13, "13 or 14", no_rule)?;
    Ok(gtin_code(&digits, digits_str(&digits)))
}

/// EAN-13 with a Japanese prefix, 450 to 459 or 490 to 499.
pub(crate) fn encode_jan(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    const FAMILY: &str = "JAN";
    let digits = encode_gtin(FAMILY, data, add_checksum, 12, "12 or 13", |d| match (d[0], d[1]) {
        (4, 5 | 9) => Ok(()),
        _ => Err(BarcodeError::InvalidPayload {
            family: FAMILY,
            reason: "country code must be 450-459 or 490-499".to_string(),
        }),
    })?;
    Ok(gtin_code(&digits, digits_str(&digits)))
}

/// UPC-A, drawn as an EAN-13 with a leading zero.
pub(crate) fn encode_upca(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    let digits = encode_gtin("UPC-A", data, add_checksum, 11, "11 or 12", no_rule)?;
    let mut ean = vec![0];
    ean.extend_from_slice(&digits);
    let code = digits_str(&digits);
    Ok(LinearCode { bars: ean_bars(&ean), code: code.clone(), checksum: Some(code[11..].to_string()), text: code })
}

fn is_isbn_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}

pub(crate) fn encode_isbn13(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    const FAMILY: &str = "ISBN-13";
    check_alphabet(FAMILY, data, is_isbn_char)?;
    let stripped = data.replace('-', "");
    let digits = encode_gtin(FAMILY, &stripped, add_checksum, 12, "12 or 13", |d| match d[..3] {
        [9, 7, 8 | 9] => Ok(()),
        _ => Err(BarcodeError::InvalidPayload { family: FAMILY, reason: "prefix must be 978 or 979".to_string() }),
    })?;
    Ok(gtin_code(&digits, data.to_string()))
}

// Digits with an optional trailing mod 11 check character, hyphens dropped
fn parse_mod11(
    family: &'static str,
    data: &str,
    len: usize,
    expected: &'static str,
) -> BarcodeResult<(Vec<u8>, Option<char>)> {
    check_alphabet(family, data, |c| is_isbn_char(c) || c.eq_ignore_ascii_case(&'x'))?;
    let stripped = data.replace('-', "").to_ascii_uppercase();
    if stripped.len() != len && stripped.len() != len + 1 {
        return Err(BarcodeError::InvalidLength { family, expected, found: stripped.len() });
    }
    if stripped[..len].contains('X') {
        return Err(BarcodeError::InvalidPayload {
            family,
            reason: "X is only allowed as check character".to_string(),
        });
    }
    let digits = stripped[..len].bytes().map(|b| b - b'0').collect();
    Ok((digits, stripped[len..].chars().next()))
}

fn mod11_char(check: u32) -> char {
    match check {
        10 => 'X',
        c => digit_char(c as u8),
    }
}

/// ISBN-10 check character, weights 1 to 9.
pub fn isbn10_checksum(digits: &[u8]) -> char {
    let sum = digits.iter().zip(1..).map(|(&d, w)| d as u32 * w).sum::<u32>();
    mod11_char(sum % 11)
}

/// ISSN check character, weights 8 down to 2.
pub fn issn_checksum(digits: &[u8]) -> char {
    let sum = digits.iter().rev().zip(2..).map(|(&d, w)| d as u32 * w).sum::<u32>();
    mod11_char((11 - sum % 11) % 11)
}

/// ISBN-10, drawn as the equivalent 978 ISBN-13.
pub(crate) fn encode_isbn10(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    const FAMILY: &str = "ISBN-10";
    let (digits, supplied) = parse_mod11(FAMILY, data, 9, "9 or 10")?;
    mandatory_checksum(FAMILY, add_checksum)?;
    let check = isbn10_checksum(&digits);
    verify_check(FAMILY, check, supplied)?;

    let mut ean = vec![9, 7, 8];
    ean.extend_from_slice(&digits);
    let ean = complete_gtin(FAMILY, ean, None)?;
    let text = format!("{}{check}", digits_str(&digits));
    Ok(LinearCode { bars: ean_bars(&ean), code: digits_str(&ean), checksum: Some(check.to_string()), text })
}

/// ISSN, drawn as EAN-13 `977`, the seven digits and issue number `00`.
pub(crate) fn encode_issn(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    const FAMILY: &str = "ISSN";
    let (digits, supplied) = parse_mod11(FAMILY, data, 7, "7 or 8")?;
    mandatory_checksum(FAMILY, add_checksum)?;
    let check = issn_checksum(&digits);
    verify_check(FAMILY, check, supplied)?;

    let mut ean = vec![9, 7, 7];
    ean.extend_from_slice(&digits);
    ean.extend_from_slice(&[0, 0]);
    let ean = complete_gtin(FAMILY, ean, None)?;
    let text = format!("{}{check}", digits_str(&digits));
    Ok(LinearCode { bars: ean_bars(&ean), code: digits_str(&ean), checksum: Some(check.to_string()), text })
}
