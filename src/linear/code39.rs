use super::{bits_msb, check_alphabet, mandatory_checksum, parse_digits, verify_check, LinearCode};
use crate::common::error::{BarcodeError, BarcodeResult};

// Code 39
//------------------------------------------------------------------------------

/// Character set in checksum value order. `*` is reserved for start and stop.
pub const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

// Narrow element is 1 module, wide is 2. Five bars and four spaces per char
static PATTERNS: [u16; 44] = [
    0b101001101101, // 0
    0b110100101011, // 1
    0b101100101011, // 2
    0b110110010101, // 3
    0b101001101011, // 4
    0b110100110101, // 5
    0b101100110101, // 6
    0b101001011011, // 7
    0b110100101101, // 8
    0b101100101101, // 9
    0b110101001011, // A
    0b101101001011, // B
    0b110110100101, // C
    0b101011001011, // D
    0b110101100101, // E
    0b101101100101, // F
    0b101010011011, // G
    0b110101001101, // H
    0b101101001101, // I
    0b101011001101, // J
    0b110101010011, // K
    0b101101010011, // L
    0b110110101001, // M
    0b101011010011, // N
    0b110101101001, // O
    0b101101101001, // P
    0b101010110011, // Q
    0b110101011001, // R
    0b101101011001, // S
    0b101011011001, // T
    0b110010101011, // U
    0b100110101011, // V
    0b110011010101, // W
    0b100101101011, // X
    0b110010110101, // Y
    0b100110110101, // Z
    0b100101011011, // -
    0b110010101101, // .
    0b100110101101, // space
    0b100100100101, // $
    0b100100101001, // /
    0b100101001001, // +
    0b101001001001, // %
    0b100101101101, // *
];

const START_STOP: usize = 43;
const CHAR_WIDTH: usize = 12;

pub fn is_valid_char(c: char) -> bool {
    ALPHABET.contains(c.to_ascii_uppercase())
}

fn value(c: char) -> Option<usize> {
    ALPHABET.find(c)
}

/// Mod 43 check character of an uppercased payload.
pub fn checksum(code: &str) -> char {
    let sum = code.chars().filter_map(value).sum::<usize>();
    ALPHABET.as_bytes()[sum % 43] as char
}

pub(crate) fn encode(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    check_alphabet("Code 39", data, is_valid_char)?;
    let text = data.to_ascii_uppercase();
    let check = add_checksum.unwrap_or(true).then(|| checksum(&text));
    let mut code = text.clone();
    code.extend(check);
    Ok(LinearCode { bars: bars(&code)?, code, checksum: check.map(String::from), text })
}

/// Pharmazentralnummer: six digits and a mod 11 check digit, printed as
/// Code 39 `PZN-` followed by the seven digits.
pub(crate) fn encode_pzn(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    const FAMILY: &str = "PZN";
    check_alphabet(FAMILY, data, |c| c.is_ascii_digit())?;
    let (digits, supplied) = parse_digits(FAMILY, data, 6, "6 or 7")?;
    mandatory_checksum(FAMILY, add_checksum)?;
    let check = digits.iter().zip(2..).map(|(&d, w)| d as u32 * w).sum::<u32>() % 11;
    if check == 10 {
        return Err(BarcodeError::InvalidPayload {
            family: FAMILY,
            reason: "check digit would be 10".to_string(),
        });
    }
    let check = char::from(b'0' + check as u8);
    verify_check(FAMILY, check, supplied.map(|d| char::from(b'0' + d)))?;
    let code = format!("PZN-{}{check}", &data[..6]);
    Ok(LinearCode { bars: bars(&code)?, text: code.clone(), code, checksum: Some(check.to_string()) })
}

// Start, characters and stop. Every character but the stop is followed by a
// narrow gap
pub(crate) fn bars(code: &str) -> BarcodeResult<Vec<bool>> {
    let mut res = Vec::with_capacity((code.len() + 2) * (CHAR_WIDTH + 1));
    res.extend(bits_msb(PATTERNS[START_STOP] as u32, CHAR_WIDTH));
    res.push(false);
    for (pos, ch) in code.chars().enumerate() {
        let idx = value(ch)
            .ok_or(BarcodeError::AlphabetViolation { family: "Code 39", ch, pos })?;
        res.extend(bits_msb(PATTERNS[idx] as u32, CHAR_WIDTH));
        res.push(false);
    }
    res.extend(bits_msb(PATTERNS[START_STOP] as u32, CHAR_WIDTH));
    Ok(res)
}

#[cfg(test)]
mod code39_tests {
    use test_case::test_case;

    use super::{checksum, encode, encode_pzn, PATTERNS};
    use crate::common::error::BarcodeError;

    #[test]
    fn test_patterns_have_three_wide_elements() {
        for p in PATTERNS {
            // Starts and ends with a bar, 5 bars and 4 spaces
            assert_eq!(p >> 11, 1);
            assert_eq!(p & 1, 1);
            let transitions = (0..11).filter(|i| (p >> i) & 1 != (p >> (i + 1)) & 1).count();
            assert_eq!(transitions, 8);
        }
    }

    #[test_case("CODE39", 'W')]
    #[test_case("WIKIPEDIA", '$')]
    #[test_case("ABCD-123456", 'H')]
    fn test_checksum(code: &str, exp: char) {
        assert_eq!(checksum(code), exp);
    }

    #[test]
    fn test_encode_uppercases() {
        let code = encode("code39", None).unwrap();
        assert_eq!(code.text, "CODE39");
        assert_eq!(code.code, "CODE39W");
        assert_eq!(code.checksum.as_deref(), Some("W"));
        let code = encode("code39", Some(false)).unwrap();
        assert_eq!(code.code, "CODE39");
        assert_eq!(code.checksum, None);
    }

    #[test]
    fn test_width() {
        // Start, 6 characters with gap, stop
        let code = encode("ABC123", Some(false)).unwrap();
        assert_eq!(code.bars.len(), 13 + 6 * 13 + 12);
        assert!(code.bars[0] && *code.bars.last().unwrap());
    }

    #[test]
    fn test_invalid_char() {
        let res = encode("AB*C", None);
        assert!(matches!(res, Err(BarcodeError::AlphabetViolation { ch: '*', pos: 2, .. })));
    }

    #[test]
    fn test_pzn() {
        let code = encode_pzn("123456", None).unwrap();
        assert_eq!(code.code, "PZN-1234562");
        assert_eq!(code.checksum.as_deref(), Some("2"));
        assert_eq!(code.bars.len(), 13 + 11 * 13 + 12);
        assert!(encode_pzn("1234562", Some(true)).is_ok());
        assert!(matches!(encode_pzn("1234563", None), Err(BarcodeError::ChecksumMismatch { .. })));
        assert!(matches!(encode_pzn("123456", Some(false)), Err(BarcodeError::ChecksumConflict { .. })));
        assert!(matches!(encode_pzn("12345", None), Err(BarcodeError::InvalidLength { found: 5, .. })));
    }
}
