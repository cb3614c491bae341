use super::{check_alphabet, mandatory_checksum, widths_to_bars, LinearCode};
use crate::common::error::BarcodeResult;

// Code 128
//------------------------------------------------------------------------------

/// Function code 1 as it appears in the input data.
pub const FNC1: char = '\u{f1}';

// Bar and space widths of symbols 0 to 105, 11 modules each
static PATTERNS: [&str; 106] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232",
];

static STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1_VALUE: u8 = 102;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn start(self) -> u8 {
        match self {
            Self::A => START_A,
            Self::B => START_B,
            Self::C => START_C,
        }
    }

    fn switch(self) -> u8 {
        match self {
            Self::A => CODE_A,
            Self::B => CODE_B,
            Self::C => CODE_C,
        }
    }
}

pub fn is_valid_char(c: char) -> bool {
    c.is_ascii() || c == FNC1
}

pub(crate) fn encode(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    encode_family("Code 128", data, add_checksum)
}

/// GS1-128 is Code 128 starting with FNC1.
pub(crate) fn encode_gs1(data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    check_alphabet("GS1-128", data, is_valid_char)?;
    let mut code = encode_family("GS1-128", &format!("{FNC1}{data}"), add_checksum)?;
    code.text = data.replace(FNC1, "");
    Ok(code)
}

fn encode_family(family: &'static str, data: &str, add_checksum: Option<bool>) -> BarcodeResult<LinearCode> {
    check_alphabet(family, data, is_valid_char)?;
    mandatory_checksum(family, add_checksum)?;
    let mut values = symbol_values(data);
    let check = checksum(&values);
    values.push(check);

    let mut bars = Vec::with_capacity(values.len() * 11 + 13);
    for &v in &values {
        let widths = PATTERNS[v as usize].bytes().map(|b| b - b'0').collect::<Vec<_>>();
        bars.extend(widths_to_bars(&widths, true));
    }
    bars.extend(widths_to_bars(&STOP, true));
    Ok(LinearCode {
        bars,
        code: data.to_string(),
        checksum: Some(check.to_string()),
        text: data.replace(FNC1, ""),
    })
}

/// Mod 103 check value of start symbol and data symbols.
pub fn checksum(values: &[u8]) -> u8 {
    let sum = values
        .iter()
        .enumerate()
        .map(|(i, &v)| v as u32 * (i as u32).max(1))
        .sum::<u32>();
    (sum % 103) as u8
}

fn digit_run(chars: &[char]) -> usize {
    chars.iter().take_while(|c| c.is_ascii_digit()).count()
}

// Start symbol and data symbols. Runs of 4 or more digits, or data made of
// an even number of digits only, use code set C
fn symbol_values(data: &str) -> Vec<u8> {
    let chars = data.chars().collect::<Vec<_>>();
    let use_c = |run: usize, rest: usize| run >= 4 || (run == rest && run >= 2 && run % 2 == 0);
    let ascii_set = |c: char| if (c as u32) < 32 { CodeSet::A } else { CodeSet::B };

    let lead = chars.iter().take_while(|&&c| c == FNC1).count();
    let mut set = if use_c(digit_run(&chars[lead..]), chars.len() - lead) {
        CodeSet::C
    } else {
        chars.iter().find(|&&c| c != FNC1).map_or(CodeSet::B, |&c| ascii_set(c))
    };
    let mut res = vec![set.start()];

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == FNC1 {
            res.push(FNC1_VALUE);
            i += 1;
            continue;
        }
        if set == CodeSet::C {
            if digit_run(&chars[i..]) >= 2 {
                let pair = chars[i].to_digit(10).unwrap_or(0) * 10 + chars[i + 1].to_digit(10).unwrap_or(0);
                res.push(pair as u8);
                i += 2;
                continue;
            }
            set = ascii_set(c);
            res.push(set.switch());
        }
        let run = digit_run(&chars[i..]);
        if use_c(run, chars.len() - i) && run % 2 == 0 {
            set = CodeSet::C;
            res.push(set.switch());
            continue;
        }
        let needed = ascii_set(c);
        if (needed == CodeSet::A && set == CodeSet::B) || ((c as u32) >= 96 && set == CodeSet::A) {
            set = if set == CodeSet::A { CodeSet::B } else { CodeSet::A };
            res.push(set.switch());
        }
        res.push(ascii_value(c, set));
        i += 1;
    }
    res
}

fn ascii_value(c: char, set: CodeSet) -> u8 {
    let c = c as u8;
    match (set, c) {
        (CodeSet::A, 0..=31) => c + 64,
        _ => c - 32,
    }
}

#[cfg(test)]
mod code128_tests {
    use test_case::test_case;

    use super::{checksum, encode, encode_gs1, symbol_values, FNC1};
    use crate::common::error::BarcodeError;

    #[test_case("PJJ123C", &[104, 48, 42, 42, 17, 18, 19, 35])]
    #[test_case("1234", &[105, 12, 34])]
    #[test_case("12", &[105, 12])]
    #[test_case("123", &[104, 17, 18, 19])]
    #[test_case("A12345", &[104, 33, 17, 99, 23, 45])]
    #[test_case("1234A", &[105, 12, 34, 100, 33])]
    #[test_case("a\tb", &[104, 65, 101, 73, 100, 66])]
    #[test_case("\u{f1}0101", &[105, 102, 1, 1])]
    #[test_case("\u{f1}AB", &[104, 102, 33, 34])]
    fn test_symbol_values(data: &str, exp: &[u8]) {
        assert_eq!(symbol_values(data), exp);
    }

    #[test]
    fn test_checksum() {
        // Start B, P J J 1 2 3 C
        assert_eq!(checksum(&[104, 48, 42, 42, 17, 18, 19, 35]), 55);
    }

    #[test]
    fn test_encode_width() {
        let code = encode("PJJ123C", None).unwrap();
        // Start, 7 data, checksum, stop
        assert_eq!(code.bars.len(), 11 * 9 + 13);
        assert_eq!(code.checksum.as_deref(), Some("55"));
        assert_eq!(code.text, "PJJ123C");
    }

    #[test]
    fn test_gs1() {
        let code = encode_gs1("0101234567890128", None).unwrap();
        assert_eq!(code.code, format!("{FNC1}0101234567890128"));
        assert_eq!(code.text, "0101234567890128");
        // Start C, FNC1, 8 pairs, checksum, stop
        assert_eq!(code.bars.len(), 11 * 11 + 13);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(encode("aéb", None), Err(BarcodeError::AlphabetViolation { ch: 'é', pos: 1, .. })));
        assert!(matches!(encode("abc", Some(false)), Err(BarcodeError::ChecksumConflict { .. })));
        assert!(matches!(encode("", None), Err(BarcodeError::EmptyData)));
    }
}
