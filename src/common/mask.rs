use std::ops::Deref;

use tracing::trace;

use super::error::{BarcodeError, BarcodeResult};
use super::metadata::Version;
use super::module::Color;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    /// Mask pattern reference as written to the format info: 0 to 7 for full
    /// QR, 0 to 3 for Micro QR.
    pub fn new(pattern: u8) -> BarcodeResult<Self> {
        if pattern >= 8 {
            return Err(BarcodeError::InvalidMask(pattern));
        }
        Ok(Self(pattern))
    }

    pub fn validate(self, ver: Version) -> BarcodeResult<Self> {
        let count = Self::count(ver);
        if self.0 as usize >= count {
            return Err(BarcodeError::InvalidMask(self.0));
        }
        Ok(self)
    }

    pub fn count(ver: Version) -> usize {
        match ver {
            Version::Micro(_) => 4,
            Version::Normal(_) => 8,
        }
    }

    pub fn all(ver: Version) -> impl Iterator<Item = MaskPattern> {
        (0..Self::count(ver) as u8).map(Self)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (p & 1) + (p % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        ((p & 1) + (p % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (((r + c) as i32 & 1) + (p % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self, ver: Version) -> fn(i16, i16) -> bool {
        // Micro QR masks are a subset of the full QR ones
        let pattern = match ver {
            Version::Micro(_) => [1, 4, 6, 7][self.0 as usize & 3],
            Version::Normal(_) => self.0,
        };
        match pattern {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            _ => mask_functions::meadow,
        }
    }
}

// Mask selection
//------------------------------------------------------------------------------

pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let ver = qr.version();
    let scored = MaskPattern::all(ver).map(|m| {
        let mut candidate = qr.clone();
        candidate.apply_mask(m);
        let score = match ver {
            Version::Micro(_) => compute_micro_score(&candidate),
            Version::Normal(_) => compute_total_penalty(&candidate),
        };
        trace!("Mask {}: score {score}", *m);
        (m, score)
    });
    // Full QR minimizes the penalty, Micro QR maximizes its score. Ties keep
    // the lowest pattern
    let best = match ver {
        Version::Micro(_) => scored.fold(None, |best: Option<(MaskPattern, u32)>, (m, s)| {
            match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((m, s)),
            }
        }),
        Version::Normal(_) => scored.fold(None, |best: Option<(MaskPattern, u32)>, (m, s)| {
            match best {
                Some((_, bs)) if bs <= s => best,
                _ => Some((m, s)),
            }
        }),
    };
    let best_mask = best.map_or(MaskPattern(0), |(m, _)| m);
    qr.apply_mask(best_mask);
    best_mask
}

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let adj_pen = compute_adjacent_penalty(qr);
    let blk_pen = compute_block_penalty(qr);
    let fp_pen_h = compute_finder_pattern_penalty(qr, true);
    let fp_pen_v = compute_finder_pattern_penalty(qr, false);
    let bal_pen = compute_balance_penalty(qr);
    adj_pen + blk_pen + fp_pen_h + fp_pen_v + bal_pen
}

fn compute_adjacent_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    let mut cols = vec![(Color::Dark, 0); w as usize];
    for r in 0..w {
        let mut last = Color::Dark;
        let mut consec_row_len = 0;
        for (c, col) in cols.iter_mut().enumerate() {
            let clr = *qr.get(r, c as i16);
            if c == 0 || last != clr {
                last = clr;
                consec_row_len = 0;
            }
            consec_row_len += 1;
            pen += run_penalty(consec_row_len);
            if r == 0 || col.0 != clr {
                col.0 = clr;
                col.1 = 0;
            }
            col.1 += 1;
            pen += run_penalty(col.1);
        }
    }
    pen
}

// Incremental penalty as a run grows: 3 at length 5, then 1 per module
fn run_penalty(len: u32) -> u32 {
    match len {
        5 => 3,
        6.. => 1,
        _ => 0,
    }
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

fn compute_finder_pattern_penalty(qr: &QR, is_hor: bool) -> u32 {
    static PATTERN: [Color; 7] = [
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Dark,
        Color::Dark,
        Color::Light,
        Color::Dark,
    ];
    let mut pen = 0;
    let w = qr.width() as i16;
    for i in 0..w {
        let get = |j: i16| if is_hor { *qr.get(i, j) } else { *qr.get(j, i) };
        // Outside the symbol counts as light
        let is_light = |j: i16| j < 0 || j >= w || get(j) == Color::Light;
        for j in 0..w - 6 {
            if (j..j + 7).map(get).eq(PATTERN.iter().copied())
                && ((j - 4..j).all(is_light) || (j + 7..j + 11).all(is_light))
            {
                pen += 40;
            }
        }
    }
    pen
}

fn compute_balance_penalty(qr: &QR) -> u32 {
    let dark_cnt = qr.count_dark_modules();
    let w = qr.width();
    let percent = (dark_cnt * 100 / (w * w)) as i32;
    ((percent - 50).unsigned_abs() / 5) * 10
}

// Dark modules along the right and bottom edges, timing excluded
fn compute_micro_score(qr: &QR) -> u32 {
    let w = qr.width() as i16;
    let sum_right = (1..w).filter(|&r| qr.get(r, w - 1).is_dark()).count() as u32;
    let sum_bottom = (1..w).filter(|&c| qr.get(w - 1, c).is_dark()).count() as u32;
    if sum_right <= sum_bottom {
        sum_right * 16 + sum_bottom
    } else {
        sum_bottom * 16 + sum_right
    }
}

#[cfg(test)]
mod mask_tests {
    use test_case::test_case;

    use super::{apply_best_mask, compute_micro_score, run_penalty, MaskPattern};
    use crate::builder::QRBuilder;
    use crate::common::error::BarcodeError;
    use crate::common::metadata::Version;

    #[test]
    fn test_mask_validation() {
        assert!(MaskPattern::new(7).is_ok());
        assert!(matches!(MaskPattern::new(8), Err(BarcodeError::InvalidMask(8))));
        let m = MaskPattern::new(4).unwrap();
        assert!(m.validate(Version::Normal(1)).is_ok());
        assert!(matches!(m.validate(Version::Micro(2)), Err(BarcodeError::InvalidMask(4))));
    }

    #[test_case(0, 0, 0, true)]
    #[test_case(1, 1, 0, false)]
    #[test_case(2, 0, 3, true)]
    #[test_case(2, 3, 1, false)]
    #[test_case(4, 2, 0, false)]
    #[test_case(5, 2, 3, true)]
    fn test_mask_function(pattern: u8, r: i16, c: i16, exp: bool) {
        let m = MaskPattern::new(pattern).unwrap();
        assert_eq!(m.mask_function(Version::Normal(1))(r, c), exp);
    }

    #[test]
    fn test_micro_mask_mapping() {
        // Micro mask 0 is full QR pattern 1, rows alternate
        let f = MaskPattern::new(0).unwrap().mask_function(Version::Micro(1));
        assert!(f(0, 5));
        assert!(!f(1, 5));
    }

    #[test]
    fn test_run_penalty() {
        let total = |n| (1..=n).map(run_penalty).sum::<u32>();
        assert_eq!(total(4), 0);
        assert_eq!(total(5), 3);
        assert_eq!(total(8), 6);
    }

    #[test]
    fn test_best_mask_is_deterministic() {
        let build = || QRBuilder::new(b"Hello, world!").build().unwrap();
        let (a, b) = (build(), build());
        assert_eq!(a.mask(), b.mask());
        assert_eq!(a.to_debug_str(), b.to_debug_str());
    }

    #[test]
    fn test_micro_best_mask_maximizes_score() {
        let mut qr = QRBuilder::new(b"01234").micro(true).build().unwrap();
        let best = qr.mask().unwrap();
        let best_score = compute_micro_score(&qr);
        for m in MaskPattern::all(qr.version()) {
            let mut other = qr.clone();
            other.apply_mask(m);
            assert!(compute_micro_score(&other) <= best_score, "Mask {} beats {}", *m, *best);
        }
        assert_eq!(apply_best_mask(&mut qr), best);
    }
}
