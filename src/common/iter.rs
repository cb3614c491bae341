use super::metadata::Version;

// Iterator for placing data in encoding region of QR
//------------------------------------------------------------------------------

/// Zig-zag walk over column pairs from the bottom right corner, skipping the
/// vertical timing column. Yields every coordinate; callers skip the ones
/// already taken by function patterns.
pub struct EncRegionIter {
    r: i16,
    c: i16,
    width: i16,
    vert_timing_col: i16,
}

impl EncRegionIter {
    pub const fn new(version: Version) -> Self {
        let w = version.width() as i16;
        let vert_timing_col = match version {
            Version::Micro(_) => 0,
            Version::Normal(_) => 6,
        };
        Self { r: w - 1, c: w - 1, width: w, vert_timing_col }
    }
}

impl Iterator for EncRegionIter {
    type Item = (i16, i16);
    fn next(&mut self) -> Option<Self::Item> {
        if self.c < 0 {
            return None;
        }
        let adjusted_col = if self.c <= self.vert_timing_col { self.c + 1 } else { self.c };
        let res = (self.r, self.c);
        let col_type = (self.width - adjusted_col) % 4;
        match col_type {
            2 if self.r > 0 => {
                self.r -= 1;
                self.c += 1;
            }
            0 if self.r < self.width - 1 => {
                self.r += 1;
                self.c += 1;
            }
            0 | 2 if self.c == self.vert_timing_col + 1 => {
                self.c -= 2;
            }
            _ => {
                self.c -= 1;
            }
        }
        Some(res)
    }
}

#[cfg(test)]
mod iter_tests {
    use test_case::test_case;

    use super::EncRegionIter;
    use crate::builder::QRBuilder;
    use crate::common::metadata::{ECLevel, Version};
    use crate::common::module::Module;

    #[test]
    fn test_enc_region_iter_normal() {
        for v in 1..=40 {
            let version = Version::Normal(v);
            let qr = QRBuilder::new(b"Hello, world!")
                .version(version)
                .ec_level(ECLevel::L)
                .build()
                .unwrap();
            let data_modules = EncRegionIter::new(version)
                .filter(|(r, c)| matches!(qr.get(*r, *c), Module::Data(_)))
                .count();
            assert_eq!(data_modules >> 3, version.total_codewords());
            assert_eq!(data_modules & 7, version.remainder_bits());
        }
    }

    #[test_case(Version::Micro(1), 36)]
    #[test_case(Version::Micro(2), 80)]
    #[test_case(Version::Micro(3), 132)]
    #[test_case(Version::Micro(4), 192)]
    fn test_enc_region_iter_micro(version: Version, exp: usize) {
        let qr = QRBuilder::new(b"1").version(version).ec_level(ECLevel::L).build().unwrap();
        let data_modules = EncRegionIter::new(version)
            .filter(|(r, c)| matches!(qr.get(*r, *c), Module::Data(_)))
            .count();
        assert_eq!(data_modules, exp);
    }

    #[test]
    fn test_visits_every_module_once() {
        let version = Version::Normal(2);
        let w = version.width() as i16;
        let mut coords = EncRegionIter::new(version).collect::<Vec<_>>();
        let total = coords.len();
        coords.sort();
        coords.dedup();
        assert_eq!(coords.len(), total);
        // Every column but the vertical timing one
        assert_eq!(total, (w * (w - 1)) as usize);
    }
}
