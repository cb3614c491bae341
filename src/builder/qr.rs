use crate::common::bit_utils::BitStream;
use crate::common::iter::EncRegionIter;
use crate::common::mask::MaskPattern;
use crate::common::metadata::*;
use crate::common::module::{Color, Module, ModuleMatrix};

#[derive(Debug, Clone)]
pub struct QR {
    grid: Vec<Module>,
    w: usize,
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

// QR type for builder
//------------------------------------------------------------------------------

impl QR {
    pub fn new(ver: Version, ecl: ECLevel) -> Self {
        debug_assert!(
            matches!(ver, Version::Micro(1..=4) | Version::Normal(1..=40)),
            "Invalid version"
        );

        let w = ver.width();
        Self { grid: vec![Module::Empty; w * w], w, ver, ecl, mask: None }
    }

    pub fn grid(&self) -> &[Module] {
        &self.grid
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|m| m.is_dark()).count()
    }

    pub fn to_matrix(&self) -> ModuleMatrix {
        ModuleMatrix::new(self.w, self.w, self.grid.clone(), self.ver.quiet_zone())
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let w = self.w as i16;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match self.get(i, j) {
                    Module::Empty => '.',
                    Module::Finder(clr) => clr.select('f', 'F'),
                    Module::Separator => 's',
                    Module::Timing(clr) => clr.select('t', 'T'),
                    Module::Alignment(clr) => clr.select('a', 'A'),
                    Module::Format(clr) => clr.select('m', 'M'),
                    Module::Version(clr) => clr.select('v', 'V'),
                    Module::DarkModule => 'x',
                    Module::Data(clr) => clr.select('d', 'D'),
                    Module::Bar(_) | Module::QuietZone => '?',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    fn coord_to_index(&self, r: i16, c: i16) -> usize {
        let w = self.w as i16;
        debug_assert!(-w <= r && r < w, "row should be greater than or equal to w");
        debug_assert!(-w <= c && c < w, "column should be greater than or equal to w");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as _
    }

    pub fn get(&self, r: i16, c: i16) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    pub fn get_mut(&mut self, r: i16, c: i16) -> &mut Module {
        let index = self.coord_to_index(r, c);
        &mut self.grid[index]
    }

    pub fn set(&mut self, r: i16, c: i16, module: Module) {
        *self.get_mut(r, c) = module;
    }
}


// Finder pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        match self.ver {
            Version::Micro(_) => {}
            Version::Normal(_) => {
                self.draw_finder_pattern_at(3, -4);
                self.draw_finder_pattern_at(-4, 3);
            }
        }
    }

    // Draws the 7x7 pattern and the separator on its inner sides
    fn draw_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_top, dr_bottom) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_left, dc_right) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_top..=dr_bottom {
            for j in dc_left..=dc_right {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (4 | -4, _) | (_, 4 | -4) => Module::Separator,
                        (3 | -3, _) | (_, 3 | -3) => Module::Finder(Color::Dark),
                        (2 | -2, _) | (_, 2 | -2) => Module::Finder(Color::Light),
                        _ => Module::Finder(Color::Dark),
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod finder_pattern_tests {
    use super::QR;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_finder_pattern_qr() {
        let mut qr = QR::new(Version::Normal(1), ECLevel::L);
        qr.draw_finder_patterns();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffs.....sfffffff\n\
             fFFFFFfs.....sfFFFFFf\n\
             fFfffFfs.....sfFfffFf\n\
             fFfffFfs.....sfFfffFf\n\
             fFfffFfs.....sfFfffFf\n\
             fFFFFFfs.....sfFFFFFf\n\
             fffffffs.....sfffffff\n\
             ssssssss.....ssssssss\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             ssssssss.............\n\
             fffffffs.............\n\
             fFFFFFfs.............\n\
             fFfffFfs.............\n\
             fFfffFfs.............\n\
             fFfffFfs.............\n\
             fFFFFFfs.............\n\
             fffffffs.............\n"
        );
    }
}

// Timing pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_timing_pattern(&mut self) {
        let w = self.w as i16;
        let (off, last) = match self.ver {
            Version::Micro(_) => (0, w - 1),
            Version::Normal(_) => (6, w - 9),
        };
        self.draw_line(off, 8, off, last);
        self.draw_line(8, off, last, off);
    }

    fn draw_line(&mut self, r1: i16, c1: i16, r2: i16, c2: i16) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        let module = |i: i16| Module::Timing(if i & 1 == 0 { Color::Dark } else { Color::Light });
        if r1 == r2 {
            for j in c1..=c2 {
                self.set(r1, j, module(j));
            }
        } else {
            for i in r1..=r2 {
                self.set(i, c1, module(i));
            }
        }
    }
}


// Alignment pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        for &r in &poses {
            for &c in &poses {
                self.draw_alignment_pattern_at(r, c)
            }
        }
    }

    fn draw_alignment_pattern_at(&mut self, r: i16, c: i16) {
        let w = self.w as i16;
        // Overlaps a finder pattern
        if (r == 6 && (c == 6 || c - w == -7)) || (r - w == -7 && c == 6) {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (-2 | 2, _) | (_, -2 | 2) | (0, 0) => Module::Alignment(Color::Dark),
                        _ => Module::Alignment(Color::Light),
                    },
                )
            }
        }
    }

    // Dark module above the bottom left finder, full QR only
    fn draw_dark_module(&mut self) {
        if let Version::Normal(_) = self.ver {
            self.set(-8, 8, Module::DarkModule);
        }
    }
}

#[cfg(test)]
mod alignment_pattern_tests {
    use super::QR;
    use crate::common::metadata::{ECLevel, Version};
    use crate::common::module::Module;

    #[test]
    fn test_alignment_pattern_1() {
        let mut qr = QR::new(Version::Normal(1), ECLevel::L);
        qr.draw_alignment_patterns();
        assert!(qr.grid().iter().all(|m| *m == Module::Empty));
    }

    #[test]
    fn test_alignment_pattern_3() {
        let mut qr = QR::new(Version::Normal(3), ECLevel::L);
        qr.draw_alignment_patterns();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n\
             ....................aaaaa....\n\
             ....................aAAAa....\n\
             ....................aAaAa....\n\
             ....................aAAAa....\n\
             ....................aaaaa....\n\
             .............................\n\
             .............................\n\
             .............................\n\
             .............................\n"
        );
    }

    #[test]
    fn test_alignment_pattern_count() {
        let mut qr = QR::new(Version::Normal(7), ECLevel::L);
        qr.draw_alignment_patterns();
        let centers = qr.grid().iter().filter(|m| matches!(m, Module::Alignment(_))).count() / 25;
        // 3x3 grid minus the three finder corners
        assert_eq!(centers, 6);
    }

    #[test]
    fn test_no_dark_module_in_micro() {
        let mut qr = QR::new(Version::Micro(4), ECLevel::L);
        qr.draw_dark_module();
        qr.draw_alignment_patterns();
        assert!(qr.grid().iter().all(|m| *m == Module::Empty));
        let mut qr = QR::new(Version::Normal(2), ECLevel::L);
        qr.draw_dark_module();
        assert_eq!(qr.get(17, 8), Module::DarkModule);
    }
}

// All function patterns
//------------------------------------------------------------------------------

impl QR {
    pub fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
        self.draw_dark_module();
    }
}

#[cfg(test)]
mod all_function_patterns_test {
    use super::QR;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_all_function_patterns_micro() {
        let mut qr = QR::new(Version::Micro(1), ECLevel::L);
        qr.draw_all_function_patterns();
        qr.reserve_format_area();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffstTt\n\
             fFFFFFfsm..\n\
             fFfffFfsm..\n\
             fFfffFfsm..\n\
             fFfffFfsm..\n\
             fFFFFFfsm..\n\
             fffffffsm..\n\
             ssssssssm..\n\
             tmmmmmmmm..\n\
             T..........\n\
             t..........\n"
        );
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl QR {
    fn reserve_format_area(&mut self) {
        self.draw_format_info((1 << FORMAT_INFO_BIT_LEN) - 1);
    }

    fn draw_format_info(&mut self, format_info: u32) {
        let (off, on) = (Module::Format(Color::Light), Module::Format(Color::Dark));
        match self.ver {
            Version::Micro(_) => {
                self.draw_number(format_info, FORMAT_INFO_BIT_LEN, off, on, &FORMAT_INFO_COORDS_MICRO);
            }
            Version::Normal(_) => {
                self.draw_number(
                    format_info,
                    FORMAT_INFO_BIT_LEN,
                    off,
                    on,
                    &FORMAT_INFO_COORDS_QR_MAIN,
                );
                self.draw_number(
                    format_info,
                    FORMAT_INFO_BIT_LEN,
                    off,
                    on,
                    &FORMAT_INFO_COORDS_QR_SIDE,
                );
            }
        }
    }

    fn draw_version_info(&mut self) {
        if let Version::Normal(7..=40) = self.ver {
            let ver_info = self.ver.info();
            let (bl, tr) = version_info_coords();
            let (off, on) = (Module::Version(Color::Light), Module::Version(Color::Dark));
            self.draw_number(ver_info, VERSION_INFO_BIT_LEN, off, on, &bl);
            self.draw_number(ver_info, VERSION_INFO_BIT_LEN, off, on, &tr);
        }
    }

    fn draw_number(
        &mut self,
        number: u32,
        bit_len: usize,
        off_clr: Module,
        on_clr: Module,
        coords: &[(i16, i16)],
    ) {
        let mut mask = 1 << (bit_len - 1);
        for (r, c) in coords {
            if number & mask == 0 {
                self.set(*r, *c, off_clr);
            } else {
                self.set(*r, *c, on_clr);
            }
            mask >>= 1;
        }
    }

    #[cfg(test)]
    fn read_number(&self, coords: &[(i16, i16)]) -> u32 {
        coords.iter().fold(0, |n, (r, c)| (n << 1) | self.get(*r, *c).is_dark() as u32)
    }
}


// Encoding region
//------------------------------------------------------------------------------

impl QR {
    pub fn draw_encoding_region(&mut self, payload: BitStream) {
        self.reserve_format_area();
        self.draw_version_info();
        self.draw_payload(payload);

        debug_assert!(!self.grid.contains(&Module::Empty), "Empty module found after drawing");
    }

    fn draw_payload(&mut self, payload: BitStream) {
        let mut coords = EncRegionIter::new(self.ver);
        for bit in payload {
            let module = Module::Data(if bit { Color::Dark } else { Color::Light });
            for (r, c) in coords.by_ref() {
                if matches!(self.get(r, c), Module::Empty) {
                    self.set(r, c, module);
                    break;
                }
            }
        }
        self.fill_remainder_bits(coords);
    }

    fn fill_remainder_bits(&mut self, coords: impl Iterator<Item = (i16, i16)>) {
        for (r, c) in coords {
            if matches!(self.get(r, c), Module::Empty) {
                self.set(r, c, Module::Data(Color::Light));
            }
        }
    }

    /// Masks the data modules, replacing any mask applied before, and writes
    /// the matching format info.
    pub fn apply_mask(&mut self, pattern: MaskPattern) {
        let prev = self.mask.replace(pattern).map(|m| m.mask_function(self.ver));
        let mask_fn = pattern.mask_function(self.ver);
        let w = self.w as i16;
        for r in 0..w {
            for c in 0..w {
                let flip = mask_fn(r, c) != prev.is_some_and(|f| f(r, c));
                if flip {
                    if let Module::Data(clr) = self.get(r, c) {
                        self.set(r, c, Module::Data(!clr))
                    }
                }
            }
        }
        let format_info = format_info(self.ver, self.ecl, *pattern);
        self.draw_format_info(format_info);
    }
}
