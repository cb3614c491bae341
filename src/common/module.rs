use std::collections::BTreeSet;
use std::ops::{Deref, Not};

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum Color {
    Dark,
    Light,
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl Color {
    pub fn select<T>(self, dark: T, light: T) -> T {
        match self {
            Self::Dark => dark,
            Self::Light => light,
        }
    }
}

// Module
//------------------------------------------------------------------------------

/// Role of a single cell in a symbol.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum Module {
    Empty,
    Finder(Color),
    Separator,
    Timing(Color),
    Alignment(Color),
    Format(Color),
    Version(Color),
    DarkModule,
    Data(Color),
    Bar(Color),
    QuietZone,
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            Self::Empty | Self::Separator | Self::QuietZone => &Color::Light,
            Self::DarkModule => &Color::Dark,
            Self::Finder(c)
            | Self::Timing(c)
            | Self::Alignment(c)
            | Self::Format(c)
            | Self::Version(c)
            | Self::Data(c)
            | Self::Bar(c) => c,
        }
    }
}

impl Module {
    pub fn is_dark(self) -> bool {
        *self == Color::Dark
    }
}

// Module matrix
//------------------------------------------------------------------------------

/// Finished grid of modules. Linear symbols are a single row of bars which is
/// rendered `bar_height` modules tall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    width: usize,
    height: usize,
    cells: Vec<Module>,
    quiet_zone: usize,
    bar_height: Option<usize>,
}

impl ModuleMatrix {
    pub(crate) fn new(width: usize, height: usize, cells: Vec<Module>, quiet_zone: usize) -> Self {
        debug_assert_eq!(cells.len(), width * height, "Cell count doesn't match dimensions");
        debug_assert!(!cells.contains(&Module::Empty), "Empty module found in finished matrix");
        Self { width, height, cells, quiet_zone, bar_height: None }
    }

    pub(crate) fn linear(bars: Vec<Module>, quiet_zone: usize, bar_height: usize) -> Self {
        let width = bars.len();
        Self { bar_height: Some(bar_height), ..Self::new(width, 1, bars, quiet_zone) }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the stored grid, 1 for linear symbols.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Height in modules once drawn.
    pub fn rendered_height(&self) -> usize {
        self.bar_height.unwrap_or(self.height)
    }

    pub fn quiet_zone(&self) -> usize {
        self.quiet_zone
    }

    pub fn is_linear(&self) -> bool {
        self.bar_height.is_some()
    }

    pub fn get(&self, r: usize, c: usize) -> Module {
        debug_assert!(r < self.height && c < self.width, "Index out of bounds: ({r}, {c})");
        self.cells[r * self.width + c]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Module]> {
        self.cells.chunks(self.width)
    }

    /// Distinct roles present, the quiet zone included.
    pub fn roles(&self) -> BTreeSet<Module> {
        let mut res: BTreeSet<Module> = self.cells.iter().copied().collect();
        res.insert(Module::QuietZone);
        res
    }

    pub fn count_dark_modules(&self) -> usize {
        self.cells.iter().filter(|m| m.is_dark()).count()
    }

    pub fn to_bits(&self) -> Vec<Vec<bool>> {
        self.rows().map(|r| r.iter().map(|m| m.is_dark()).collect()).collect()
    }
}

#[cfg(test)]
mod module_tests {
    use super::{Color, Module, ModuleMatrix};

    #[test]
    fn test_module_color() {
        assert_eq!(*Module::Finder(Color::Dark), Color::Dark);
        assert_eq!(*Module::Separator, Color::Light);
        assert_eq!(*Module::DarkModule, Color::Dark);
        assert_eq!(*Module::QuietZone, Color::Light);
        assert_eq!(!Color::Dark, Color::Light);
    }

    #[test]
    fn test_linear_matrix() {
        let bars = vec![Module::Bar(Color::Dark), Module::Bar(Color::Light), Module::Bar(Color::Dark)];
        let m = ModuleMatrix::linear(bars, 10, 50);
        assert!(m.is_linear());
        assert_eq!((m.width(), m.height(), m.rendered_height()), (3, 1, 50));
        assert_eq!(m.count_dark_modules(), 2);
        assert_eq!(m.roles().len(), 3);
    }
}
