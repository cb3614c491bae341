use std::collections::{BTreeSet, HashMap};

use super::color::Rgba;
use crate::common::module::{Color, Module, ModuleMatrix};

// Color map
//------------------------------------------------------------------------------

/// Color per module role. `None` is transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    dark: Option<Rgba>,
    light: Option<Rgba>,
    roles: HashMap<Module, Option<Rgba>>,
}

impl Default for ColorMap {
    fn default() -> Self {
        ColorMapBuilder::new().build()
    }
}

impl ColorMap {
    pub fn builder() -> ColorMapBuilder {
        ColorMapBuilder::new()
    }

    pub fn dark(&self) -> Option<Rgba> {
        self.dark
    }

    pub fn light(&self) -> Option<Rgba> {
        self.light
    }

    pub fn color(&self, module: Module) -> Option<Rgba> {
        match self.roles.get(&module) {
            Some(&clr) => clr,
            None => module.select(self.dark, self.light),
        }
    }

    /// A symbol is multicolor once its dark roles or its light roles no longer
    /// share a single color.
    pub fn is_multicolor(&self, matrix: &ModuleMatrix) -> bool {
        let roles = matrix.roles();
        let colors_of = |clr: Color| {
            roles.iter().filter(|m| ***m == clr).map(|&m| self.color(m)).collect::<BTreeSet<_>>()
        };
        colors_of(Color::Dark).len() > 1 || colors_of(Color::Light).len() > 1
    }
}

// Builder
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ColorMapBuilder {
    dark: Option<Rgba>,
    light: Option<Rgba>,
    roles: HashMap<Module, Option<Rgba>>,
}

impl Default for ColorMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorMapBuilder {
    pub fn new() -> Self {
        Self { dark: Some(Rgba::BLACK), light: None, roles: HashMap::new() }
    }

    pub fn dark(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.dark = clr.into();
        self
    }

    pub fn light(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.light = clr.into();
        self
    }

    /// Overrides the color of a single role.
    pub fn role(&mut self, module: Module, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.roles.insert(module, clr.into());
        self
    }

    pub fn finder_dark(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Finder(Color::Dark), clr)
    }

    pub fn finder_light(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Finder(Color::Light), clr)
    }

    pub fn data_dark(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Data(Color::Dark), clr)
    }

    pub fn data_light(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Data(Color::Light), clr)
    }

    pub fn version_dark(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Version(Color::Dark), clr)
    }

    pub fn version_light(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Version(Color::Light), clr)
    }

    pub fn format_dark(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Format(Color::Dark), clr)
    }

    pub fn format_light(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Format(Color::Light), clr)
    }

    pub fn alignment_dark(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Alignment(Color::Dark), clr)
    }

    pub fn alignment_light(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Alignment(Color::Light), clr)
    }

    pub fn timing_dark(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Timing(Color::Dark), clr)
    }

    pub fn timing_light(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Timing(Color::Light), clr)
    }

    pub fn separator(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Separator, clr)
    }

    pub fn dark_module(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::DarkModule, clr)
    }

    pub fn quiet_zone(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::QuietZone, clr)
    }

    /// Bars of linear symbols.
    pub fn bar(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Bar(Color::Dark), clr)
    }

    /// Spaces between bars of linear symbols.
    pub fn space(&mut self, clr: impl Into<Option<Rgba>>) -> &mut Self {
        self.role(Module::Bar(Color::Light), clr)
    }

    /// Fully transparent colors are stored as `None` and never drawn.
    pub fn build(&self) -> ColorMap {
        let visible = |clr: Option<Rgba>| clr.filter(|c| !c.is_transparent());
        ColorMap {
            dark: visible(self.dark),
            light: visible(self.light),
            roles: self.roles.iter().map(|(&m, &clr)| (m, visible(clr))).collect(),
        }
    }
}
