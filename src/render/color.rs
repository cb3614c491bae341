use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::common::error::{BarcodeError, BarcodeResult};

// Rgba
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Shortest textual form accepted by SVG renderers. Translucent colors
    /// become `rgba()` when CSS3 colors are allowed, otherwise the alpha
    /// channel is returned separately as an opacity value.
    pub fn to_webcolor(self, allow_css3_colors: bool) -> (String, Option<String>) {
        if self == Self::BLACK {
            return ("#000".to_string(), None);
        }
        if self == Self::WHITE {
            return ("#fff".to_string(), None);
        }
        let opacity = (!self.is_opaque()).then(|| alpha_str(self.a));
        if let Some(alpha) = &opacity {
            if allow_css3_colors {
                return (format!("rgba({},{},{},{alpha})", self.r, self.g, self.b), None);
            }
        }
        let hx = self.to_hex();
        let b = hx.as_bytes();
        let hx = match hx.as_str() {
            "#d2b48c" => "tan".to_string(),
            "#ff0000" => "red".to_string(),
            _ if b[1] == b[2] && b[3] == b[4] && b[5] == b[6] => {
                format!("#{}{}{}", b[1] as char, b[3] as char, b[5] as char)
            }
            _ => hx,
        };
        (hx, opacity)
    }
}

impl From<(u8, u8, u8)> for Rgba {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, u8)> for Rgba {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self::new(r, g, b, a)
    }
}

impl Display for Rgba {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let (clr, opacity) = self.to_webcolor(true);
        debug_assert!(opacity.is_none());
        f.write_str(&clr)
    }
}

impl FromStr for Rgba {
    type Err = BarcodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BarcodeError::InvalidColor(s.to_string());
        let spec = s.trim().to_ascii_lowercase();

        if let Some(hex) = spec.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(args) = spec.strip_prefix("rgba(").or_else(|| spec.strip_prefix("rgb(")) {
            let args = args.strip_suffix(')').ok_or_else(invalid)?;
            return parse_functional(args, spec.starts_with("rgba(")).ok_or_else(invalid);
        }
        NAMED_COLORS
            .binary_search_by(|(name, _)| (*name).cmp(spec.as_str()))
            .map(|i| {
                let [r, g, b] = NAMED_COLORS[i].1;
                Self::rgb(r, g, b)
            })
            .map_err(|_| invalid())
    }
}

/// Parses a color, `None` for `transparent` and `none`.
pub fn parse_color(spec: &str) -> BarcodeResult<Option<Rgba>> {
    match spec.trim().to_ascii_lowercase().as_str() {
        "transparent" | "none" => Ok(None),
        _ => spec.parse().map(Some),
    }
}

// #rgb, #rgba, #rrggbb and #rrggbbaa
fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let channels = (0..expanded.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&expanded[i..i + 2], 16).ok())
        .collect::<Option<Vec<_>>>()?;
    let a = channels.get(3).copied().unwrap_or(255);
    Some(Rgba::new(channels[0], channels[1], channels[2], a))
}

// Arguments of rgb(r, g, b) or rgba(r, g, b, a), alpha in 0..=1
fn parse_functional(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts = args.split(',').map(str::trim).collect::<Vec<_>>();
    if parts.len() != if with_alpha { 4 } else { 3 } {
        return None;
    }
    let mut rgb = [0u8; 3];
    for (c, p) in rgb.iter_mut().zip(&parts) {
        *c = p.parse().ok()?;
    }
    let a = match parts.get(3) {
        Some(p) => {
            let a: f64 = p.parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            (a * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Rgba::new(rgb[0], rgb[1], rgb[2], a))
}

fn alpha_str(a: u8) -> String {
    match a {
        0 => "0.0".to_string(),
        16 => "0.0625".to_string(),
        32 => "0.125".to_string(),
        64 => "0.25".to_string(),
        128 => "0.5".to_string(),
        255 => "1.0".to_string(),
        _ => {
            let s = format!("{:.2}", a as f64 / 255.0);
            let s = s.trim_end_matches('0');
            if s.ends_with('.') {
                format!("{s}0")
            } else {
                s.to_string()
            }
        }
    }
}

#[cfg(test)]
mod color_tests {
    use test_case::test_case;

    use super::{alpha_str, parse_color, Rgba, NAMED_COLORS};
    use crate::common::error::BarcodeError;

    #[test_case("#000", Rgba::rgb(0, 0, 0))]
    #[test_case("#FFFFFF", Rgba::rgb(255, 255, 255))]
    #[test_case("#36c", Rgba::rgb(0x33, 0x66, 0xcc))]
    #[test_case("#36c8", Rgba::new(0x33, 0x66, 0xcc, 0x88))]
    #[test_case("#11223380", Rgba::new(0x11, 0x22, 0x33, 0x80))]
    #[test_case("DarkBlue", Rgba::rgb(0, 0, 139))]
    #[test_case("rgb(1, 2, 3)", Rgba::rgb(1, 2, 3))]
    #[test_case("rgba(1,2,3,0.5)", Rgba::new(1, 2, 3, 128))]
    fn test_parse(spec: &str, exp: Rgba) {
        assert_eq!(spec.parse::<Rgba>().unwrap(), exp);
    }

    #[test_case("#12")]
    #[test_case("#ggg")]
    #[test_case("rgb(1,2)")]
    #[test_case("rgb(1,2,300)")]
    #[test_case("rgba(1,2,3,2)")]
    #[test_case("blurple")]
    fn test_parse_invalid(spec: &str) {
        assert!(matches!(spec.parse::<Rgba>(), Err(BarcodeError::InvalidColor(_))));
    }

    #[test]
    fn test_parse_transparent() {
        assert_eq!(parse_color("transparent").unwrap(), None);
        assert_eq!(parse_color("None").unwrap(), None);
        assert_eq!(parse_color("white").unwrap(), Some(Rgba::WHITE));
    }

    #[test]
    fn test_named_colors_sorted() {
        assert!(NAMED_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test_case(Rgba::BLACK, true, "#000", None)]
    #[test_case(Rgba::WHITE, true, "#fff", None)]
    #[test_case(Rgba::rgb(255, 0, 0), true, "red", None)]
    #[test_case(Rgba::rgb(210, 180, 140), true, "tan", None)]
    #[test_case(Rgba::rgb(0x33, 0x66, 0xcc), true, "#36c", None)]
    #[test_case(Rgba::rgb(0x12, 0x34, 0x56), true, "#123456", None)]
    #[test_case(Rgba::new(0, 0, 0, 128), true, "rgba(0,0,0,0.5)", None)]
    #[test_case(Rgba::new(0, 0, 0, 128), false, "#000", Some("0.5"))]
    #[test_case(Rgba::new(255, 0, 0, 77), false, "red", Some("0.3"))]
    fn test_webcolor(clr: Rgba, css3: bool, exp: &str, opacity: Option<&str>) {
        let (c, o) = clr.to_webcolor(css3);
        assert_eq!(c, exp);
        assert_eq!(o.as_deref(), opacity);
    }

    #[test]
    fn test_alpha_str() {
        assert_eq!(alpha_str(64), "0.25");
        assert_eq!(alpha_str(1), "0.0");
        assert_eq!(alpha_str(200), "0.78");
    }
}

// Global constants
//------------------------------------------------------------------------------

// CSS3 color keywords, sorted by name
static NAMED_COLORS: [(&str, [u8; 3]); 147] = [
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];
