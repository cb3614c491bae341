use std::fmt::{self, Write};

use encoding_rs::Encoding;
use tracing::debug;

use super::color::Rgba;
use super::colormap::ColorMap;
use super::geometry::{canvas_size, compute_dimensions, to_line_segments, Axis, LineSegment};
use crate::common::error::{BarcodeError, BarcodeResult};
use crate::common::module::{Module, ModuleMatrix};

// Options
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Size of a single module.
    pub scale: f64,
    /// Quiet zone in modules, the family's default when unset.
    pub border: Option<usize>,
    pub xmldecl: bool,
    pub svgns: bool,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub svgid: Option<String>,
    pub svgclass: Option<String>,
    pub lineclass: Option<String>,
    /// Drops width and height in favour of a viewBox.
    pub omitsize: bool,
    pub unit: Option<String>,
    /// Document encoding, `None` omits it from the XML declaration and writes
    /// UTF-8.
    pub encoding: Option<String>,
    pub svgversion: Option<f64>,
    pub nl: bool,
    pub draw_transparent: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            border: None,
            xmldecl: true,
            svgns: true,
            title: None,
            desc: None,
            svgid: None,
            svgclass: Some("qrbar".to_string()),
            lineclass: Some("qrline".to_string()),
            omitsize: false,
            unit: None,
            encoding: Some("utf-8".to_string()),
            svgversion: None,
            nl: true,
            draw_transparent: false,
        }
    }
}

impl SvgOptions {
    /// Encoding the document bytes are written in. Labels of encodings
    /// `encoding_rs` only decodes, such as UTF-16, resolve to UTF-8.
    pub fn resolve_encoding(&self) -> BarcodeResult<&'static Encoding> {
        match &self.encoding {
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .map(Encoding::output_encoding)
                .ok_or_else(|| BarcodeError::UnknownEncoding(label.clone())),
            None => Ok(encoding_rs::UTF_8),
        }
    }

    /// Lower case name of the resolved encoding, as written to the XML
    /// declaration and the data URI charset.
    pub fn encoding_name(&self) -> BarcodeResult<String> {
        Ok(self.resolve_encoding()?.name().to_ascii_lowercase())
    }

    fn allow_css3_colors(&self) -> bool {
        self.svgversion.is_some_and(|v| v >= 2.0)
    }
}

// Serializer
//------------------------------------------------------------------------------

// Relative moves of the paths of one color
struct PathData {
    color: Option<Rgba>,
    moves: String,
    end: (f64, f64),
}

pub fn serialize(matrix: &ModuleMatrix, colormap: &ColorMap, opts: &SvgOptions) -> BarcodeResult<String> {
    let dims = compute_dimensions(matrix, opts.scale, opts.border)?;
    let unit = opts.unit.as_deref().unwrap_or("");
    if !unit.is_empty() && opts.omitsize {
        return Err(BarcodeError::InvalidGeometry(format!(
            "unit {unit:?} has no effect when the size is omitted"
        )));
    }
    let encoding = opts.encoding_name()?;

    let multicolor = colormap.is_multicolor(matrix);
    let background = colormap.color(Module::QuietZone).filter(|_| !multicolor && !opts.draw_transparent);
    let need_group = opts.scale != 1.0 && (background.is_some() || multicolor);
    debug!(
        "Serializing {}x{} matrix, multicolor: {multicolor}, background: {}",
        matrix.width(),
        matrix.rendered_height(),
        background.is_some()
    );

    let mut paths = build_path_data(&to_line_segments(matrix, colormap, dims.border))?;
    let (canvas_w, canvas_h) = canvas_size(matrix, dims.border);
    if let Some(clr) = background {
        let bg = PathData { color: Some(clr), moves: String::new(), end: (0.0, 0.0) };
        match paths.iter_mut().find(|p| p.color == Some(clr)) {
            Some(p) => *p = bg,
            None => paths.push(bg),
        }
    }
    if !opts.draw_transparent {
        paths.retain(|p| p.color.is_some());
    }

    let scale_info =
        if opts.scale != 1.0 { format!(" transform=\"scale({})\"", opts.scale) } else { String::new() };
    let mut elements = paths
        .iter()
        .map(|p| {
            let is_background = background.is_some() && p.color == background;
            let scale = if need_group { "" } else { scale_info.as_str() };
            path_element(p, is_background, scale, (canvas_w, canvas_h), opts)
        })
        .collect::<Result<Vec<_>, _>>()?;
    elements.sort_by_key(String::len);

    let mut svg = String::new();
    if opts.xmldecl {
        svg.push_str("<?xml version=\"1.0\"");
        if opts.encoding.is_some() {
            write!(svg, " encoding=\"{}\"", escape_attr(&encoding))?;
        }
        svg.push_str("?>\n");
    }
    svg.push_str("<svg");
    if opts.svgns {
        svg.push_str(" xmlns=\"http://www.w3.org/2000/svg\"");
    }
    if let Some(v) = opts.svgversion.filter(|&v| v < 2.0) {
        write!(svg, " version=\"{v:?}\"")?;
    }
    if !opts.omitsize {
        write!(svg, " width=\"{}{unit}\" height=\"{}{unit}\"", dims.width, dims.height)?;
    }
    if opts.omitsize || !unit.is_empty() {
        write!(svg, " viewBox=\"0 0 {} {}\"", dims.width, dims.height)?;
    }
    if let Some(id) = opts.svgid.as_deref().filter(|s| !s.is_empty()) {
        write!(svg, " id=\"{}\"", escape_attr(id))?;
    }
    if let Some(class) = opts.svgclass.as_deref().filter(|s| !s.is_empty()) {
        write!(svg, " class=\"{}\"", escape_attr(class))?;
    }
    svg.push('>');
    if let Some(title) = &opts.title {
        write!(svg, "<title>{}</title>", escape(title))?;
    }
    if let Some(desc) = &opts.desc {
        write!(svg, "<desc>{}</desc>", escape(desc))?;
    }
    if need_group {
        write!(svg, "<g{scale_info}>")?;
    }
    elements.iter().for_each(|e| svg.push_str(e));
    if need_group {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    if opts.nl {
        svg.push('\n');
    }
    Ok(svg)
}

/// Serialized document in the configured encoding.
pub fn serialize_bytes(matrix: &ModuleMatrix, colormap: &ColorMap, opts: &SvgOptions) -> BarcodeResult<Vec<u8>> {
    let svg = serialize(matrix, colormap, opts)?;
    let (bytes, _, _) = opts.resolve_encoding()?.encode(&svg);
    Ok(bytes.into_owned())
}

fn path_element(
    p: &PathData,
    is_background: bool,
    scale_info: &str,
    (canvas_w, canvas_h): (usize, usize),
    opts: &SvgOptions,
) -> Result<String, fmt::Error> {
    let (paint, class) = if is_background { ("fill", None) } else { ("stroke", opts.lineclass.as_deref()) };
    let mut path = String::from("<path");
    path.push_str(scale_info);
    if let Some(class) = class.filter(|c| !c.is_empty()) {
        write!(path, " class=\"{}\"", escape_attr(class))?;
    }
    if let Some(clr) = p.color {
        let (clr, opacity) = clr.to_webcolor(opts.allow_css3_colors());
        write!(path, " {paint}=\"{clr}\"")?;
        if let Some(opacity) = opacity {
            write!(path, " {paint}-opacity=\"{opacity}\"")?;
        }
    }
    if is_background {
        write!(path, " d=\"M0 0h{canvas_w}v{canvas_h}h-{canvas_w}z\"/>")?;
    } else {
        write!(path, " d=\"{}\"/>", p.moves)?;
    }
    Ok(path)
}

// One entry per color in order of first appearance. Each segment moves
// relative to the end of the previous segment of the same color
fn build_path_data(segments: &[LineSegment]) -> Result<Vec<PathData>, fmt::Error> {
    let mut res: Vec<PathData> = Vec::new();
    for seg in segments {
        let idx = match res.iter().position(|p| p.color == seg.color) {
            Some(i) => i,
            None => {
                res.push(PathData { color: seg.color, moves: String::new(), end: (0.0, 0.0) });
                res.len() - 1
            }
        };
        let path = &mut res[idx];
        let (x, y, end, dir) = match seg.axis {
            Axis::Row => {
                let (x, y) = (seg.start as f64, seg.index as f64 + 0.5);
                (x, y, (x + seg.len as f64, y), 'h')
            }
            Axis::Column => {
                let (x, y) = (seg.index as f64 + 0.5, seg.start as f64);
                (x, y, (x, y + seg.len as f64), 'v')
            }
        };
        let moveto = if path.moves.is_empty() { 'M' } else { 'm' };
        let (px, py) = path.end;
        write!(path.moves, "{moveto}{} {}{dir}{}", x - px, y - py, seg.len)?;
        path.end = end;
    }
    Ok(res)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape(text)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}
