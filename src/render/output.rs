use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use super::colormap::ColorMap;
use super::svg::{serialize, serialize_bytes, SvgOptions};
use crate::common::error::{BarcodeError, BarcodeResult};
use crate::symbol::Symbol;

// Format
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Format {
    Svg,
    Svgz,
}

impl Format {
    /// Format named by the extension of `path`.
    pub fn from_path(path: &Path) -> BarcodeResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        ext.parse()
    }
}

impl FromStr for Format {
    type Err = BarcodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "svgz" => Ok(Self::Svgz),
            _ => Err(BarcodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(match self {
            Self::Svg => "svg",
            Self::Svgz => "svgz",
        })
    }
}

// Options
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOptions {
    pub svg: SvgOptions,
    pub colormap: ColorMap,
    /// Gzip level for svgz, 0 to 9.
    pub compresslevel: u32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { svg: SvgOptions::default(), colormap: ColorMap::default(), compresslevel: 9 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataUriOptions {
    pub svg: SvgOptions,
    pub colormap: ColorMap,
    /// Leaves ` :/='` unescaped.
    pub encode_minimal: bool,
    pub omit_charset: bool,
}

impl Default for DataUriOptions {
    fn default() -> Self {
        Self {
            svg: SvgOptions { xmldecl: false, nl: false, ..SvgOptions::default() },
            colormap: ColorMap::default(),
            encode_minimal: false,
            omit_charset: false,
        }
    }
}

// Output
//------------------------------------------------------------------------------

/// Writes the symbol to `path`. The format is `kind` when given, else the
/// file extension.
pub fn save(symbol: &Symbol, path: impl AsRef<Path>, kind: Option<&str>, opts: &SaveOptions) -> BarcodeResult<()> {
    let path = path.as_ref();
    let format = match kind {
        Some(k) => k.parse()?,
        None => Format::from_path(path)?,
    };
    // Serialize before touching the file system
    let doc = serialize_bytes(symbol.matrix(), &opts.colormap, &opts.svg)?;
    debug!("Saving {} as {format} to {}", symbol.metadata().family, path.display());
    let file = File::create(path)?;
    write_document(&doc, BufWriter::new(file), format, opts.compresslevel)
}

pub fn write_to<W: Write>(symbol: &Symbol, out: W, format: Format, opts: &SaveOptions) -> BarcodeResult<()> {
    let doc = serialize_bytes(symbol.matrix(), &opts.colormap, &opts.svg)?;
    write_document(&doc, out, format, opts.compresslevel)
}

fn write_document<W: Write>(doc: &[u8], mut out: W, format: Format, compresslevel: u32) -> BarcodeResult<()> {
    match format {
        Format::Svg => {
            out.write_all(doc)?;
            out.flush()?;
        }
        Format::Svgz => {
            let mut gz = GzEncoder::new(out, Compression::new(compresslevel.min(9)));
            gz.write_all(doc)?;
            gz.finish()?.flush()?;
        }
    }
    Ok(())
}

pub fn as_data_uri(symbol: &Symbol, opts: &DataUriOptions) -> BarcodeResult<String> {
    let svg = serialize(symbol.matrix(), &opts.colormap, &opts.svg)?;
    let (bytes, _, _) = opts.svg.resolve_encoding()?.encode(&svg);
    let safe: &[u8] = if opts.encode_minimal { b" :/='" } else { b"" };
    let data = percent_encode(&single_quote_attrs(&bytes), safe);
    let charset = if opts.omit_charset { String::new() } else { format!(";charset={}", opts.svg.encoding_name()?) };
    Ok(format!("data:image/svg+xml{charset},{data}"))
}

// Rewrites attribute values `="…"` to `='…'`. Values holding a single quote
// keep their double quotes
fn single_quote_attrs(doc: &[u8]) -> Vec<u8> {
    let mut res = Vec::with_capacity(doc.len());
    let mut i = 0;
    while i < doc.len() {
        if doc[i] == b'=' && doc.get(i + 1) == Some(&b'"') {
            let close = doc[i + 2..].iter().position(|&b| b == b'"').map(|p| p + i + 2);
            if let Some(j) = close.filter(|&j| j > i + 2 && !doc[i + 2..j].contains(&b'\'')) {
                res.extend_from_slice(b"='");
                res.extend_from_slice(&doc[i + 2..j]);
                res.push(b'\'');
                i = j + 1;
                continue;
            }
        }
        res.push(doc[i]);
        i += 1;
    }
    res
}

fn percent_encode(data: &[u8], safe: &[u8]) -> String {
    let mut res = String::with_capacity(data.len() * 3);
    for &b in data {
        if b.is_ascii_alphanumeric() || b"_.-~".contains(&b) || safe.contains(&b) {
            res.push(b as char);
        } else {
            res.push_str(&format!("%{b:02X}"));
        }
    }
    res
}

#[cfg(test)]
mod output_tests {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use test_case::test_case;

    use super::{as_data_uri, percent_encode, single_quote_attrs, write_to, DataUriOptions, Format, SaveOptions};
    use crate::common::error::BarcodeError;
    use crate::symbol::{make, EncodeOptions};

    #[test_case("svg", Format::Svg)]
    #[test_case("SVG", Format::Svg)]
    #[test_case("svgz", Format::Svgz)]
    fn test_format_parse(kind: &str, exp: Format) {
        assert_eq!(kind.parse::<Format>().unwrap(), exp);
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!("png".parse::<Format>(), Err(BarcodeError::UnsupportedFormat(_))));
        assert!(matches!(
            Format::from_path(std::path::Path::new("code")),
            Err(BarcodeError::UnsupportedFormat(_))
        ));
        assert_eq!(Format::from_path(std::path::Path::new("a/b.SvgZ")).unwrap(), Format::Svgz);
    }

    #[test]
    fn test_single_quote_attrs() {
        assert_eq!(single_quote_attrs(br#"<a b="c" d="">"#), br#"<a b='c' d="">"#);
        assert_eq!(single_quote_attrs(br#"x="y"#), br#"x="y"#);
        assert_eq!(single_quote_attrs(br#"<a b="it's" c="d">"#), br#"<a b="it's" c='d'>"#);
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode(b"<a b='c'/>", b""), "%3Ca%20b%3D%27c%27%2F%3E");
        assert_eq!(percent_encode(b"<a b='c'/>", b" :/='"), "%3Ca b='c'/%3E");
    }

    #[test]
    fn test_data_uri() {
        let symbol = make("code39", "A", &EncodeOptions::default()).unwrap();
        let uri = as_data_uri(&symbol, &DataUriOptions::default()).unwrap();
        assert!(uri.starts_with("data:image/svg+xml;charset=utf-8,%3Csvg%20xmlns%3D%27http"));
        assert!(!uri.contains("%3F%3E"));
        assert!(uri.ends_with("%3C%2Fsvg%3E"));

        let opts = DataUriOptions { encode_minimal: true, omit_charset: true, ..Default::default() };
        let uri = as_data_uri(&symbol, &opts).unwrap();
        assert!(uri.starts_with("data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg'"));
    }

    #[test_case(Some("latin1"), ";charset=windows-1252,")]
    #[test_case(Some(" UTF8 "), ";charset=utf-8,")]
    #[test_case(Some("utf-16"), ";charset=utf-8,")]
    #[test_case(None, ";charset=utf-8,")]
    fn test_data_uri_charset(label: Option<&str>, exp: &str) {
        let symbol = make("code39", "A", &EncodeOptions::default()).unwrap();
        let mut opts = DataUriOptions::default();
        opts.svg.encoding = label.map(str::to_string);
        let uri = as_data_uri(&symbol, &opts).unwrap();
        assert!(uri.starts_with(&format!("data:image/svg+xml{exp}")), "{uri}");
    }

    #[test]
    fn test_data_uri_keeps_quoted_apostrophe() {
        let symbol = make("code39", "A", &EncodeOptions::default()).unwrap();
        let mut opts = DataUriOptions { encode_minimal: true, ..Default::default() };
        opts.svg.svgid = Some("it's".to_string());
        let uri = as_data_uri(&symbol, &opts).unwrap();
        assert!(uri.contains("id='it%26%2339%3Bs'"), "{uri}");
    }

    #[test]
    fn test_svgz_roundtrip() {
        let symbol = make("ean8", "5512345", &EncodeOptions::default()).unwrap();
        let opts = SaveOptions::default();
        let mut plain = Vec::new();
        write_to(&symbol, &mut plain, Format::Svg, &opts).unwrap();
        let mut packed = Vec::new();
        write_to(&symbol, &mut packed, Format::Svgz, &opts).unwrap();
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);
        let mut unpacked = Vec::new();
        GzDecoder::new(&packed[..]).read_to_end(&mut unpacked).unwrap();
        assert_eq!(unpacked, plain);
    }
}
