use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::builder::QRBuilder;
use crate::common::codec::{Mode, Payload};
use crate::common::error::{BarcodeError, BarcodeResult};
use crate::common::mask::MaskPattern;
use crate::common::metadata::{ECLevel, Version};
use crate::common::module::ModuleMatrix;
use crate::linear;
use crate::render::{self, ColorMap, DataUriOptions, Dimensions, Format, SaveOptions, SvgOptions};

// Family
//------------------------------------------------------------------------------

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Family {
    Qr,
    MicroQr,
    Code39,
    Pzn,
    Code128,
    Gs1_128,
    Ean8,
    Ean13,
    Ean14,
    Jan,
    UpcA,
    Isbn13,
    Isbn10,
    Issn,
    Itf,
}

impl Family {
    pub const ALL: [Family; 15] = [
        Self::Qr,
        Self::MicroQr,
        Self::Code39,
        Self::Pzn,
        Self::Code128,
        Self::Gs1_128,
        Self::Ean8,
        Self::Ean13,
        Self::Ean14,
        Self::Jan,
        Self::UpcA,
        Self::Isbn13,
        Self::Isbn10,
        Self::Issn,
        Self::Itf,
    ];

    /// Case-insensitive lookup by any of the family's names.
    pub fn from_name(name: &str) -> BarcodeResult<Self> {
        let key = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.aliases().contains(&key.as_str()))
            .ok_or_else(|| BarcodeError::UnknownFamily(name.to_string()))
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Qr => &["qr", "qrcode"],
            Self::MicroQr => &["micro", "microqr", "micro_qr"],
            Self::Code39 => &["code39"],
            Self::Pzn => &["pzn"],
            Self::Code128 => &["code128"],
            Self::Gs1_128 => &["gs1_128"],
            Self::Ean8 => &["ean8"],
            Self::Ean13 => &["ean13", "ean"],
            Self::Ean14 => &["ean14", "gtin"],
            Self::Jan => &["jan"],
            Self::UpcA => &["upc", "upca"],
            Self::Isbn13 => &["isbn", "isbn13", "gs1"],
            Self::Isbn10 => &["isbn10"],
            Self::Issn => &["issn"],
            Self::Itf => &["itf"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Qr => "QR",
            Self::MicroQr => "Micro QR",
            Self::Code39 => "Code 39",
            Self::Pzn => "PZN",
            Self::Code128 => "Code 128",
            Self::Gs1_128 => "GS1-128",
            Self::Ean8 => "EAN-8",
            Self::Ean13 => "EAN-13",
            Self::Ean14 => "EAN-14",
            Self::Jan => "JAN",
            Self::UpcA => "UPC-A",
            Self::Isbn13 => "ISBN-13",
            Self::Isbn10 => "ISBN-10",
            Self::Issn => "ISSN",
            Self::Itf => "ITF",
        }
    }

    pub fn is_linear(self) -> bool {
        !matches!(self, Self::Qr | Self::MicroQr)
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = BarcodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

// Metadata
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMetadata {
    pub family: Family,
    /// QR version, `None` for linear symbols.
    pub version: Option<Version>,
    pub ec_level: Option<ECLevel>,
    pub mask: Option<MaskPattern>,
    pub mode: Option<Mode>,
    pub checksum: Option<String>,
    /// Payload as encoded, check characters included.
    pub code: String,
    /// Human readable line.
    pub text: String,
}

impl SymbolMetadata {
    pub(crate) fn linear(family: Family, code: String, checksum: Option<String>, text: String) -> Self {
        Self { family, version: None, ec_level: None, mask: None, mode: None, checksum, code, text }
    }
}

// Options
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Minimum error correction level, L when unset. Boosting may raise it.
    pub ec_level: Option<ECLevel>,
    pub version: Option<usize>,
    pub boost_error: bool,
    pub mask: Option<u8>,
    pub mode: Option<Mode>,
    pub eci: bool,
    /// Family default when unset. QR symbols reject any value.
    pub add_checksum: Option<bool>,
    /// Height of linear symbols in modules.
    pub bar_height: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ec_level: None,
            version: None,
            boost_error: true,
            mask: None,
            mode: None,
            eci: false,
            add_checksum: None,
            bar_height: linear::DEFAULT_BAR_HEIGHT,
        }
    }
}

// Symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    matrix: ModuleMatrix,
    metadata: SymbolMetadata,
}

impl Symbol {
    pub fn matrix(&self) -> &ModuleMatrix {
        &self.matrix
    }

    pub fn metadata(&self) -> &SymbolMetadata {
        &self.metadata
    }

    pub fn family(&self) -> Family {
        self.metadata.family
    }

    pub fn default_border(&self) -> usize {
        self.matrix.quiet_zone()
    }

    pub fn dimensions(&self, scale: f64, border: Option<usize>) -> BarcodeResult<Dimensions> {
        render::compute_dimensions(&self.matrix, scale, border)
    }

    pub fn to_svg(&self, colormap: &ColorMap, opts: &SvgOptions) -> BarcodeResult<String> {
        render::serialize(&self.matrix, colormap, opts)
    }

    pub fn save(&self, path: impl AsRef<Path>, kind: Option<&str>, opts: &SaveOptions) -> BarcodeResult<()> {
        render::save(self, path, kind, opts)
    }

    pub fn write_to<W: Write>(&self, out: W, format: Format, opts: &SaveOptions) -> BarcodeResult<()> {
        render::write_to(self, out, format, opts)
    }

    pub fn as_data_uri(&self, opts: &DataUriOptions) -> BarcodeResult<String> {
        render::as_data_uri(self, opts)
    }
}

// Factory
//------------------------------------------------------------------------------

/// Encoder bound to a single family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolFactory {
    family: Family,
}

impl SymbolFactory {
    pub fn new(family: Family) -> Self {
        Self { family }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn encode(&self, data: &str, opts: &EncodeOptions) -> BarcodeResult<Symbol> {
        self.encode_bytes(data.as_bytes(), opts)
    }

    /// Linear families need UTF-8 text, QR families take any bytes.
    pub fn encode_bytes(&self, data: &[u8], opts: &EncodeOptions) -> BarcodeResult<Symbol> {
        let (matrix, metadata) = match self.family {
            Family::Qr => encode_qr(data, false, opts)?,
            Family::MicroQr => encode_qr(data, true, opts)?,
            family => {
                let text = std::str::from_utf8(data).map_err(|e| BarcodeError::InvalidPayload {
                    family: family.name(),
                    reason: e.to_string(),
                })?;
                linear::encode(family, text, opts.add_checksum, opts.bar_height)?
            }
        };
        Ok(Symbol { matrix, metadata })
    }
}

fn encode_qr(data: &[u8], micro: bool, opts: &EncodeOptions) -> BarcodeResult<(ModuleMatrix, SymbolMetadata)> {
    let family = if micro { Family::MicroQr } else { Family::Qr };
    if opts.add_checksum.is_some() {
        return Err(BarcodeError::ChecksumConflict {
            family: family.name(),
            reason: "error correction replaces check digits",
        });
    }
    if data.is_empty() {
        return Err(BarcodeError::EmptyData);
    }

    let mut builder = QRBuilder::new(data);
    builder.micro(micro).boost_error(opts.boost_error).eci(opts.eci);
    if let Some(ecl) = opts.ec_level {
        builder.ec_level(ecl);
    }
    if let Some(v) = opts.version {
        builder.version(Version::new(v, micro)?);
    }
    if let Some(m) = opts.mask {
        builder.mask(MaskPattern::new(m)?);
    }
    if let Some(mode) = opts.mode {
        builder.mode(mode);
    }
    let qr = builder.build()?;
    let mode = Payload::new(data, opts.mode, opts.eci)?.mode();

    let text = String::from_utf8_lossy(data).into_owned();
    let metadata = SymbolMetadata {
        family,
        version: Some(qr.version()),
        ec_level: Some(qr.ec_level()),
        mask: qr.mask(),
        mode: Some(mode),
        checksum: None,
        code: text.clone(),
        text,
    };
    debug!("Encoded {family} symbol, version {}", qr.version());
    Ok((qr.to_matrix(), metadata))
}

// Entry points
//------------------------------------------------------------------------------

/// Factory for the family called `name`, matched case-insensitively.
pub fn get(name: &str) -> BarcodeResult<SymbolFactory> {
    Family::from_name(name).map(SymbolFactory::new)
}

pub fn make(name: &str, data: &str, opts: &EncodeOptions) -> BarcodeResult<Symbol> {
    get(name)?.encode(data, opts)
}

#[cfg(test)]
mod symbol_tests {
    use test_case::test_case;

    use super::{get, make, EncodeOptions, Family};
    use crate::common::error::BarcodeError;
    use crate::common::metadata::{ECLevel, Version};

    #[test_case("QR", Family::Qr)]
    #[test_case("micro_qr", Family::MicroQr)]
    #[test_case("EAN", Family::Ean13)]
    #[test_case("gs1", Family::Isbn13)]
    #[test_case("GS1_128", Family::Gs1_128)]
    #[test_case("UpcA", Family::UpcA)]
    #[test_case("GTIN", Family::Ean14)]
    #[test_case("ean14", Family::Ean14)]
    fn test_family_lookup(name: &str, exp: Family) {
        assert_eq!(get(name).unwrap().family(), exp);
    }

    #[test]
    fn test_unknown_family() {
        assert!(matches!(get("ean15"), Err(BarcodeError::UnknownFamily(_))));
        assert!(matches!(make("nope", "1", &EncodeOptions::default()), Err(BarcodeError::UnknownFamily(_))));
    }

    #[test]
    fn test_aliases_are_unique() {
        let mut names = Family::ALL.iter().flat_map(|f| f.aliases().iter()).collect::<Vec<_>>();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_qr_metadata() {
        let symbol = make("qr", "HELLO WORLD", &EncodeOptions::default()).unwrap();
        let meta = symbol.metadata();
        assert_eq!(meta.version, Some(Version::Normal(1)));
        assert_eq!(meta.ec_level, Some(ECLevel::Q));
        assert_eq!(meta.mode.map(|m| m.name()), Some("alphanumeric"));
        assert_eq!(meta.text, "HELLO WORLD");
        assert_eq!(symbol.default_border(), 4);
        assert_eq!(symbol.matrix().width(), 21);
    }

    #[test]
    fn test_qr_default_level() {
        let symbol = make("qr", "abcdefghijklmnop", &EncodeOptions::default()).unwrap();
        assert_eq!(symbol.metadata().version, Some(Version::Normal(1)));
        assert_eq!(symbol.metadata().ec_level, Some(ECLevel::L));
        let symbol = make("micro", "12345", &EncodeOptions::default()).unwrap();
        assert_eq!(symbol.metadata().version, Some(Version::Micro(1)));
    }

    #[test]
    fn test_micro_qr() {
        let opts = EncodeOptions { ec_level: Some(ECLevel::L), ..Default::default() };
        let symbol = make("micro", "12345", &opts).unwrap();
        assert_eq!(symbol.metadata().version, Some(Version::Micro(1)));
        assert_eq!(symbol.default_border(), 2);
    }

    #[test]
    fn test_qr_options() {
        let opts = EncodeOptions { version: Some(41), ..Default::default() };
        assert!(matches!(make("qr", "1", &opts), Err(BarcodeError::InvalidVersion)));
        let opts = EncodeOptions { add_checksum: Some(true), ..Default::default() };
        assert!(matches!(make("qr", "1", &opts), Err(BarcodeError::ChecksumConflict { .. })));
        let opts = EncodeOptions { mask: Some(3), version: Some(5), ..Default::default() };
        let symbol = make("qr", "1", &opts).unwrap();
        assert_eq!(symbol.metadata().mask.map(|m| *m), Some(3));
        assert_eq!(symbol.metadata().version, Some(Version::Normal(5)));
        assert!(matches!(make("qr", "", &EncodeOptions::default()), Err(BarcodeError::EmptyData)));
    }

    #[test]
    fn test_linear_symbol() {
        let opts = EncodeOptions { bar_height: 20, ..Default::default() };
        let symbol = make("code39", "abc", &opts).unwrap();
        assert_eq!(symbol.metadata().code, "ABCX");
        assert_eq!(symbol.metadata().version, None);
        assert_eq!(symbol.matrix().rendered_height(), 20);
        assert_eq!(symbol.default_border(), 10);
    }

    #[test]
    fn test_encode_bytes_requires_utf8_for_linear() {
        let res = get("code128").unwrap().encode_bytes(&[0xff, 0xfe], &EncodeOptions::default());
        assert!(matches!(res, Err(BarcodeError::InvalidPayload { .. })));
        assert!(get("qr").unwrap().encode_bytes(&[0xff, 0xfe], &EncodeOptions::default()).is_ok());
    }
}
