//! # qrbar
//!
//! A Rust library for encoding QR, Micro QR and linear barcodes and serializing
//! them as compact vector graphics. Symbols are drawn as a handful of
//! horizontal or vertical strokes per color, which keeps the SVG output small
//! enough to embed as a data URI.
//!
//! ## Features
//!
//! - **QR Code Generation**: Versions 1 to 40 and Micro QR M1 to M4 with automatic mode, version and mask selection
//! - **Linear Barcodes**: Code 39, Code 128, GS1-128, EAN-8, EAN-13, EAN-14, JAN, UPC-A, ISBN-10/13, ISSN, PZN and ITF
//! - **Checksums**: Check characters computed or verified per family
//! - **Colorful SVG**: Per-role colors, transparency, scaling and quiet zone control
//! - **Output**: SVG text, gzip compressed SVGZ files and `data:` URIs
//!
//! ## Quick Start
//!
//! ### QR Code as SVG
//!
//! ```rust
//! use qrbar::{make, ColorMap, EncodeOptions, SvgOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = make("qr", "Hello, World!", &EncodeOptions::default())?;
//! let svg = symbol.to_svg(&ColorMap::default(), &SvgOptions::default())?;
//! assert!(svg.starts_with("<?xml"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrbar::{ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Hello, World!")
//!     .version(Version::Normal(2))      // Smallest fitting version when not provided
//!     .ec_level(ECLevel::M)             // Minimum level, raised while the data still fits
//!     .mask(MaskPattern::new(3)?)       // Lowest penalty mask when not provided
//!     .build()?;
//!
//! let matrix = qr.to_matrix();
//! assert_eq!(matrix.width(), 25);
//! # Ok(())
//! # }
//! ```
//!
//! ### Colors and Files
//!
//! ```rust,no_run
//! use qrbar::{get, ColorMap, EncodeOptions, Rgba, SaveOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ean = get("ean13")?.encode("400638133393", &EncodeOptions::default())?;
//! let colormap = ColorMap::builder().dark("darkblue".parse::<Rgba>()?).light(Rgba::WHITE).build();
//! let opts = SaveOptions { colormap, ..SaveOptions::default() };
//! ean.save("ean.svgz", None, &opts)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Data URI
//!
//! ```rust
//! use qrbar::{make, DataUriOptions, EncodeOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = make("micro", "12345", &EncodeOptions::default())?;
//! let uri = symbol.as_data_uri(&DataUriOptions::default())?;
//! assert!(uri.starts_with("data:image/svg+xml;charset=utf-8,"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Families
//!
//! | Family | Names |
//! |---|---|
//! | QR | `qr`, `qrcode` |
//! | Micro QR | `micro`, `microqr`, `micro_qr` |
//! | Code 39 | `code39` |
//! | PZN | `pzn` |
//! | Code 128 | `code128` |
//! | GS1-128 | `gs1_128` |
//! | EAN-8 | `ean8` |
//! | EAN-13 | `ean13`, `ean` |
//! | EAN-14 | `ean14`, `gtin` |
//! | JAN | `jan` |
//! | UPC-A | `upc`, `upca` |
//! | ISBN-13 | `isbn`, `isbn13`, `gs1` |
//! | ISBN-10 | `isbn10` |
//! | ISSN | `issn` |
//! | ITF | `itf` |
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;
pub mod linear;
pub mod render;
pub mod symbol;

pub use builder::{QRBuilder, QR};
pub use common::codec::Mode;
pub use common::error::{BarcodeError, BarcodeResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};
pub use common::module::{Color, Module, ModuleMatrix};
pub use render::{
    as_data_uri, compute_dimensions, parse_color, save, serialize, to_line_segments, write_to, Axis,
    ColorMap, ColorMapBuilder, DataUriOptions, Dimensions, Format, LineSegment, Rgba, SaveOptions,
    SvgOptions,
};
pub use symbol::{get, make, EncodeOptions, Family, Symbol, SymbolFactory, SymbolMetadata};
