use super::color::Rgba;
use super::colormap::ColorMap;
use crate::common::error::{BarcodeError, BarcodeResult};
use crate::common::module::{Module, ModuleMatrix};

// Dimensions
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub border: usize,
}

pub fn compute_dimensions(
    matrix: &ModuleMatrix,
    scale: f64,
    border: Option<usize>,
) -> BarcodeResult<Dimensions> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(BarcodeError::InvalidGeometry(format!("scale must be positive, got {scale}")));
    }
    let border = border.unwrap_or(matrix.quiet_zone());
    let (w, h) = canvas_size(matrix, border);
    Ok(Dimensions { width: w as f64 * scale, height: h as f64 * scale, border })
}

/// Width and height in modules, quiet zone included.
pub fn canvas_size(matrix: &ModuleMatrix, border: usize) -> (usize, usize) {
    (matrix.width() + 2 * border, matrix.rendered_height() + 2 * border)
}

#[cfg(test)]
mod dimension_tests {
    use test_case::test_case;

    use super::compute_dimensions;
    use crate::builder::QRBuilder;
    use crate::common::error::BarcodeError;
    use crate::common::metadata::{ECLevel, Version};

    #[test_case(Version::Normal(1), 1.0, None, 29.0)]
    #[test_case(Version::Normal(1), 2.0, None, 58.0)]
    #[test_case(Version::Normal(1), 1.0, Some(0), 21.0)]
    #[test_case(Version::Micro(2), 1.0, None, 17.0)]
    #[test_case(Version::Micro(2), 1.5, Some(1), 22.5)]
    fn test_qr_dimensions(ver: Version, scale: f64, border: Option<usize>, exp: f64) {
        let qr = QRBuilder::new(b"1").version(ver).ec_level(ECLevel::L).build().unwrap();
        let dims = compute_dimensions(&qr.to_matrix(), scale, border).unwrap();
        assert_eq!(dims.width, exp);
        assert_eq!(dims.height, exp);
    }

    #[test_case(0.0)]
    #[test_case(-1.0)]
    #[test_case(f64::NAN)]
    #[test_case(f64::INFINITY)]
    fn test_invalid_scale(scale: f64) {
        let qr = QRBuilder::new(b"1").build().unwrap();
        let res = compute_dimensions(&qr.to_matrix(), scale, None);
        assert!(matches!(res, Err(BarcodeError::InvalidGeometry(_))));
    }
}

// Line segments
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Axis {
    Row,
    Column,
}

/// Single colored run along a row or column of the bordered canvas.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LineSegment {
    pub color: Option<Rgba>,
    pub axis: Axis,
    pub index: usize,
    pub start: usize,
    pub len: usize,
}

impl LineSegment {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Runs along rows for 2D symbols and along columns for linear ones. In
/// multicolor mode every canvas cell is covered, otherwise only dark runs of
/// the symbol are emitted.
pub fn to_line_segments(matrix: &ModuleMatrix, colormap: &ColorMap, border: usize) -> Vec<LineSegment> {
    let multicolor = colormap.is_multicolor(matrix);
    let (axis, lines) = if matrix.is_linear() {
        (Axis::Column, canvas_columns(matrix, border))
    } else {
        (Axis::Row, canvas_rows(matrix, border))
    };
    let mut res = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        let mut start = 0;
        while start < line.len() {
            let key = |m: Module| (!multicolor && m.is_dark(), colormap.color(m));
            let run_key = key(line[start]);
            let len = line[start..].iter().take_while(|&&m| key(m) == run_key).count();
            if multicolor || line[start].is_dark() {
                res.push(LineSegment { color: run_key.1, axis, index, start, len });
            }
            start += len;
        }
    }
    res
}

fn canvas_rows(matrix: &ModuleMatrix, border: usize) -> Vec<Vec<Module>> {
    let (w, _) = canvas_size(matrix, border);
    let blank = vec![Module::QuietZone; w];
    let mut res = vec![blank.clone(); border];
    for row in matrix.rows() {
        let mut line = vec![Module::QuietZone; border];
        line.extend_from_slice(row);
        line.resize(w, Module::QuietZone);
        res.push(line);
    }
    res.extend(std::iter::repeat(blank).take(border));
    res
}

fn canvas_columns(matrix: &ModuleMatrix, border: usize) -> Vec<Vec<Module>> {
    let (_, h) = canvas_size(matrix, border);
    let bar_height = matrix.rendered_height();
    let blank = vec![Module::QuietZone; h];
    let mut res = vec![blank.clone(); border];
    for c in 0..matrix.width() {
        let mut line = vec![Module::QuietZone; border];
        line.resize(border + bar_height, matrix.get(0, c));
        line.resize(h, Module::QuietZone);
        res.push(line);
    }
    res.extend(std::iter::repeat(blank).take(border));
    res
}
