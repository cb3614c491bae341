pub mod color;
pub mod colormap;
pub mod geometry;
pub mod output;
pub mod svg;

pub use color::{parse_color, Rgba};
pub use colormap::{ColorMap, ColorMapBuilder};
pub use geometry::{compute_dimensions, to_line_segments, Axis, Dimensions, LineSegment};
pub use output::{as_data_uri, save, write_to, DataUriOptions, Format, SaveOptions};
pub use svg::{serialize, serialize_bytes, SvgOptions};
