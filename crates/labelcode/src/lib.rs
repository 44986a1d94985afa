//! Label <-> integer code mappings for categorical columns.
//!
//! An [`Encoder`] derives a [`Mapping`] from the distinct values of a
//! [`Column`], then encodes and decodes columns with it. Missing values are
//! a dedicated [`Label::Missing`] variant and are encoded as
//! [`MISSING_CODE`] unless the encoder is told to ignore them.
pub mod column;
pub mod config;
pub mod encoder;
pub mod error;
pub mod label;
pub mod mapping;

pub use column::Column;
pub use encoder::{Encoder, Summary};
pub use error::EncoderError;
pub use label::{parse_code, parse_flag, Cell, Code, Label, MissingMarkers};
pub use mapping::Mapping;

/// Code reserved for missing values.
pub const MISSING_CODE: Code = 0;

/// Raw strings read as missing values unless configured otherwise.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &["", "NaN", "nan", "NA", "N/A", "null", "None"];

pub const CONFIG_FILE: &str = "labelcode.toml";
