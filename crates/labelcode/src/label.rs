use std::fmt::Display;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EncoderError, DEFAULT_MISSING_MARKERS};

/// Integer code assigned to a label.
pub type Code = i64;

/// A categorical value read from a column.
///
/// Missing data gets its own variant instead of a float NaN, so labels can
/// be hashed and compared like any other key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Label<T> {
    Value(T),
    Missing,
}

impl<T> Label<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Label::Missing)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Label::Value(value) => Some(value),
            Label::Missing => None,
        }
    }
}

impl<T> From<Option<T>> for Label<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Label::Value(value),
            None => Label::Missing,
        }
    }
}

impl<T: Display> Display for Label<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Value(value) => write!(f, "{value}"),
            Label::Missing => write!(f, "NaN"),
        }
    }
}

// Stored as `null` for missing labels in mapping model files.
impl<T: Serialize> Serialize for Label<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Label<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Label::from)
    }
}

/// Element of an encoded (or partially encoded) column.
///
/// Encoding and decoding pass unknown elements through untouched, so a
/// transformed column may mix codes and labels.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell<T> {
    Label(Label<T>),
    Code(Code),
}

impl<T> From<Label<T>> for Cell<T> {
    fn from(label: Label<T>) -> Self {
        Cell::Label(label)
    }
}

impl<T> From<Code> for Cell<T> {
    fn from(code: Code) -> Self {
        Cell::Code(code)
    }
}

impl<T: Display> Display for Cell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Label(label) => write!(f, "{label}"),
            Cell::Code(code) => write!(f, "{code}"),
        }
    }
}

/// Raw strings that read as a missing value.
#[derive(Clone, Debug)]
pub struct MissingMarkers {
    markers: IndexSet<String>,
}

impl Default for MissingMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_MARKERS.iter().copied())
    }
}

impl MissingMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_missing(&self, raw: &str) -> bool {
        self.markers.contains(raw.trim())
    }

    pub fn read(&self, raw: &str) -> Label<String> {
        if self.is_missing(raw) {
            Label::Missing
        } else {
            Label::Value(raw.trim().to_string())
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }
}

/// Parses a code from text.
///
/// Integral floats such as `5.0` are accepted. Anything `markers` reads as
/// missing, and NaN itself, is rejected with [`EncoderError::InvalidValue`]
/// since missing values are encoded through `set_nan`.
pub fn parse_code(raw: &str, markers: &MissingMarkers) -> Result<Code, EncoderError> {
    let trimmed = raw.trim();
    if let Ok(code) = trimmed.parse::<Code>() {
        return Ok(code);
    }

    if markers.is_missing(trimmed) {
        return Err(missing_code_error());
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_nan() => Err(missing_code_error()),
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && value >= Code::MIN as f64
                && value <= Code::MAX as f64 =>
        {
            Ok(value as Code)
        }
        Ok(value) => Err(EncoderError::type_validation(
            "value",
            format!("{value} is not a whole number"),
        )),
        Err(_) => Err(EncoderError::type_validation(
            "value",
            format!("'{trimmed}' is not an integer or a float"),
        )),
    }
}

fn missing_code_error() -> EncoderError {
    EncoderError::InvalidValue(
        "NaN can not be used as a code. To encode missing values use set_nan()".to_string(),
    )
}

/// Parses a boolean flag such as `true`, `no` or `1`.
pub fn parse_flag(raw: &str) -> Result<bool, EncoderError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(EncoderError::type_validation(
            "flag",
            format!("'{other}' is not a boolean"),
        )),
    }
}
