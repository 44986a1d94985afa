use std::{fmt::Display, hash::Hash, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    column::Column,
    label::{Cell, Code, Label},
    mapping::Mapping,
    EncoderError, MISSING_CODE,
};

#[derive(Debug, Deserialize, Serialize)]
pub enum ModelVersion {
    Version1,
}

/// On-disk form of a fitted encoder.
#[derive(Deserialize, Serialize)]
pub struct EncoderModel<T> {
    version: ModelVersion,
    ignore_nan: bool,
    entries: Vec<(Label<T>, Code)>,
}

/// Builds, mutates and applies a label <-> code mapping for one column.
///
/// The mapping is absent until [`Encoder::mapping`] is called. Every
/// mutation afterwards goes through the bijective [`Mapping`], so the list
/// of known labels never drifts from the codes.
#[derive(Clone, Debug)]
pub struct Encoder<T: Eq + Hash> {
    series: Option<Column<Label<T>>>,
    dict: Option<Mapping<T>>,
    ignore_nan: bool,
}

impl<T: Eq + Hash> Default for Encoder<T> {
    fn default() -> Self {
        Self {
            series: None,
            dict: None,
            ignore_nan: false,
        }
    }
}

impl<T: Clone + Eq + Hash + Display> Encoder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing mapping, e.g. one read back from disk.
    pub fn from_mapping(mapping: Mapping<T>, ignore_nan: bool) -> Self {
        Self {
            series: None,
            dict: Some(mapping),
            ignore_nan,
        }
    }

    /// The column the current mapping was derived from.
    pub fn series(&self) -> Option<&Column<Label<T>>> {
        self.series.as_ref()
    }

    pub fn dict(&self) -> Option<&Mapping<T>> {
        self.dict.as_ref()
    }

    /// Known labels in mapping order, or `None` before the first mapping.
    pub fn labels(&self) -> Option<Vec<&Label<T>>> {
        self.dict.as_ref().map(|mapping| mapping.labels().collect())
    }

    pub fn ignores_nan(&self) -> bool {
        self.ignore_nan
    }

    /// Derives a mapping from the distinct values of `column`, extending
    /// `existing` when given.
    ///
    /// Labels already in `existing` keep their codes. New labels get
    /// sequential codes starting at `existing.len() + 1`, skipping codes the
    /// seed already uses. A missing value gets [`MISSING_CODE`] unless
    /// `ignore_nan` is set, in which case it stays unmapped.
    pub fn mapping(
        &mut self,
        column: &Column<Label<T>>,
        existing: Option<Mapping<T>>,
        ignore_nan: bool,
    ) -> Result<&Mapping<T>, EncoderError> {
        let mut mapping = existing.unwrap_or_default();
        let mut code = mapping.len() as Code + 1;

        for label in column.unique() {
            if mapping.contains_label(label) {
                continue;
            }

            if label.is_missing() {
                if ignore_nan {
                    continue;
                }
                if let Some(holder) = mapping.label_for(MISSING_CODE) {
                    return Err(EncoderError::InvalidValue(format!(
                        "code {MISSING_CODE} is reserved for missing values but is held by label {holder}"
                    )));
                }
                mapping.assign(Label::Missing, MISSING_CODE);
                continue;
            }

            while mapping.contains_code(code) {
                code += 1;
            }
            log::debug!("{}: label {label} -> {code}", column.name());
            mapping.assign(label.clone(), code);
            code += 1;
        }

        self.series = Some(column.clone());
        self.ignore_nan = ignore_nan;
        Ok(&*self.dict.insert(mapping))
    }

    /// Replaces labels found in `mapping` with their codes.
    pub fn encode(&self, column: &Column<Label<T>>, mapping: &Mapping<T>) -> Column<Cell<T>> {
        mapping.encode(column)
    }

    /// Replaces codes found in `mapping` with their labels.
    pub fn decode(&self, column: &Column<Cell<T>>, mapping: &Mapping<T>) -> Column<Cell<T>> {
        mapping.decode(column)
    }

    /// Whether the missing-value code is currently assigned.
    pub fn is_nan(&self) -> bool {
        self.dict
            .as_ref()
            .is_some_and(|mapping| mapping.contains_code(MISSING_CODE))
    }

    /// Gives a known label a new code, displacing any label that held it.
    ///
    /// When a displacement happens its notice is logged and prepended to the
    /// returned confirmation.
    pub fn set_value(&mut self, label: Label<T>, value: Code) -> Result<String, EncoderError> {
        let mapping = self.fitted_mut("set_value")?;
        if !mapping.contains_label(&label) {
            return Err(EncoderError::UnknownLabel(label.to_string()));
        }

        let notice = claim(mapping, &label, value)?;
        let message = format!("Label {label} and its encoded value {value} were successfully set!");
        mapping.assign(label, value);
        Ok(confirm(notice, message))
    }

    /// Adds a label that is not encoded yet, displacing any label that held
    /// `value`.
    pub fn add_label(&mut self, label: Label<T>, value: Code) -> Result<String, EncoderError> {
        let mapping = self.fitted_mut("add_label")?;
        if mapping.contains_label(&label) {
            return Err(EncoderError::DuplicateLabel(label.to_string()));
        }

        let notice = claim(mapping, &label, value)?;
        let message =
            format!("Label {label} and its encoded value {value} were successfully added!");
        mapping.assign(label, value);
        Ok(confirm(notice, message))
    }

    pub fn remove_label(&mut self, label: &Label<T>) -> Result<String, EncoderError> {
        let mapping = self.fitted_mut("remove_label")?;
        let value = mapping
            .remove(label)
            .ok_or_else(|| EncoderError::UnknownLabel(label.to_string()))?;

        Ok(format!(
            "Label {label} and its encoded value {value} were successfully removed!"
        ))
    }

    /// Changes how later calls treat missing values. An existing mapping is
    /// left as is.
    pub fn ignore_nans(&mut self, flag: bool) -> String {
        self.ignore_nan = flag;
        if flag {
            "Encoder settings were changed and missing values are no longer encoded".to_string()
        } else {
            "Encoder settings were changed and missing values are now encoded".to_string()
        }
    }

    pub fn set_nan(&mut self, value: Code) -> Result<String, EncoderError> {
        self.set_value(Label::Missing, value)
    }

    pub fn report(&self) -> Result<Summary<'_, T>, EncoderError> {
        let mapping = self
            .dict
            .as_ref()
            .ok_or_else(|| EncoderError::not_fitted("summary"))?;

        Ok(Summary {
            mapping,
            has_nan: self.is_nan(),
            ignore_nan: self.ignore_nan,
        })
    }

    /// Prints the state of the encoder to stdout.
    pub fn summary(&self) -> Result<(), EncoderError> {
        println!("{}", self.report()?);
        Ok(())
    }

    fn fitted_mut(&mut self, operation: &'static str) -> Result<&mut Mapping<T>, EncoderError> {
        self.dict
            .as_mut()
            .ok_or_else(|| EncoderError::not_fitted(operation))
    }
}

impl<T: Clone + Eq + Hash + Display + Serialize> Encoder<T> {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EncoderError> {
        let mapping = self
            .dict
            .as_ref()
            .ok_or_else(|| EncoderError::not_fitted("save"))?;

        let model = EncoderModel {
            version: ModelVersion::Version1,
            ignore_nan: self.ignore_nan,
            entries: mapping
                .iter()
                .map(|(label, code)| (label.clone(), code))
                .collect(),
        };

        std::fs::write(path, serde_json::to_string_pretty(&model)?)?;
        Ok(())
    }
}

impl<T: Clone + Eq + Hash + Display + DeserializeOwned> Encoder<T> {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EncoderError> {
        let contents = std::fs::read_to_string(path)?;
        let model = serde_json::from_str::<EncoderModel<T>>(&contents)?;
        let mapping = Mapping::from_entries(model.entries)?;

        Ok(Self::from_mapping(mapping, model.ignore_nan))
    }
}

/// Frees `value` for `label` by moving any other holder to
/// `max(codes) + 1`. Returns the displacement notice, if one happened.
fn claim<T>(
    mapping: &mut Mapping<T>,
    label: &Label<T>,
    value: Code,
) -> Result<Option<String>, EncoderError>
where
    T: Clone + Eq + Hash + Display,
{
    let Some(holder) = mapping.label_for(value).cloned() else {
        return Ok(None);
    };
    if holder == *label {
        return Ok(None);
    }

    let max = mapping.max_code().unwrap_or(value);
    let fresh = max
        .checked_add(1)
        .ok_or_else(|| EncoderError::InvalidValue(format!("no free code above {max}")))?;

    let notice =
        format!("{value} was already the code of {holder}, now {holder} is encoded as {fresh}");
    log::info!("{notice}");
    mapping.assign(holder, fresh);
    Ok(Some(notice))
}

fn confirm(notice: Option<String>, message: String) -> String {
    match notice {
        Some(notice) => format!("{notice}\n{message}"),
        None => message,
    }
}

/// Human-readable report of an encoder's state.
pub struct Summary<'a, T: Eq + Hash> {
    mapping: &'a Mapping<T>,
    has_nan: bool,
    ignore_nan: bool,
}

impl<T: Eq + Hash + Display> Display for Summary<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels = self
            .mapping
            .labels()
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        writeln!(f, "===============[Encoder Summary]===============")?;
        writeln!(f, "Encoding Dictionary:\n{}", self.mapping)?;
        writeln!(f, "-----------------------------------------------")?;
        writeln!(f, "Labels:\n[{}]", labels.join(", "))?;
        writeln!(f, "-----------------------------------------------")?;
        writeln!(f, "Total number of unique labels: {}", labels.len())?;
        writeln!(f, "NaNs found: {}", self.has_nan)?;
        if self.ignore_nan {
            writeln!(f, "The encoder does not encode NaNs")?;
        } else {
            writeln!(f, "The encoder does encode NaNs")?;
        }
        write!(f, "===============================================")
    }
}
