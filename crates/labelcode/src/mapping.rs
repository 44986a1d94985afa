use std::{collections::HashMap, fmt::Display, hash::Hash};

// Rust std HashMap does not preserve insertion order.
use indexmap::IndexMap;

use crate::{
    column::Column,
    label::{Cell, Code, Label},
    EncoderError,
};

/// Bijective mapping between labels and codes.
///
/// `forward` keeps labels in insertion order, `reverse` answers code lookups
/// in constant time. Both are only ever changed through [`Mapping::assign`]
/// and [`Mapping::remove`], so a code can never belong to two labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping<T: Eq + Hash> {
    forward: IndexMap<Label<T>, Code>,
    reverse: HashMap<Code, Label<T>>,
}

impl<T: Eq + Hash> Default for Mapping<T> {
    fn default() -> Self {
        Self {
            forward: IndexMap::new(),
            reverse: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash> Mapping<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn get(&self, label: &Label<T>) -> Option<Code> {
        self.forward.get(label).copied()
    }

    pub fn label_for(&self, code: Code) -> Option<&Label<T>> {
        self.reverse.get(&code)
    }

    pub fn contains_label(&self, label: &Label<T>) -> bool {
        self.forward.contains_key(label)
    }

    pub fn contains_code(&self, code: Code) -> bool {
        self.reverse.contains_key(&code)
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label<T>> {
        self.forward.keys()
    }

    pub fn codes(&self) -> impl Iterator<Item = Code> + '_ {
        self.forward.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label<T>, Code)> {
        self.forward.iter().map(|(label, code)| (label, *code))
    }

    pub fn max_code(&self) -> Option<Code> {
        self.reverse.keys().max().copied()
    }

    pub fn remove(&mut self, label: &Label<T>) -> Option<Code> {
        let code = self.forward.shift_remove(label)?;
        self.reverse.remove(&code);
        Some(code)
    }
}

impl<T: Clone + Eq + Hash + Display> Mapping<T> {
    /// Builds a mapping from `(label, code)` pairs, rejecting repeated labels
    /// or codes.
    pub fn from_entries<I>(entries: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = (Label<T>, Code)>,
    {
        let mut mapping = Self::new();
        for (label, code) in entries {
            if mapping.contains_label(&label) {
                return Err(EncoderError::DuplicateLabel(label.to_string()));
            }
            mapping.insert(label, code)?;
        }

        Ok(mapping)
    }

    /// Adds `label -> code` at the end of the order. Fails if another label
    /// already holds `code`.
    pub fn insert(&mut self, label: Label<T>, code: Code) -> Result<(), EncoderError> {
        if let Some(holder) = self.reverse.get(&code).filter(|holder| **holder != label) {
            return Err(EncoderError::InvalidValue(format!(
                "code {code} is already assigned to label {holder}"
            )));
        }

        self.assign(label, code);
        Ok(())
    }

    /// Moves `label` to the end of the order with `code`. Callers make sure
    /// `code` is free or already held by `label`.
    pub(crate) fn assign(&mut self, label: Label<T>, code: Code) {
        self.remove(&label);
        if let Some(holder) = self.reverse.insert(code, label.clone()) {
            self.forward.shift_remove(&holder);
        }
        self.forward.insert(label, code);
    }

    /// Replaces every label found in the mapping with its code. Anything
    /// else is passed through unchanged.
    pub fn encode(&self, column: &Column<Label<T>>) -> Column<Cell<T>> {
        column.map(|label| match self.get(label) {
            Some(code) => Cell::Code(code),
            None => {
                log::debug!("label {label} is not encoded, passing through");
                Cell::Label(label.clone())
            }
        })
    }

    /// Replaces every known code with its label. Anything else is passed
    /// through unchanged.
    pub fn decode(&self, column: &Column<Cell<T>>) -> Column<Cell<T>> {
        column.map(|cell| match cell {
            Cell::Code(code) => match self.label_for(*code) {
                Some(label) => Cell::Label(label.clone()),
                None => {
                    log::debug!("code {code} is not encoded, passing through");
                    cell.clone()
                }
            },
            Cell::Label(_) => cell.clone(),
        })
    }
}

impl<T: Eq + Hash + Display> Display for Mapping<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (idx, (label, code)) in self.forward.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}: {code}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(value: &str) -> Label<String> {
        Label::Value(value.to_string())
    }

    #[test]
    fn test_reverse_index_follows_inserts_and_removes() -> anyhow::Result<()> {
        let mut mapping = Mapping::new();
        mapping.insert(label("a"), 1)?;
        mapping.insert(label("b"), 2)?;
        mapping.insert(Label::Missing, 0)?;

        assert_eq!(mapping.label_for(2), Some(&label("b")));
        assert_eq!(mapping.get(&Label::Missing), Some(0));
        assert_eq!(mapping.max_code(), Some(2));

        assert_eq!(mapping.remove(&label("b")), Some(2));
        assert!(!mapping.contains_code(2));
        assert_eq!(mapping.remove(&label("b")), None);
        Ok(())
    }

    #[test]
    fn test_insert_rejects_taken_code() -> anyhow::Result<()> {
        let mut mapping = Mapping::new();
        mapping.insert(label("a"), 1)?;

        let err = mapping.insert(label("b"), 1).unwrap_err();
        assert!(matches!(err, EncoderError::InvalidValue(_)));
        assert_eq!(mapping.len(), 1);

        // Re-inserting a label with a new code moves it to the end.
        mapping.insert(label("b"), 2)?;
        mapping.insert(label("a"), 3)?;
        assert_eq!(
            mapping.iter().collect::<Vec<_>>(),
            vec![(&label("b"), 2), (&label("a"), 3)]
        );
        assert!(!mapping.contains_code(1));
        Ok(())
    }

    #[test]
    fn test_from_entries_validates_bijection() {
        let err = Mapping::from_entries([(label("a"), 1), (label("a"), 2)]).unwrap_err();
        assert!(matches!(err, EncoderError::DuplicateLabel(_)));

        let err = Mapping::from_entries([(label("a"), 1), (label("b"), 1)]).unwrap_err();
        assert!(matches!(err, EncoderError::InvalidValue(_)));
    }

    #[test]
    fn test_encode_decode_pass_through_unknowns() -> anyhow::Result<()> {
        let mapping = Mapping::from_entries([(label("a"), 1), (label("b"), 2)])?;

        let column = Column::new("x", vec![label("a"), label("z"), Label::Missing]);
        let encoded = mapping.encode(&column);
        assert_eq!(
            encoded.values(),
            &[
                Cell::Code(1),
                Cell::Label(label("z")),
                Cell::Label(Label::Missing)
            ]
        );

        let codes = Column::new("x", vec![Cell::Code(2), Cell::Code(9)]);
        let decoded = mapping.decode(&codes);
        assert_eq!(
            decoded.values(),
            &[Cell::Label(label("b")), Cell::Code(9)]
        );
        Ok(())
    }

    #[test]
    fn test_display() -> anyhow::Result<()> {
        let mapping = Mapping::from_entries([(label("a"), 1), (Label::Missing, 0)])?;
        assert_eq!(mapping.to_string(), "{a: 1, NaN: 0}");
        assert_eq!(Mapping::<String>::new().to_string(), "{}");
        Ok(())
    }
}
