use std::{fmt::Display, hash::Hash};

use indexmap::IndexSet;

use crate::label::{parse_code, Cell, Label, MissingMarkers};

/// A single named column of values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column<T> {
    name: String,
    values: Vec<T>,
}

impl<T> Column<T> {
    pub fn new(name: impl Into<String>, values: Vec<T>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Applies `f` to every element, keeping the name, length and order.
    pub fn map<U, F>(&self, f: F) -> Column<U>
    where
        F: FnMut(&T) -> U,
    {
        Column {
            name: self.name.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl<T: Eq + Hash> Column<T> {
    /// Distinct values in first-occurrence order.
    pub fn unique(&self) -> Vec<&T> {
        self.values.iter().collect::<IndexSet<_>>().into_iter().collect()
    }
}

impl<T> Column<Label<T>> {
    /// Builds a label column where `None` marks a missing value.
    pub fn from_options<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        Self::new(name, values.into_iter().map(Label::from).collect())
    }
}

impl Column<Label<String>> {
    /// Reads one value per line.
    pub fn from_lines(name: impl Into<String>, text: &str, markers: &MissingMarkers) -> Self {
        Self::new(name, text.lines().map(|line| markers.read(line)).collect())
    }
}

impl Column<Cell<String>> {
    /// Reads an encoded column, one value per line. Lines that hold a whole
    /// number become codes, the rest are kept as labels.
    pub fn codes_from_lines(
        name: impl Into<String>,
        text: &str,
        markers: &MissingMarkers,
    ) -> Self {
        let values = text
            .lines()
            .map(|line| match parse_code(line, markers) {
                Ok(code) => Cell::Code(code),
                Err(_) => Cell::Label(markers.read(line)),
            })
            .collect();

        Self::new(name, values)
    }
}

impl<'a, T> IntoIterator for &'a Column<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: Display> Display for Column<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, value) in self.values.iter().enumerate() {
            writeln!(f, "{idx:<6}{value}")?;
        }
        write!(f, "Name: {}, Length: {}", self.name, self.values.len())
    }
}
