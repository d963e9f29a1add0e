use std::collections::HashMap;

/// One source row: column label to cell value.
///
/// Labels are trimmed by the loader before they reach this type. Absent and
/// blank cells both read back as the empty string, so lookups never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    cells: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell value for `label`, or `""` when the column is missing.
    pub fn get(&self, label: &str) -> &str {
        self.cells.get(label).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, label: &str) -> bool {
        self.cells.contains_key(label)
    }

    /// Insert a cell unless the label is already present.
    ///
    /// Returns `false` when the label was taken, leaving the first value in
    /// place.
    pub fn insert_first(
        &mut self,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        let label = label.into();
        if self.cells.contains_key(&label) {
            return false;
        }
        self.cells.insert(label, value.into());
        true
    }

    /// Return a copy with `label` set to `value`, replacing any prior cell.
    ///
    /// Used to attach derived columns without mutating the loaded record.
    pub fn with_cell(
        &self,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut cells = self.cells.clone();
        cells.insert(label.into(), value.into());
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    /// Build a record from `(label, value)` pairs; the first value wins for a
    /// repeated label.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (label, value) in iter {
            record.insert_first(label, value);
        }
        record
    }
}

/// The loader's output: ordered headers plus one record per row.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Trimmed column labels in source order, duplicates removed.
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { headers, records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_label_reads_empty() {
        let record = RawRecord::from_iter([("Titre", "Traité")]);
        assert_eq!(record.get("Titre"), "Traité");
        assert_eq!(record.get("Langue"), "");
        assert!(!record.contains("Langue"));
    }

    #[test]
    fn first_value_wins_on_repeated_label() {
        let record =
            RawRecord::from_iter([("Titre", "premier"), ("Titre", "second")]);
        assert_eq!(record.get("Titre"), "premier");
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn with_cell_leaves_original_untouched() {
        let original = RawRecord::from_iter([("Titre", "Traité")]);
        let derived = original.with_cell("Mots-clés", "Finance");

        assert_eq!(derived.get("Mots-clés"), "Finance");
        assert_eq!(derived.get("Titre"), "Traité");
        assert!(!original.contains("Mots-clés"));
    }
}
