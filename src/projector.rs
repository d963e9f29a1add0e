use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::record::RawRecord;

/// The fixed display fields of a catalog record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Type,
    Title,
    Authors,
    Year,
    Summary,
    Language,
    Keywords,
    Link,
}

impl FieldKey {
    /// All fields in display order.
    pub const ALL: [FieldKey; 8] = [
        FieldKey::Type,
        FieldKey::Title,
        FieldKey::Authors,
        FieldKey::Year,
        FieldKey::Summary,
        FieldKey::Language,
        FieldKey::Keywords,
        FieldKey::Link,
    ];

    /// Column header shown to readers.
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::Type => "Type",
            FieldKey::Title => "Titre",
            FieldKey::Authors => "Auteur(s)",
            FieldKey::Year => "Année",
            FieldKey::Summary => "Résumé",
            FieldKey::Language => "Langue",
            FieldKey::Keywords => "Mots-clés",
            FieldKey::Link => "Lien",
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One `source label -> display field` entry of a field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source: String,
    pub target: FieldKey,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, target: FieldKey) -> Self {
        Self {
            source: source.into(),
            target,
        }
    }
}

/// An ordered field map with first-wins resolution of duplicate targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    /// Winning source label per field, indexed like [`FieldKey::ALL`].
    resolved: [Option<String>; 8],
    /// Entries discarded because an earlier entry claimed the same target.
    shadowed: Vec<FieldMapping>,
}

impl FieldMap {
    /// Resolve `entries` in order. A target claimed by an earlier entry keeps
    /// that entry; later ones are recorded as shadowed and logged.
    pub fn new(entries: &[FieldMapping]) -> Self {
        let mut resolved: [Option<String>; 8] = Default::default();
        let mut shadowed = Vec::new();

        for entry in entries {
            let slot = slot_of(entry.target);
            match resolved[slot].as_deref() {
                Some(winner) => {
                    warn!(
                        field = %entry.target,
                        kept = %winner,
                        dropped = %entry.source,
                        "duplicate column for display field, keeping the first"
                    );
                    shadowed.push(entry.clone());
                }
                None => resolved[slot] = Some(entry.source.clone()),
            }
        }

        Self { resolved, shadowed }
    }

    /// Source label feeding `field`, if any entry targets it.
    pub fn source_of(&self, field: FieldKey) -> Option<&str> {
        self.resolved[slot_of(field)].as_deref()
    }

    pub fn shadowed(&self) -> &[FieldMapping] {
        &self.shadowed
    }

    /// Project one raw record into the display shape.
    ///
    /// Missing columns and unmapped fields project to the empty string.
    pub fn project(&self, record: &RawRecord) -> DisplayRecord {
        let value = |field: FieldKey| {
            self.source_of(field)
                .map(|label| record.get(label).to_string())
                .unwrap_or_default()
        };

        DisplayRecord {
            doc_type: value(FieldKey::Type),
            title: value(FieldKey::Title),
            authors: value(FieldKey::Authors),
            year: value(FieldKey::Year),
            summary: value(FieldKey::Summary),
            language: value(FieldKey::Language),
            keywords: value(FieldKey::Keywords),
            link: value(FieldKey::Link),
        }
    }
}

fn slot_of(field: FieldKey) -> usize {
    field as usize
}

/// Project `record` through an unresolved list of mappings.
pub fn project(record: &RawRecord, entries: &[FieldMapping]) -> DisplayRecord {
    FieldMap::new(entries).project(record)
}

/// A catalog record in its display shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub title: String,
    pub authors: String,
    pub year: String,
    pub summary: String,
    pub language: String,
    /// Comma-joined, sorted keyword list; empty when none applied.
    pub keywords: String,
    /// Copied verbatim from the source; never validated here.
    pub link: String,
}

impl DisplayRecord {
    pub fn get(&self, field: FieldKey) -> &str {
        match field {
            FieldKey::Type => &self.doc_type,
            FieldKey::Title => &self.title,
            FieldKey::Authors => &self.authors,
            FieldKey::Year => &self.year,
            FieldKey::Summary => &self.summary,
            FieldKey::Language => &self.language,
            FieldKey::Keywords => &self.keywords,
            FieldKey::Link => &self.link,
        }
    }

    /// All `(field, value)` pairs in display order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        FieldKey::ALL.into_iter().map(|field| (field, self.get(field)))
    }
}
