use std::collections::BTreeMap;

use crate::{keywords::split_keywords, projector::DisplayRecord};

/// A filterable dimension of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Type,
    Language,
    Keyword,
}

/// Distinct values of each facet over a record set, sorted ascending, with
/// the number of records carrying each value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetIndex {
    types: BTreeMap<String, usize>,
    languages: BTreeMap<String, usize>,
    keywords: BTreeMap<String, usize>,
}

impl FacetIndex {
    /// Build the index from the full record set.
    ///
    /// Empty type and language values are not offered as options. Keywords
    /// come from splitting each record's joined keyword field.
    pub fn build(records: &[DisplayRecord]) -> Self {
        let mut index = Self::default();

        for record in records {
            if !record.doc_type.is_empty() {
                bump(&mut index.types, &record.doc_type);
            }
            if !record.language.is_empty() {
                bump(&mut index.languages, &record.language);
            }
            // A record repeating a keyword still counts once.
            let mut seen: Vec<&str> = Vec::new();
            for keyword in split_keywords(&record.keywords) {
                if !seen.contains(&keyword) {
                    seen.push(keyword);
                    bump(&mut index.keywords, keyword);
                }
            }
        }

        index
    }

    fn map(&self, facet: Facet) -> &BTreeMap<String, usize> {
        match facet {
            Facet::Type => &self.types,
            Facet::Language => &self.languages,
            Facet::Keyword => &self.keywords,
        }
    }

    /// Sorted option list for `facet`.
    pub fn values(&self, facet: Facet) -> Vec<&str> {
        self.map(facet).keys().map(String::as_str).collect()
    }

    /// `(value, record count)` pairs for `facet`, sorted by value.
    pub fn counts(&self, facet: Facet) -> impl Iterator<Item = (&str, usize)> {
        self.map(facet)
            .iter()
            .map(|(value, count)| (value.as_str(), *count))
    }

    pub fn types(&self) -> Vec<&str> {
        self.values(Facet::Type)
    }

    pub fn languages(&self) -> Vec<&str> {
        self.values(Facet::Language)
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.values(Facet::Keyword)
    }
}

fn bump(map: &mut BTreeMap<String, usize>, value: &str) {
    match map.get_mut(value) {
        Some(count) => *count += 1,
        None => {
            map.insert(value.to_string(), 1);
        }
    }
}

/// Build the facet index for `records`.
pub fn build_facets(records: &[DisplayRecord]) -> FacetIndex {
    FacetIndex::build(records)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn rec(doc_type: &str, language: &str, keywords: &str) -> DisplayRecord {
        DisplayRecord {
            doc_type: doc_type.into(),
            language: language.into(),
            keywords: keywords.into(),
            ..Default::default()
        }
    }

    #[test]
    fn collects_sorted_distinct_values() {
        let records = vec![
            rec("Rapport", "Français", "Finance, Droit"),
            rec("Livre", "Anglais", "Audit"),
            rec("Livre", "Français", ""),
            rec("", "", " Droit ,, Fiscalité "),
        ];
        let index = build_facets(&records);

        assert_eq!(index.types(), ["Livre", "Rapport"]);
        assert_eq!(index.languages(), ["Anglais", "Français"]);
        assert_eq!(
            index.keywords(),
            ["Audit", "Droit", "Finance", "Fiscalité"]
        );
    }

    #[test]
    fn counts_records_per_value() {
        let records = vec![
            rec("Livre", "Français", "Droit, Droit"),
            rec("Livre", "Français", "Droit"),
            rec("Rapport", "Anglais", ""),
        ];
        let index = build_facets(&records);

        let types: Vec<_> = index.counts(Facet::Type).collect();
        assert_eq!(types, [("Livre", 2), ("Rapport", 1)]);
        let keywords: Vec<_> = index.counts(Facet::Keyword).collect();
        assert_eq!(keywords, [("Droit", 2)]);
    }

    #[test]
    fn empty_record_set_has_no_options() {
        let index = build_facets(&[]);
        assert!(index.types().is_empty());
        assert!(index.languages().is_empty());
        assert!(index.keywords().is_empty());
    }

    fn arb_word() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("Livre".to_string()),
            Just("Rapport".to_string()),
            "[a-zA-Zé ]{0,8}",
        ]
    }

    fn arb_record() -> impl Strategy<Value = DisplayRecord> {
        let keywords = prop::collection::vec("[a-zA-Zé ]{0,6}", 0..4)
            .prop_map(|parts| parts.join(","));
        (arb_word(), arb_word(), keywords)
            .prop_map(|(t, l, k)| rec(&t, &l, &k))
    }

    proptest! {
        #[test]
        fn facet_lists_are_sorted_unique_and_grounded(
            records in prop::collection::vec(arb_record(), 0..16),
        ) {
            let index = build_facets(&records);

            for facet in [Facet::Type, Facet::Language, Facet::Keyword] {
                let values = index.values(facet);
                for pair in values.windows(2) {
                    prop_assert!(pair[0] < pair[1]);
                }
                for value in values {
                    prop_assert!(!value.is_empty());
                    let grounded = records.iter().any(|r| match facet {
                        Facet::Type => r.doc_type == value,
                        Facet::Language => r.language == value,
                        Facet::Keyword => {
                            split_keywords(&r.keywords).any(|k| k == value)
                        }
                    });
                    prop_assert!(grounded);
                }
            }
        }
    }
}
