use std::collections::BTreeSet;

use crate::{keywords::split_keywords, projector::DisplayRecord};

/// The current facet selections and free-text query.
///
/// Every empty constraint matches everything, so `FilterSpec::default()` is
/// the reset state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub types: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    /// Required keywords; a record must carry all of them.
    pub keywords: BTreeSet<String>,
    pub search_text: String,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_types(types);
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_languages(languages);
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_keywords(keywords);
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.set_search_text(text);
        self
    }

    /// Replace the type selection.
    pub fn set_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
    }

    /// Replace the language selection.
    pub fn set_languages<I, S>(&mut self, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
    }

    /// Replace the required keyword selection.
    pub fn set_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
    }

    /// Replace the free-text query.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Clear every constraint.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.languages.is_empty()
            && self.keywords.is_empty()
            && self.search_text.is_empty()
    }
}

/// A `FilterSpec` prepared for evaluation against many records.
struct Matcher<'a> {
    spec: &'a FilterSpec,
    needle: String,
}

impl<'a> Matcher<'a> {
    fn new(spec: &'a FilterSpec) -> Self {
        Self {
            spec,
            needle: spec.search_text.to_lowercase(),
        }
    }

    fn matches(&self, record: &DisplayRecord) -> bool {
        self.type_matches(record)
            && self.language_matches(record)
            && self.keywords_match(record)
            && self.text_matches(record)
    }

    fn type_matches(&self, record: &DisplayRecord) -> bool {
        self.spec.types.is_empty() || self.spec.types.contains(&record.doc_type)
    }

    fn language_matches(&self, record: &DisplayRecord) -> bool {
        self.spec.languages.is_empty()
            || self.spec.languages.contains(&record.language)
    }

    fn keywords_match(&self, record: &DisplayRecord) -> bool {
        if self.spec.keywords.is_empty() {
            return true;
        }
        let present: BTreeSet<&str> = split_keywords(&record.keywords).collect();
        self.spec
            .keywords
            .iter()
            .all(|required| present.contains(required.as_str()))
    }

    fn text_matches(&self, record: &DisplayRecord) -> bool {
        self.needle.is_empty()
            || record
                .fields()
                .any(|(_, value)| value.to_lowercase().contains(&self.needle))
    }
}

/// Whether a single record satisfies `spec`.
pub fn matches(record: &DisplayRecord, spec: &FilterSpec) -> bool {
    Matcher::new(spec).matches(record)
}

/// Return the records satisfying `spec`, in input order.
///
/// The four constraints are AND-ed: type membership, language membership,
/// every required keyword present, and the query found case-insensitively
/// in at least one display field.
pub fn apply_filters<'r>(
    records: &'r [DisplayRecord],
    spec: &FilterSpec,
) -> Vec<&'r DisplayRecord> {
    let matcher = Matcher::new(spec);
    records.iter().filter(|r| matcher.matches(r)).collect()
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

    fn titled(title: &str) -> DisplayRecord {
        DisplayRecord {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_spec_keeps_everything() {
        let records = vec![rec("Livre", "Français", ""), rec("", "", "")];
        let spec = FilterSpec::new();

        assert!(spec.is_empty());
        assert_eq!(apply_filters(&records, &spec).len(), 2);
    }

    #[test]
    fn type_and_language_are_set_membership() {
        let records = vec![
            rec("Livre", "Français", ""),
            rec("Rapport", "Français", ""),
            rec("Livre", "Anglais", ""),
        ];

        let spec = FilterSpec::new().with_types(["Livre", "Article"]);
        let found = apply_filters(&records, &spec);
        assert_eq!(found, [&records[0], &records[2]]);

        let spec = spec.with_languages(["Anglais"]);
        assert_eq!(apply_filters(&records, &spec), [&records[2]]);
    }

    #[test]
    fn keyword_constraint_requires_all_keywords() {
        let both = rec("", "", "a, b");
        let only_a = rec("", "", "a");
        let records = vec![both.clone(), only_a];

        let spec = FilterSpec::new().with_keywords(["a", "b"]);
        assert_eq!(apply_filters(&records, &spec), [&both]);

        let spec = FilterSpec::new().with_keywords(["a"]);
        assert_eq!(apply_filters(&records, &spec).len(), 2);
    }

    #[test]
    fn keyword_constraint_matches_whole_tokens() {
        let records = vec![rec("", "", "Finances publiques")];
        let spec = FilterSpec::new().with_keywords(["Finances"]);
        assert!(apply_filters(&records, &spec).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = vec![titled("Économie Politique"), titled("Droit")];

        for query in ["politique", "ÉCONOMIE", "mie pol"] {
            let spec = FilterSpec::new().with_search_text(query);
            assert_eq!(apply_filters(&records, &spec), [&records[0]], "{query}");
        }
    }

    #[test]
    fn search_covers_every_display_field() {
        let record = DisplayRecord {
            link: "https://example.org/doc.pdf".into(),
            year: "2019".into(),
            ..Default::default()
        };
        let records = vec![record];

        for query in ["example.org", "2019"] {
            let spec = FilterSpec::new().with_search_text(query);
            assert_eq!(apply_filters(&records, &spec).len(), 1, "{query}");
        }
        let spec = FilterSpec::new().with_search_text("absent");
        assert!(apply_filters(&records, &spec).is_empty());
    }

    #[test]
    fn setters_replace_rather_than_extend() {
        let mut spec = FilterSpec::new().with_types(["Livre"]);
        spec.set_types(["Rapport"]);
        assert_eq!(spec.types, BTreeSet::from(["Rapport".to_string()]));

        spec.set_search_text("x");
        spec.set_search_text("");
        assert!(spec.search_text.is_empty());
        assert!(!spec.is_empty());

        spec.set_types(Vec::<String>::new());
        assert!(spec.is_empty());
    }

    #[test]
    fn reset_restores_full_set_in_order() {
        let records: Vec<_> = (0..10)
            .map(|i| {
                let doc_type = if i % 3 == 1 { "Rapport" } else { "Livre" };
                rec(doc_type, "Français", "")
            })
            .collect();

        let mut spec = FilterSpec::new()
            .with_types(["Rapport"])
            .with_search_text("fran");
        assert_eq!(apply_filters(&records, &spec).len(), 3);

        spec.reset();
        assert!(spec.is_empty());
        let all = apply_filters(&records, &spec);
        assert_eq!(all.len(), 10);
        assert!(all.iter().zip(&records).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    fn arb_record() -> impl Strategy<Value = DisplayRecord> {
        (
            "[A-Za-z]{0,4}",
            "[A-Za-z]{0,4}",
            "[A-Za-z ,]{0,10}",
            "[A-Za-zÉé ]{0,10}",
        )
            .prop_map(|(t, l, k, title)| DisplayRecord {
                title,
                ..rec(&t, &l, &k)
            })
    }

    fn arb_spec() -> impl Strategy<Value = FilterSpec> {
        (
            prop::collection::btree_set("[A-Za-z]{0,4}", 0..3),
            prop::collection::btree_set("[A-Za-z]{0,4}", 0..3),
            prop::collection::btree_set("[A-Za-z]{1,3}", 0..3),
            "[A-Za-zé]{0,3}",
        )
            .prop_map(|(types, languages, keywords, search_text)| FilterSpec {
                types,
                languages,
                keywords,
                search_text,
            })
    }

    proptest! {
        #[test]
        fn empty_spec_is_identity(
            records in prop::collection::vec(arb_record(), 0..20),
        ) {
            let found = apply_filters(&records, &FilterSpec::default());
            prop_assert_eq!(found.len(), records.len());
            for (a, b) in found.iter().zip(&records) {
                prop_assert!(std::ptr::eq(*a, b));
            }
        }

        #[test]
        fn result_is_the_ordered_subsequence_of_matches(
            records in prop::collection::vec(arb_record(), 0..20),
            spec in arb_spec(),
        ) {
            let found = apply_filters(&records, &spec);
            let expected: Vec<&DisplayRecord> =
                records.iter().filter(|r| matches(r, &spec)).collect();
            prop_assert_eq!(found, expected);
        }
    }
}
