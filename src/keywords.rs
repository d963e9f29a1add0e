//! Keyword facet derivation from yes/no survey columns.
//!
//! Survey exports encode one keyword per column: the label carries the
//! keyword inside brackets (`Sélectionnez cinq mots clés [Finance]`) and the
//! cell holds a yes/no answer. A record's keyword facet is the sorted set of
//! keywords whose column was answered affirmatively.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::record::RawRecord;

/// Separator used when storing a keyword list in a single display field.
pub const KEYWORD_SEPARATOR: &str = ", ";

/// Extract the keyword token embedded in a column label.
///
/// Returns the text between the first `[` and the next `]`, trimmed.
/// Returns `None` when the label has no bracketed part, when the token is
/// blank, or when it contains a comma, since a comma could not survive
/// [`join_keywords`] followed by [`split_keywords`].
///
/// ```
/// use bibfacet::keywords::keyword_token;
///
/// assert_eq!(
///     keyword_token("Sélectionnez cinq mots clés [Finance]"),
///     Some("Finance")
/// );
/// assert_eq!(keyword_token("Sélectionnez cinq mots clés"), None);
/// assert_eq!(keyword_token("Mots clés []"), None);
/// ```
pub fn keyword_token(label: &str) -> Option<&str> {
    let token = bracketed(label)?;
    if token.is_empty() || token.contains(',') {
        return None;
    }
    Some(token)
}

/// Trimmed text between the first `[` and the next `]`.
fn bracketed(label: &str) -> Option<&str> {
    let open = label.find('[')?;
    let rest = &label[open + 1..];
    let close = rest.find(']')?;
    Some(rest[..close].trim())
}

/// Select the keyword-source columns from a header list, in header order.
pub fn keyword_columns<'a>(headers: &'a [String], prefix: &str) -> Vec<&'a str> {
    headers
        .iter()
        .map(String::as_str)
        .filter(|label| label.starts_with(prefix))
        .collect()
}

/// Whether a cell counts as a "yes" answer.
pub fn is_affirmative(cell: &str, affirmative: &str) -> bool {
    cell.trim().to_lowercase() == affirmative.trim().to_lowercase()
}

/// Derive the sorted, deduplicated keyword list of one record.
///
/// Missing cells are treated as empty and labels without a bracketed token
/// are skipped, so this never fails.
pub fn derive_keywords<S: AsRef<str>>(
    record: &RawRecord,
    columns: &[S],
    affirmative: &str,
) -> Vec<String> {
    let keywords: BTreeSet<&str> = columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|label| is_affirmative(record.get(label), affirmative))
        .filter_map(keyword_token)
        .collect();
    keywords.into_iter().map(str::to_string).collect()
}

/// Join a keyword list into its single-field storage form.
pub fn join_keywords<S: AsRef<str>>(keywords: &[S]) -> String {
    keywords
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(KEYWORD_SEPARATOR)
}

/// Split a stored keyword field back into trimmed, non-empty tokens.
pub fn split_keywords(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|k| !k.is_empty())
}

/// Keyword deriver bound to one table's headers.
///
/// Resolves the keyword token of every source column once, so per-record
/// derivation only checks cells.
#[derive(Debug, Clone)]
pub struct KeywordDeriver {
    /// `(column label, keyword token)` pairs in header order.
    columns: Vec<(String, String)>,
    /// Keyword columns whose token holds a comma and was therefore dropped.
    rejected: Vec<String>,
    affirmative: String,
}

impl KeywordDeriver {
    pub fn from_headers(
        headers: &[String],
        prefix: &str,
        affirmative: &str,
    ) -> Self {
        let mut columns = Vec::new();
        let mut rejected = Vec::new();
        for label in keyword_columns(headers, prefix) {
            match keyword_token(label) {
                Some(token) => {
                    columns.push((label.to_string(), token.to_string()))
                }
                None if bracketed(label).is_some_and(|t| t.contains(',')) => {
                    warn!(
                        label,
                        "keyword contains a comma and cannot be stored, \
                         ignoring the column"
                    );
                    rejected.push(label.to_string());
                }
                None => {
                    debug!(label, "keyword column has no usable [token]");
                }
            }
        }
        debug!(count = columns.len(), prefix, "resolved keyword columns");

        Self {
            columns,
            rejected,
            affirmative: affirmative.to_string(),
        }
    }

    /// Keyword columns ignored because their token contains a comma.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Keywords carried by the source columns, in header order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, token)| token.as_str())
    }

    pub fn derive(&self, record: &RawRecord) -> Vec<String> {
        let keywords: BTreeSet<&str> = self
            .columns
            .iter()
            .filter(|(label, _)| {
                is_affirmative(record.get(label), &self.affirmative)
            })
            .map(|(_, token)| token.as_str())
            .collect();
        keywords.into_iter().map(str::to_string).collect()
    }

    /// Derive and join in one step, producing the display field value.
    pub fn derive_joined(&self, record: &RawRecord) -> String {
        join_keywords(&self.derive(record))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const PREFIX: &str = "Sélectionnez cinq mots clés";

    fn label(keyword: &str) -> String {
        format!("{PREFIX} [{keyword}]")
    }

    #[test]
    fn token_uses_first_bracket_pair() {
        assert_eq!(keyword_token("x [a] [b]"), Some("a"));
        assert_eq!(keyword_token("x [a [b] c]"), Some("a [b"));
        assert_eq!(keyword_token("x [  Droit  ]"), Some("Droit"));
    }

    #[test]
    fn token_rejects_malformed_labels() {
        assert_eq!(keyword_token("no brackets"), None);
        assert_eq!(keyword_token("open only [Finance"), None);
        assert_eq!(keyword_token("close only Finance]"), None);
        assert_eq!(keyword_token("blank [   ]"), None);
        assert_eq!(keyword_token("comma [Droit, Finance]"), None);
    }

    #[test]
    fn affirmative_is_trimmed_and_case_insensitive() {
        assert!(is_affirmative("oui", "oui"));
        assert!(is_affirmative("  OUI ", "oui"));
        assert!(is_affirmative("Oui", "OUI"));
        assert!(!is_affirmative("non", "oui"));
        assert!(!is_affirmative("", "oui"));
        assert!(!is_affirmative("ouiii", "oui"));
    }

    #[test]
    fn selects_prefixed_columns_in_order() {
        let headers = vec![
            label("Finance"),
            "Titre du document.".to_string(),
            label("Droit"),
        ];
        assert_eq!(
            keyword_columns(&headers, PREFIX),
            vec![label("Finance").as_str(), label("Droit").as_str()]
        );
    }

    #[test]
    fn derives_sorted_unique_keywords() {
        let record = RawRecord::from_iter([
            (label("Fiscalité"), "oui"),
            (label("Droit"), "Oui "),
            (label("Audit"), "non"),
            ("Autre [Droit]".to_string(), "oui"),
        ]);
        let columns = [
            label("Fiscalité"),
            label("Droit"),
            label("Audit"),
            "Autre [Droit]".to_string(),
        ];

        let keywords = derive_keywords(&record, &columns, "oui");
        assert_eq!(keywords, vec!["Droit", "Fiscalité"]);
    }

    #[test]
    fn missing_cells_and_malformed_labels_are_skipped() {
        let record = RawRecord::from_iter([(PREFIX.to_string(), "oui")]);
        let columns = [PREFIX.to_string(), label("Finance")];

        assert!(derive_keywords(&record, &columns, "oui").is_empty());
    }

    #[test]
    fn deriver_matches_free_function() {
        let headers = vec![
            label("Finance"),
            label("Droit"),
            PREFIX.to_string(),
            "Titre du document.".to_string(),
        ];
        let record = RawRecord::from_iter([
            (label("Finance"), "oui"),
            (label("Droit"), "non"),
            (PREFIX.to_string(), "oui"),
        ]);

        let deriver = KeywordDeriver::from_headers(&headers, PREFIX, "oui");
        let columns = keyword_columns(&headers, PREFIX);

        assert_eq!(deriver.keywords().collect::<Vec<_>>(), ["Finance", "Droit"]);
        assert_eq!(
            deriver.derive(&record),
            derive_keywords(&record, &columns, "oui")
        );
        assert_eq!(deriver.derive_joined(&record), "Finance");
    }

    #[test]
    fn comma_keywords_are_reported_not_derived() {
        let headers = vec![label("Gouvernance, éthique"), label("Finance")];
        let record = RawRecord::from_iter([
            (label("Gouvernance, éthique"), "oui"),
            (label("Finance"), "oui"),
        ]);

        let deriver = KeywordDeriver::from_headers(&headers, PREFIX, "oui");
        assert_eq!(deriver.rejected(), [label("Gouvernance, éthique")]);
        assert_eq!(deriver.keywords().collect::<Vec<_>>(), ["Finance"]);
        assert_eq!(deriver.derive_joined(&record), "Finance");
    }

    #[test]
    fn blank_tokens_are_not_reported_as_comma_keywords() {
        let headers = vec![label("  "), PREFIX.to_string()];
        let deriver = KeywordDeriver::from_headers(&headers, PREFIX, "oui");
        assert!(deriver.rejected().is_empty());
        assert_eq!(deriver.keywords().count(), 0);
    }

    #[test]
    fn join_and_split() {
        assert_eq!(join_keywords(&["Droit", "Finance"]), "Droit, Finance");
        assert_eq!(join_keywords::<&str>(&[]), "");
        assert_eq!(
            split_keywords(" Droit ,Finance,, ").collect::<Vec<_>>(),
            ["Droit", "Finance"]
        );
        assert_eq!(split_keywords("").count(), 0);
    }

    fn arb_label() -> impl Strategy<Value = String> {
        prop_oneof![
            "[^\\[\\]]{0,12}".prop_map(|s| format!("{PREFIX} [{s}]")),
            ".{0,20}",
        ]
    }

    fn arb_cell() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("oui".to_string()),
            Just(" OUI ".to_string()),
            Just("non".to_string()),
            ".{0,6}",
        ]
    }

    proptest! {
        #[test]
        fn derived_keywords_are_sorted_unique_and_round_trip(
            cells in prop::collection::vec((arb_label(), arb_cell()), 0..12),
        ) {
            let columns: Vec<String> =
                cells.iter().map(|(label, _)| label.clone()).collect();
            let record = RawRecord::from_iter(cells);

            let keywords = derive_keywords(&record, &columns, "oui");

            for pair in keywords.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }

            let joined = join_keywords(&keywords);
            let recovered: Vec<&str> = split_keywords(&joined).collect();
            prop_assert_eq!(recovered, keywords.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
