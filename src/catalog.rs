//! The catalog pipeline and the interactive filtering session.
//!
//! A [`Catalog`] is built once per source: raw rows are loaded, keywords are
//! derived, records are projected into their display shape, and the facet
//! index is computed over the full set. A [`CatalogSession`] then applies a
//! [`FilterSpec`] per interaction.

use tracing::info;

use crate::{
    config::CatalogConfig,
    error::{Error, Result},
    facets::FacetIndex,
    filter::{FilterSpec, apply_filters},
    keywords::KeywordDeriver,
    projector::DisplayRecord,
    record::RawTable,
    source::RecordSource,
};

/// Projected records and their facet index. Immutable once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<DisplayRecord>,
    facets: FacetIndex,
}

impl Catalog {
    /// Load `source` and run the pipeline.
    ///
    /// Any loader failure, as well as a source without records, is reported
    /// as [`Error::SourceUnavailable`]; no facets or filters are computed in
    /// that case.
    pub fn load(source: &dyn RecordSource, config: &CatalogConfig) -> Result<Self> {
        let origin = source.describe();
        let table = source
            .load()
            .map_err(|e| Error::source_unavailable(&origin, e))?;

        if table.is_empty() {
            return Err(Error::source_unavailable(origin, "no records"));
        }

        let catalog = Self::from_table(&table, config);
        info!(
            source = %origin,
            records = catalog.len(),
            types = catalog.facets.types().len(),
            languages = catalog.facets.languages().len(),
            keywords = catalog.facets.keywords().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Derive keywords, project, and index an already loaded table.
    pub fn from_table(table: &RawTable, config: &CatalogConfig) -> Self {
        let deriver = KeywordDeriver::from_headers(
            &table.headers,
            &config.keyword_column_prefix,
            &config.affirmative_token,
        );
        let field_map = config.field_map();

        let records: Vec<DisplayRecord> = table
            .records
            .iter()
            .map(|raw| {
                let with_keywords = raw.with_cell(
                    config.keyword_column.as_str(),
                    deriver.derive_joined(raw),
                );
                field_map.project(&with_keywords)
            })
            .collect();

        Self::from_records(records)
    }

    /// Wrap already projected records.
    pub fn from_records(records: Vec<DisplayRecord>) -> Self {
        let facets = FacetIndex::build(&records);
        Self { records, facets }
    }

    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    pub fn facets(&self) -> &FacetIndex {
        &self.facets
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching `spec`, in catalog order.
    pub fn filter(&self, spec: &FilterSpec) -> Vec<&DisplayRecord> {
        apply_filters(&self.records, spec)
    }
}

/// Whether a catalog is available at all.
///
/// Distinguishes "the source could not be loaded" from "nothing matched".
#[derive(Debug)]
pub enum CatalogState {
    Unavailable { reason: String },
    Ready(Catalog),
}

impl CatalogState {
    pub fn load(source: &dyn RecordSource, config: &CatalogConfig) -> Self {
        match Catalog::load(source, config) {
            Ok(catalog) => Self::Ready(catalog),
            Err(e) => Self::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Ready(catalog) => Some(catalog),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// What a host displays after each interaction.
#[derive(Debug, Clone)]
pub struct ResultsView<'a> {
    pub match_count: usize,
    pub total: usize,
    pub records: Vec<&'a DisplayRecord>,
    pub facets: &'a FacetIndex,
}

/// A catalog together with the filter state of one user.
///
/// Each setter replaces its whole selection; [`CatalogSession::reset`]
/// clears all of them.
#[derive(Debug)]
pub struct CatalogSession<'c> {
    catalog: &'c Catalog,
    spec: FilterSpec,
}

impl<'c> CatalogSession<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            spec: FilterSpec::default(),
        }
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn set_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.set_types(types);
    }

    pub fn set_languages<I, S>(&mut self, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.set_languages(languages);
    }

    pub fn set_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.set_keywords(keywords);
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.spec.set_search_text(text);
    }

    pub fn reset(&mut self) {
        self.spec.reset();
    }

    /// Evaluate the current selections over the whole catalog.
    pub fn view(&self) -> ResultsView<'c> {
        let records = self.catalog.filter(&self.spec);
        ResultsView {
            match_count: records.len(),
            total: self.catalog.len(),
            records,
            facets: self.catalog.facets(),
        }
    }
}
