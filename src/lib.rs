//! bibfacet - faceted search over library catalog spreadsheets.
//!
//! bibfacet reads a tabular export of a document catalog (CSV or JSON), turns
//! its yes/no keyword columns into a keyword list, projects each row into a
//! fixed set of display fields, and filters the result by document type,
//! language, keywords and free text.
//!
//! # Quick start
//!
//! ```no_run
//! use bibfacet::{Catalog, CatalogConfig, CatalogSession};
//! use bibfacet::source::CsvSource;
//!
//! let config = CatalogConfig::default();
//! let catalog = Catalog::load(&CsvSource::new("catalog.csv"), &config).unwrap();
//!
//! let mut session = CatalogSession::new(&catalog);
//! session.set_keywords(["Finance"]);
//! session.set_search_text("économie");
//!
//! let view = session.view();
//! println!("Résultats ({})", view.match_count);
//! for record in &view.records {
//!     println!("{} ({})", record.title, record.year);
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod config_db;
pub mod data_dir;
pub mod error;
pub mod facets;
pub mod filter;
pub mod keywords;
pub mod projector;
pub mod record;
pub mod render;
pub mod source;

pub use catalog::{Catalog, CatalogSession, CatalogState, ResultsView};
pub use config::CatalogConfig;
pub use config_db::ConfigDb;
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use facets::{Facet, FacetIndex, build_facets};
pub use filter::{FilterSpec, apply_filters};
pub use keywords::derive_keywords;
pub use projector::{DisplayRecord, FieldKey, FieldMap, FieldMapping, project};
pub use record::{RawRecord, RawTable};
pub use source::RecordSource;
