use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    projector::{FieldKey, FieldMap, FieldMapping},
};

pub const CONFIG_ENV_VAR: &str = "BIBFACET_CONFIG";

pub const DEFAULT_KEYWORD_PREFIX: &str = "Sélectionnez cinq mots clés";
pub const DEFAULT_AFFIRMATIVE: &str = "oui";
pub const DEFAULT_KEYWORD_COLUMN: &str = "Mots-clés";

/// Column labels of the library survey form.
const DEFAULT_FIELD_MAP: [(&str, FieldKey); 8] = [
    ("Type de document", FieldKey::Type),
    ("Titre du document.", FieldKey::Title),
    (
        "Auteur(s) (Nom, Prénom), séparer les auteurs par ;.",
        FieldKey::Authors,
    ),
    ("Année de publication", FieldKey::Year),
    (
        "Brève description de l'ouvrage. Idéalement, il s'agit de résumer, \
         dans ses grandes lignes, le contenu de l'ouvrage.",
        FieldKey::Summary,
    ),
    ("Langue du document.", FieldKey::Language),
    (DEFAULT_KEYWORD_COLUMN, FieldKey::Keywords),
    ("Lien URL vers le document.", FieldKey::Link),
];

/// Operator-supplied settings describing how to read a catalog source.
///
/// Every key is optional in the TOML file; missing keys take the defaults of
/// the library survey export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Label prefix of the yes/no keyword columns.
    pub keyword_column_prefix: String,
    /// Cell value meaning "yes", compared case-insensitively.
    pub affirmative_token: String,
    /// Label under which derived keywords are attached before projection.
    pub keyword_column: String,
    /// Field delimiter for delimited sources; sniffed when unset.
    pub delimiter: Option<char>,
    /// Ordered `source label -> display field` entries. The first entry for
    /// a field wins.
    pub field_map: Vec<FieldMapping>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            keyword_column_prefix: DEFAULT_KEYWORD_PREFIX.to_string(),
            affirmative_token: DEFAULT_AFFIRMATIVE.to_string(),
            keyword_column: DEFAULT_KEYWORD_COLUMN.to_string(),
            delimiter: None,
            field_map: DEFAULT_FIELD_MAP
                .iter()
                .map(|(source, target)| FieldMapping::new(*source, *target))
                .collect(),
        }
    }
}

impl CatalogConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration file, in order of priority:
    /// 1. An explicit path (from --config)
    /// 2. The BIBFACET_CONFIG environment variable
    /// 3. `fallback` (the data directory's config.toml), if it exists
    ///
    /// Falls back to the built-in defaults when none applies.
    pub fn resolve(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        let path = if let Some(path) = explicit {
            Some(path.to_path_buf())
        } else if let Ok(val) = std::env::var(CONFIG_ENV_VAR) {
            Some(PathBuf::from(val))
        } else if fallback.is_file() {
            Some(fallback.to_path_buf())
        } else {
            None
        };

        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading catalog config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Write to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|_| Error::DataDir(parent.to_path_buf()))?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.keyword_column_prefix.trim().is_empty() {
            return Err(Error::Config(
                "keyword_column_prefix must not be empty".into(),
            ));
        }
        if self.affirmative_token.trim().is_empty() {
            return Err(Error::Config(
                "affirmative_token must not be empty".into(),
            ));
        }
        // Derived keywords only reach the display record through this column.
        if let Some(mapping) = self
            .field_map
            .iter()
            .find(|m| m.target == FieldKey::Keywords)
            && mapping.source != self.keyword_column
        {
            return Err(Error::Config(format!(
                "keyword_column {:?} must be the field_map source for \
                 keywords, found {:?}",
                self.keyword_column, mapping.source
            )));
        }
        if let Some(delimiter) = self.delimiter
            && !delimiter.is_ascii()
        {
            return Err(Error::Config(format!(
                "delimiter must be a single ASCII character, got {delimiter:?}"
            )));
        }
        Ok(())
    }

    /// Resolve the field map, logging any shadowed entries.
    pub fn field_map(&self) -> FieldMap {
        FieldMap::new(&self.field_map)
    }

    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.filter(char::is_ascii).map(|c| c as u8)
    }
}
