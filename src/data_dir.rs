//! Where bibfacet keeps its registry and default configuration.
//!
//! The directory holds two files: `config.redb` (named sources and the
//! default source) and `config.toml` (the catalog configuration used when no
//! `--config` is given). Catalog data itself is never copied here.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DATA_DIR_ENV_VAR: &str = "BIBFACET_DATA_DIR";

const REGISTRY_FILE: &str = "config.redb";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Pick the directory (`--data-dir`, then `$BIBFACET_DATA_DIR`, then
    /// `$XDG_DATA_HOME/bibfacet`) and create it if needed.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os(DATA_DIR_ENV_VAR) {
                Some(val) => PathBuf::from(val),
                None => xdg_data_home()?,
            },
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source registry opened by [`crate::ConfigDb`].
    pub fn config_db(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    /// Fallback catalog configuration; `config init` writes it.
    pub fn config_toml(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}

fn xdg_data_home() -> Result<PathBuf> {
    xdg::BaseDirectories::with_prefix("bibfacet")
        .get_data_home()
        .ok_or_else(|| {
            Error::Config("could not determine XDG data home directory".into())
        })
}
