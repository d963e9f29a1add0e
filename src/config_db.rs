use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::error::Result;

const SOURCES: TableDefinition<&str, &str> = TableDefinition::new("sources");
const SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings");

/// Setting key holding the name of the source used when none is given.
pub const DEFAULT_SOURCE_KEY: &str = "default_source";

/// Registered catalog sources and operator settings.
///
/// Filter selections are never stored here.
pub struct ConfigDb {
    db: Database,
}

impl ConfigDb {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure all tables exist by opening them in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(SOURCES)?;
        txn.open_table(SETTINGS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    // -- Sources --

    pub fn set_source(&self, name: &str, path: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SOURCES)?;
            table.insert(name, path)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_source(&self, name: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SOURCES)?;
        Ok(table.get(name)?.map(|v| v.value().to_string()))
    }

    /// Remove a source, clearing the default if it pointed at it.
    pub fn remove_source(&self, name: &str) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(SOURCES)?;
            table.remove(name)?.is_some()
        };
        {
            let mut settings = txn.open_table(SETTINGS)?;
            let is_default = settings
                .get(DEFAULT_SOURCE_KEY)?
                .is_some_and(|v| v.value() == name);
            if is_default {
                settings.remove(DEFAULT_SOURCE_KEY)?;
            }
        }
        txn.commit()?;
        Ok(removed)
    }

    pub fn list_sources(&self) -> Result<Vec<(String, String)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SOURCES)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            result.push((k.value().to_string(), v.value().to_string()));
        }
        Ok(result)
    }

    pub fn default_source(&self) -> Result<Option<String>> {
        self.get_setting(DEFAULT_SOURCE_KEY)
    }

    pub fn set_default_source(&self, name: &str) -> Result<()> {
        self.set_setting(DEFAULT_SOURCE_KEY, name)
    }

    // -- Settings --

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }
}

impl std::fmt::Debug for ConfigDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigDb").finish_non_exhaustive()
    }
}
