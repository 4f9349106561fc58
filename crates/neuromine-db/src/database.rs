//! Database connection and table management.

use crate::error::Result;
use crate::schema;
use crate::schema_arrow::compound_schema;
use arrow_array::RecordBatchIterator;
use lancedb::connection::Connection;
use lancedb::index::Index;
use std::path::Path;

/// Main database handle.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
    path: String,
}

impl Database {
    /// Open or create a database at the specified path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        if !path.as_ref().exists() {
            std::fs::create_dir_all(path.as_ref())?;
        }

        let conn = lancedb::connect(&path_str).execute().await?;

        Ok(Self { conn, path: path_str })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Create the compounds table if it does not exist yet.
    pub async fn initialize(&self) -> Result<()> {
        if !self.table_exists(schema::TABLE_COMPOUNDS).await? {
            let empty_iter = RecordBatchIterator::new(vec![], compound_schema());
            self.conn
                .create_table(schema::TABLE_COMPOUNDS, empty_iter)
                .execute()
                .await?;
            tracing::info!(path = %self.path, "Created compounds table");
        }
        Ok(())
    }

    pub async fn table_exists(&self, name: &str) -> Result<bool> {
        let tables = self.conn.table_names().execute().await?;
        Ok(tables.iter().any(|t| t == name))
    }

    /// Build a scalar index on `compound_name`.
    ///
    /// Lance cannot train an index over an empty table, so this is run after
    /// the first classification pass. Keyed merge-insert keeps names unique
    /// with or without the index.
    pub async fn create_compound_index(&self) -> Result<()> {
        let table = self.conn.open_table(schema::TABLE_COMPOUNDS).execute().await?;
        if table.count_rows(None).await? == 0 {
            return Ok(());
        }
        table
            .create_index(&["compound_name"], Index::BTree(Default::default()))
            .execute()
            .await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<DatabaseStats> {
        let compounds = if self.table_exists(schema::TABLE_COMPOUNDS).await? {
            let table = self.conn.open_table(schema::TABLE_COMPOUNDS).execute().await?;
            table.count_rows(None).await? as u64
        } else {
            0
        };
        Ok(DatabaseStats { compounds })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseStats {
    pub compounds: u64,
}
