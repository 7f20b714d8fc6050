//! Result types for engine queries

use crate::schema::TableSchema;

/// Summary returned by `info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub schema: TableSchema,
    pub record_count: usize,
}

impl TableInfo {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// `ID:int, name:str, ...`
    pub fn columns_summary(&self) -> String {
        self.schema.columns_summary()
    }
}
