//! Extracted tables keyed by page number.

use std::fs;
use std::path::Path;

use manualqa_core::types::{TableGrid, TableRecord};
use manualqa_core::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct TableStore {
    records: Vec<TableRecord>,
}

impl TableStore {
    pub fn from_records(records: Vec<TableRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let records = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidData { path: path.to_path_buf(), reason: e.to_string() })?;
        Ok(Self { records })
    }

    /// All tables on `page`, in file order. Linear scan: table counts per
    /// manual are in the low hundreds.
    pub fn tables_for_page(&self, page: u32) -> Vec<&TableGrid> {
        self.records.iter().filter(|r| r.page == page).map(|r| &r.table).collect()
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_same_page_tables_in_file_order() {
        let store: TableStore = TableStore::from_records(
            serde_json::from_str(
                r#"[
                    {"page": 4, "table": [["A", "B"], ["1", null]]},
                    {"page": 5, "table": [["X"]]},
                    {"page": 4, "table": [["C"]]}
                ]"#,
            )
            .unwrap(),
        );
        let tables = store.tables_for_page(4);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0][1][1], None);
        assert_eq!(tables[1][0][0].as_deref(), Some("C"));
        assert!(store.tables_for_page(9).is_empty());
        assert_eq!(store.len(), 3);
    }
}
