//! Text protocol result sets.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::lenenc;

/// Server-side limit on the columns of one table or result set
pub const MAX_COLUMNS: usize = 4096;

/// A fully buffered text-protocol result set.
///
/// Cells keep the server's textual representation; `None` is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, checking its width against the column list.
    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::protocol(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column name -> position. Later duplicates win.
    pub fn column_indexes(&self) -> HashMap<&str, usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Extract the column name from a column definition packet (protocol 4.1).
///
/// Layout: catalog, schema, table, org_table, name, org_name, ...
pub fn parse_column_name(payload: &[u8]) -> Result<String> {
    let mut buf = payload;
    for field in ["catalog", "schema", "table", "org_table"] {
        lenenc::read_bytes(&mut buf)
            .ok_or_else(|| Error::protocol(format!("truncated column definition ({})", field)))?;
    }
    match lenenc::read_bytes(&mut buf) {
        Some(Some(name)) => Ok(String::from_utf8_lossy(name).to_string()),
        Some(None) => Err(Error::protocol("column definition has NULL name")),
        None => Err(Error::protocol("truncated column definition (name)")),
    }
}

/// Decode one text-protocol row with `width` cells.
pub fn parse_row(payload: &[u8], width: usize) -> Result<Vec<Option<String>>> {
    if width > MAX_COLUMNS {
        return Err(Error::protocol(format!("row width {} exceeds {}", width, MAX_COLUMNS)));
    }
    let mut buf = payload;
    let mut row = Vec::with_capacity(width);
    for i in 0..width {
        let cell = lenenc::read_bytes(&mut buf)
            .ok_or_else(|| Error::protocol(format!("truncated row at column {}", i)))?;
        row.push(cell.map(|bytes| String::from_utf8_lossy(bytes).to_string()));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn column_definition(name: &str) -> BytesMut {
        let mut buf = BytesMut::new();
        lenenc::write_bytes(&mut buf, Some(b"def"));
        lenenc::write_bytes(&mut buf, Some(b""));
        lenenc::write_bytes(&mut buf, Some(b""));
        lenenc::write_bytes(&mut buf, Some(b""));
        lenenc::write_bytes(&mut buf, Some(name.as_bytes()));
        lenenc::write_bytes(&mut buf, Some(name.as_bytes()));
        buf.extend_from_slice(&[0x0c, 0x21, 0, 0, 0, 0, 0xfd, 0, 0, 0, 0, 0]);
        buf
    }

    #[test]
    fn test_parse_column_name() {
        let def = column_definition("Seconds_Behind_Master");
        assert_eq!(parse_column_name(&def).unwrap(), "Seconds_Behind_Master");
        assert!(parse_column_name(&def[..3]).is_err());
    }

    #[test]
    fn test_parse_row_with_null() {
        let mut buf = BytesMut::new();
        lenenc::write_bytes(&mut buf, Some(b"Yes"));
        lenenc::write_bytes(&mut buf, None);
        let row = parse_row(&buf, 2).unwrap();
        assert_eq!(row, vec![Some("Yes".to_string()), None]);
        assert!(parse_row(&buf, 3).is_err());
    }

    #[test]
    fn test_parse_row_rejects_oversized_width() {
        let err = parse_row(&[], 1 << 40).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut rs = ResultSet::new(vec!["a".into(), "b".into()]);
        assert!(rs.push_row(vec![None]).is_err());
        rs.push_row(vec![None, Some("1".into())]).unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.column_indexes()["b"], 1);
    }
}
