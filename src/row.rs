//! Result row shaping.

use crate::error::{QbError, QbResult};
use crate::value::Value;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tokio_postgres::Row as PgRow;
use tokio_postgres::types::Type;

/// An ordered mapping from column name to scalar value.
///
/// Column order follows the backend's own column order for the statement
/// (the requested column list, or the table's column order for `*`).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cols: Vec<(String, Value)>,
}

/// A materialized, finite sequence of rows.
pub type ResultSet = Vec<Row>;

impl Row {
    /// Build a row from name/value pairs, preserving their order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            cols: pairs.into_iter().collect(),
        }
    }

    /// Materialize a driver row.
    pub fn from_pg(row: &PgRow) -> QbResult<Self> {
        let mut cols = Vec::with_capacity(row.len());
        for (idx, col) in row.columns().iter().enumerate() {
            let value = decode(row, idx, col.type_())
                .map_err(|message| QbError::decode(col.name(), message))?;
            cols.push((col.name().to_string(), value));
        }
        Ok(Self { cols })
    }

    /// Look up a value by column name (first match wins).
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cols
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in backend order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cols.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over (name, value) pairs in backend order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cols.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.cols.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }
}

fn decode(row: &PgRow, idx: usize, ty: &Type) -> Result<Value, String> {
    fn get<'a, T>(row: &'a PgRow, idx: usize) -> Result<Option<T>, String>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        row.try_get::<_, Option<T>>(idx).map_err(|e| e.to_string())
    }

    let value = if *ty == Type::BOOL {
        get::<bool>(row, idx)?.map(Value::Bool)
    } else if *ty == Type::INT2 {
        get::<i16>(row, idx)?.map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT4 {
        get::<i32>(row, idx)?.map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT8 {
        get::<i64>(row, idx)?.map(Value::Int)
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, idx)?.map(|v| Value::Float(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, idx)?.map(Value::Float)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        get::<String>(row, idx)?.map(Value::Text)
    } else {
        return Err(format!("unsupported column type '{}'", ty.name()));
    };
    Ok(value.unwrap_or(Value::Null))
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cols.len()))?;
        for (name, value) in &self.cols {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_pairs([
            ("id".to_string(), Value::Int(5)),
            ("name".to_string(), Value::Text("bob".to_string())),
            ("score".to_string(), Value::Float(1.5)),
        ])
    }

    #[test]
    fn get_by_name() {
        let row = sample();
        assert_eq!(row.get("name"), Some(&Value::Text("bob".to_string())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn preserves_column_order() {
        let row = sample();
        let names: Vec<&str> = row.columns().collect();
        assert_eq!(names, vec!["id", "name", "score"]);
    }

    #[test]
    fn serializes_as_json_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"id":5,"name":"bob","score":1.5}"#);
    }
}
