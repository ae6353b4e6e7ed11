use super::{ColumnType, TypeConvert, base_type};

/// SQLite type converter, following the column affinity rules where they apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypeConvert;

impl TypeConvert for SqliteTypeConvert {
    fn convert_type(
        &self,
        raw_type: &str,
        _precision: Option<u32>,
        _scale: Option<u32>,
        _length: Option<u32>,
    ) -> ColumnType {
        let t = base_type(raw_type);
        if t.is_empty() {
            return ColumnType::String;
        }

        if t.starts_with("bool") {
            ColumnType::Boolean
        } else if t.contains("int") {
            ColumnType::Long
        } else if t.contains("char") || t.contains("clob") || t.contains("text") {
            ColumnType::String
        } else if t.contains("blob") {
            ColumnType::Bytes
        } else if t.contains("real") || t.contains("floa") || t.contains("doub") {
            ColumnType::Double
        } else if t.contains("numeric") || t.contains("decimal") {
            ColumnType::Decimal
        } else if t.contains("datetime") || t.contains("timestamp") {
            ColumnType::Timestamp
        } else if t == "date" {
            ColumnType::Date
        } else {
            ColumnType::String
        }
    }

    fn convert_to_db(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::String => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer | ColumnType::Long => "INTEGER",
            ColumnType::Float | ColumnType::Double => "REAL",
            ColumnType::Decimal => "NUMERIC",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TEXT",
            ColumnType::Timestamp => "DATETIME",
            ColumnType::Bytes => "BLOB",
        }
    }
}
