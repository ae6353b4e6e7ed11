use super::{ColumnType, TypeConvert, base_type};

/// PostgreSQL type converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSqlTypeConvert;

impl TypeConvert for PostgreSqlTypeConvert {
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

        if t.starts_with("int8") || t.starts_with("bigint") || t.starts_with("bigserial") {
            ColumnType::Long
        } else if t.starts_with("int2")
            || t.starts_with("int4")
            || t.starts_with("smallint")
            || t.starts_with("smallserial")
            || t.starts_with("serial")
            || t == "int"
            || t == "integer"
        {
            ColumnType::Integer
        } else if t.starts_with("numeric") || t.starts_with("decimal") {
            ColumnType::Decimal
        } else if t.starts_with("float4") || t == "real" {
            ColumnType::Float
        } else if t.starts_with("float8") || t.starts_with("double") {
            ColumnType::Double
        } else if t.starts_with("bool") {
            ColumnType::Boolean
        } else if t.starts_with("timestamp") {
            ColumnType::Timestamp
        } else if t == "date" {
            ColumnType::Date
        } else if t.starts_with("time") {
            ColumnType::Time
        } else if t == "bytea" {
            ColumnType::Bytes
        } else {
            ColumnType::String
        }
    }

    fn convert_to_db(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::String => "varchar",
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Long => "bigint",
            ColumnType::Float => "real",
            ColumnType::Double => "double precision",
            ColumnType::Decimal => "numeric",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Bytes => "bytea",
        }
    }
}
