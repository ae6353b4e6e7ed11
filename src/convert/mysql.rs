use super::{ColumnType, TypeConvert, base_type};

/// MySQL/MariaDB type converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlTypeConvert;

impl TypeConvert for MySqlTypeConvert {
    fn convert_type(
        &self,
        raw_type: &str,
        _precision: Option<u32>,
        _scale: Option<u32>,
        length: Option<u32>,
    ) -> ColumnType {
        let raw = raw_type.trim().to_lowercase();
        let t = base_type(&raw);
        if t.is_empty() {
            return ColumnType::String;
        }

        let head = t.split_whitespace().next().unwrap_or_default();
        // tinyint(1) is the conventional boolean
        let tiny_bool =
            head == "tinyint" && (raw.starts_with("tinyint(1)") || length == Some(1));

        if t.contains("decimal") || t.contains("numeric") {
            ColumnType::Decimal
        } else if head == "bigint" || head == "int8" {
            ColumnType::Long
        } else if t.contains("float") {
            ColumnType::Float
        } else if t.contains("double") || t.starts_with("real") {
            ColumnType::Double
        } else if t.starts_with("bool") || tiny_bool || t.starts_with("bit") {
            ColumnType::Boolean
        } else if t.contains("datetime") || t.contains("timestamp") {
            ColumnType::Timestamp
        } else if t.contains("date") {
            ColumnType::Date
        } else if t.contains("time") {
            ColumnType::Time
        } else if t.starts_with("year") {
            ColumnType::Integer
        } else if t.contains("char")
            || t.contains("text")
            || t.starts_with("enum")
            || t.starts_with("set")
            || t.starts_with("json")
        {
            ColumnType::String
        } else if t.contains("binary") || t.contains("blob") {
            ColumnType::Bytes
        } else if matches!(
            head,
            "tinyint"
                | "smallint"
                | "mediumint"
                | "middleint"
                | "int"
                | "integer"
                | "int1"
                | "int2"
                | "int3"
                | "int4"
        ) {
            ColumnType::Integer
        } else {
            ColumnType::String
        }
    }

    fn convert_to_db(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::String => "varchar",
            ColumnType::Boolean => "tinyint",
            ColumnType::Integer => "int",
            ColumnType::Long => "bigint",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::Decimal => "decimal",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "datetime",
            ColumnType::Bytes => "blob",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;

    fn convert(raw: &str) -> ColumnType {
        MySqlTypeConvert.convert_type(raw, None, None, None)
    }

    #[test]
    fn test_integer_family() {
        assert_eq!(convert("bigint"), ColumnType::Long);
        assert_eq!(convert("bigint unsigned"), ColumnType::Long);
        assert_eq!(convert("int"), ColumnType::Integer);
        assert_eq!(convert("INT(11)"), ColumnType::Integer);
        assert_eq!(convert("mediumint"), ColumnType::Integer);
        assert_eq!(convert("smallint"), ColumnType::Integer);
        assert_eq!(convert("tinyint"), ColumnType::Integer);
        assert_eq!(convert("year"), ColumnType::Integer);
        assert_eq!(convert("int4"), ColumnType::Integer);
        assert_eq!(convert("int8"), ColumnType::Long);
    }

    #[test]
    fn test_boolean_family() {
        assert_eq!(convert("tinyint(1)"), ColumnType::Boolean);
        assert_eq!(convert("boolean"), ColumnType::Boolean);
        assert_eq!(convert("bit(1)"), ColumnType::Boolean);
        assert_eq!(
            MySqlTypeConvert.convert_type("tinyint", None, None, Some(1)),
            ColumnType::Boolean
        );
    }

    #[test]
    fn test_temporal_types() {
        assert_eq!(convert("datetime"), ColumnType::Timestamp);
        assert_eq!(convert("timestamp"), ColumnType::Timestamp);
        assert_eq!(convert("date"), ColumnType::Date);
        assert_eq!(convert("time"), ColumnType::Time);
    }

    #[test]
    fn test_text_and_binary() {
        assert_eq!(convert("varchar(255)"), ColumnType::String);
        assert_eq!(convert("longtext"), ColumnType::String);
        assert_eq!(convert("enum('a','b')"), ColumnType::String);
        assert_eq!(convert("json"), ColumnType::String);
        assert_eq!(convert("varbinary(16)"), ColumnType::Bytes);
        assert_eq!(convert("longblob"), ColumnType::Bytes);
    }

    #[test]
    fn test_unknown_falls_back_to_string() {
        assert_eq!(convert(""), ColumnType::String);
        assert_eq!(convert("geometry"), ColumnType::String);
        assert_eq!(convert("(("), ColumnType::String);
        assert_eq!(convert("point"), ColumnType::String);
        assert_eq!(convert("multipoint"), ColumnType::String);
        assert_eq!(convert("linestring"), ColumnType::String);
    }

    #[test]
    fn test_convert_column_uses_precision() {
        let col = Column::new("amount", "decimal").with_precision(12, 4);
        let column_type = MySqlTypeConvert.convert(&col);
        assert_eq!(column_type, ColumnType::Decimal);
        assert_eq!(column_type.flink_type(col.precision, col.scale), "DECIMAL(12,4)");
    }
}
