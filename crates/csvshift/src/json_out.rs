use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::options::JsonShape;

pub const JSON_MIME: &str = "application/json";

/// Builds the JSON document for a table. Cell values always stay strings.
pub(crate) fn rows_to_json_value(rows: &[Vec<String>], has_header: bool, shape: JsonShape) -> Value {
    match shape {
        JsonShape::Arrays => Value::Array(
            rows.iter()
                .map(|row| Value::Array(row.iter().cloned().map(Value::String).collect()))
                .collect(),
        ),
        JsonShape::Objects => Value::Array(rows_to_objects(rows, has_header)),
    }
}

fn rows_to_objects(rows: &[Vec<String>], has_header: bool) -> Vec<Value> {
    let Some((headers, data_rows)) = rows.split_first().filter(|_| has_header) else {
        return rows.iter().map(|row| positional_object(row)).collect();
    };

    let keys = headers
        .iter()
        .map(|header| header.trim().to_string())
        .collect::<Vec<_>>();

    data_rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (index, key) in keys.iter().enumerate() {
                let value = row.get(index).cloned().unwrap_or_default();
                object.insert(key.clone(), Value::String(value));
            }
            Value::Object(object)
        })
        .collect()
}

fn positional_object(row: &[String]) -> Value {
    let object = row
        .iter()
        .enumerate()
        .map(|(index, cell)| (format!("column{}", index + 1), Value::String(cell.clone())))
        .collect::<Map<_, _>>();
    Value::Object(object)
}

pub(crate) fn write_json(
    rows: &[Vec<String>],
    has_header: bool,
    shape: JsonShape,
    pretty: bool,
) -> Result<String, ConvertError> {
    let value = rows_to_json_value(rows, has_header, shape);
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::write_json;
    use crate::options::JsonShape;

    fn rows(input: &[&[&str]]) -> Vec<Vec<String>> {
        input
            .iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect()
    }

    #[test]
    fn keys_objects_by_header_in_order() {
        let table = rows(&[&["Name", "Age"], &["John", "30"]]);
        let json = write_json(&table, true, JsonShape::Objects, false).expect("json");
        assert_eq!(json, r#"[{"Name":"John","Age":"30"}]"#);
    }

    #[test]
    fn emits_arrays_verbatim() {
        let table = rows(&[&["Name", "Age"], &["John", "30"]]);
        let json = write_json(&table, true, JsonShape::Arrays, false).expect("json");
        assert_eq!(json, r#"[["Name","Age"],["John","30"]]"#);
    }

    #[test]
    fn trims_header_keys_and_fills_missing_cells() {
        let table = rows(&[&[" id ", "zip"], &["7"]]);
        let json = write_json(&table, true, JsonShape::Objects, false).expect("json");
        assert_eq!(json, r#"[{"id":"7","zip":""}]"#);
    }

    #[test]
    fn synthesizes_positional_keys_without_header() {
        let table = rows(&[&["a", "007"], &["b"]]);
        let json = write_json(&table, false, JsonShape::Objects, false).expect("json");
        assert_eq!(json, r#"[{"column1":"a","column2":"007"},{"column1":"b"}]"#);
    }

    #[test]
    fn duplicate_header_keeps_first_position_and_last_value() {
        let table = rows(&[&["k", "x", "k"], &["1", "2", "3"]]);
        let json = write_json(&table, true, JsonShape::Objects, false).expect("json");
        assert_eq!(json, r#"[{"k":"3","x":"2"}]"#);
    }

    #[test]
    fn pretty_prints_with_two_spaces() {
        let table = rows(&[&["a"], &["1"]]);
        let json = write_json(&table, true, JsonShape::Objects, true).expect("json");
        assert_eq!(json, "[\n  {\n    \"a\": \"1\"\n  }\n]");
    }
}
