//! JSON -> PDF object conversion
//!
//! JSON values map onto PDF objects directly. A bare JSON string is a name,
//! since names are what grammar predicates compare against most. The other
//! kinds JSON cannot express are single-key wrapper objects:
//!
//! - `{"name": "Page"}` a name (same as `"Page"`)
//! - `{"string": "text"}` a literal string, `{"hex": "0A1B"}` a hex string
//! - `{"stream": {...}}` a stream with the given dictionary
//! - `{"indirect": ..., "id": 12}` an object reached through `12 0 R`; the
//!   id is optional and numbered automatically when left out

use serde_json::{Map, Value};

use super::CliError;
use crate::Object;

/// Convert serde_json::Value to a PDF object
pub fn json_to_object(v: Value) -> Result<Object, CliError> {
    Converter { next_id: 1 }.convert(v)
}

struct Converter {
    next_id: u32,
}

impl Converter {
    fn convert(&mut self, v: Value) -> Result<Object, CliError> {
        Ok(match v {
            Value::Null => Object::Null,
            Value::Bool(b) => Object::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Object::integer(i),
                None => Object::real(
                    n.as_f64()
                        .ok_or_else(|| CliError::InvalidObject(format!("number {} out of range", n)))?,
                ),
            },
            Value::String(s) => Object::name(s),
            Value::Array(arr) => Object::Array(
                arr.into_iter()
                    .map(|item| self.convert(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(obj) => self.convert_map(obj)?,
        })
    }

    fn convert_map(&mut self, mut obj: Map<String, Value>) -> Result<Object, CliError> {
        if obj.contains_key("indirect") && obj.keys().all(|k| k == "indirect" || k == "id") {
            let id = match obj.remove("id") {
                Some(id) => id
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| CliError::InvalidObject(format!("indirect id must be an object number, found {}", id)))?,
                None => self.next_id,
            };
            self.next_id = self.next_id.max(id) + 1;
            let target = obj.remove("indirect").unwrap_or(Value::Null);
            return Ok(Object::indirect(id, self.convert(target)?));
        }

        if obj.len() == 1 {
            let wrapped = match obj.iter().next() {
                Some((k, Value::String(s))) if k == "name" => Some(Object::name(s.as_str())),
                Some((k, Value::String(s))) if k == "string" => Some(Object::string(s.as_str())),
                Some((k, Value::String(s))) if k == "hex" => Some(Object::hex_string(s.as_str())),
                Some((k, Value::Object(_))) if k == "stream" => None,
                Some((k, other)) if k == "stream" => {
                    return Err(CliError::InvalidObject(format!("stream expects a dictionary, found {}", other)));
                }
                _ => None,
            };
            if let Some(object) = wrapped {
                return Ok(object);
            }
            if let Some(dict @ Value::Object(_)) = obj.remove("stream") {
                return Ok(Object::stream(self.convert(dict)?));
            }
        }

        let entries = obj
            .into_iter()
            .map(|(k, v)| Ok((k, self.convert(v)?)))
            .collect::<Result<Vec<_>, CliError>>()?;
        Ok(Object::Dictionary(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectType, PdfObject};
    use serde_json::json;

    #[test]
    fn test_names_and_strings() {
        assert_eq!(json_to_object(json!("Page")).unwrap(), Object::name("Page"));
        assert_eq!(json_to_object(json!({"name": "Page"})).unwrap(), Object::name("Page"));
        assert_eq!(json_to_object(json!({"string": "Page"})).unwrap(), Object::string("Page"));
        assert_eq!(json_to_object(json!({"hex": "AB"})).unwrap(), Object::hex_string("AB"));
    }

    #[test]
    fn test_wrappers() {
        let stream = json_to_object(json!({"stream": {"Length": 12}})).unwrap();
        assert_eq!(stream.object_type(), ObjectType::Stream);

        let reference = json_to_object(json!({"indirect": {"Type": "Font"}, "id": 7})).unwrap();
        assert!(reference.is_indirect());
        assert_eq!(reference.hash_id(), "7 0 R");
    }

    #[test]
    fn test_indirect_ids_are_numbered() {
        let arr = json_to_object(json!([{"indirect": 1}, {"indirect": 2}])).unwrap();
        let ids: Vec<String> = (0..2).filter_map(|i| arr.array_get(i)).map(PdfObject::hash_id).collect();
        assert_eq!(ids, vec!["1 0 R", "2 0 R"]);
    }

    #[test]
    fn test_dictionary_keys_are_not_wrappers() {
        let dict = json_to_object(json!({"name": "X", "Type": "Font"})).unwrap();
        assert_eq!(dict.object_type(), ObjectType::Dictionary);
        assert_eq!(dict.dict_get("name").and_then(PdfObject::name), Some("X"));
    }

    #[test]
    fn test_bad_wrappers() {
        assert!(matches!(
            json_to_object(json!({"indirect": 1, "id": -1})),
            Err(CliError::InvalidObject(_))
        ));
        assert!(matches!(json_to_object(json!({"stream": 3})), Err(CliError::InvalidObject(_))));
    }
}
