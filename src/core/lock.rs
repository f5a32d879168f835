use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EXPORT_FILE_NAME: &str = "characters.json";

/// Aggregate produced by one batch run: `{ "character_lock": { "CHAR_1": {...}, ... } }`.
///
/// Keys and record fields keep insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CharacterLock {
    pub character_lock: Map<String, Value>,
}

pub fn lock_key(position: usize) -> String {
    format!("CHAR_{}", position)
}

impl CharacterLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, record: Map<String, Value>) {
        self.character_lock.insert(key, Value::Object(record));
    }

    pub fn get(&self, key: &str) -> Option<&Map<String, Value>> {
        self.character_lock.get(key).and_then(Value::as_object)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.character_lock.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.character_lock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.character_lock.is_empty()
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize character lock")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse character lock JSON")
    }
}

/// Success record: `id` and `name` first, then the model's fields minus any
/// `id`/`name` it returned.
pub fn profile_record(key: &str, name: &str, fields: Map<String, Value>) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(key.to_string()));
    record.insert("name".to_string(), Value::String(name.to_string()));
    for (field, value) in fields {
        if field == "id" || field == "name" {
            continue;
        }
        record.insert(field, value);
    }
    record
}

pub fn error_record(key: &str, name: &str, error: &str) -> Map<String, Value> {
    let error = if error.trim().is_empty() {
        "Unknown error"
    } else {
        error
    };
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(key.to_string()));
    record.insert("name".to_string(), Value::String(name.to_string()));
    record.insert("error".to_string(), Value::String(error.to_string()));
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_profile_record_puts_id_and_name_first() {
        let fields = object(json!({ "species": "Human", "gender": "Female" }));
        let record = profile_record("CHAR_1", "Alice", fields);

        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "species", "gender"]);
    }

    #[test]
    fn test_profile_record_ignores_model_id_and_name() {
        let fields = object(json!({ "id": "X", "species": "Elf", "name": "Wrong", "mood": "calm" }));
        let record = profile_record("CHAR_2", "Bob", fields);

        assert_eq!(record["id"], "CHAR_2");
        assert_eq!(record["name"], "Bob");
        assert_eq!(record["species"], "Elf");
        // Unexpected fields pass through untouched.
        assert_eq!(record["mood"], "calm");
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_error_record_never_has_empty_message() {
        let record = error_record("CHAR_3", "Eve", "  ");
        assert_eq!(record["error"], "Unknown error");
        let record = error_record("CHAR_3", "Eve", "timeout");
        assert_eq!(record["error"], "timeout");
    }

    #[test]
    fn test_export_reparses_to_same_lock() {
        let mut lock = CharacterLock::new();
        lock.insert(
            lock_key(1),
            profile_record("CHAR_1", "Alice", object(json!({ "species": "Human" }))),
        );
        lock.insert(lock_key(2), error_record("CHAR_2", "Bob", "timeout"));

        let text = lock.to_pretty_json().unwrap();
        assert!(text.starts_with("{\n  \"character_lock\": {\n    \"CHAR_1\": {\n      \"id\": \"CHAR_1\""));

        let parsed = CharacterLock::from_json(&text).unwrap();
        assert_eq!(parsed, lock);
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["CHAR_1", "CHAR_2"]);
    }
}
