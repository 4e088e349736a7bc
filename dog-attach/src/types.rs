use std::collections::HashMap;

use serde_json::{Map, Value};

/// Raw field storage of the record that owns an attachment.
///
/// Reads and writes go straight to the record's storage; no validation,
/// change tracking or other record-side behavior is expected to run.
pub trait FieldAccess {
    /// Current raw value of `name`
    fn get_field(&self, name: &str) -> Option<String>;

    /// Overwrite the raw value of `name`
    fn set_field(&mut self, name: &str, value: String);
}

/// Only string values name a file; any other JSON value reads as unset
impl FieldAccess for Map<String, Value> {
    fn get_field(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), Value::String(value));
    }
}

impl FieldAccess for HashMap<String, String> {
    fn get_field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), value);
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for &mut T {
    fn get_field(&self, name: &str) -> Option<String> {
        (**self).get_field(name)
    }

    fn set_field(&mut self, name: &str, value: String) {
        (**self).set_field(name, value)
    }
}
