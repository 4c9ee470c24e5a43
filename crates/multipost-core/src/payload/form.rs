//! In-memory multipart form container.

use serde_json::Value;

/// Value of one form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A metadata value, passed through untouched.
    Text(Value),
    /// The file bytes.
    File {
        data: Vec<u8>,
        filename: Option<String>,
        content_type: Option<String>,
    },
}

impl FieldValue {
    /// Text rendering of a metadata value as it goes on the wire: JSON strings
    /// are sent raw, everything else as JSON text. `None` for file parts.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(Value::String(s)) => Some(s.clone()),
            FieldValue::Text(v) => Some(v.to_string()),
            FieldValue::File { .. } => None,
        }
    }

    pub fn file_data(&self) -> Option<&[u8]> {
        match self {
            FieldValue::File { data, .. } => Some(data),
            FieldValue::Text(_) => None,
        }
    }
}

/// Ordered list of `(name, value)` pairs; the same name may appear more than once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, FieldValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push((name.into(), value));
    }

    /// First value appended under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.fields
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Total bytes of field values (file bytes plus text renderings); excludes multipart framing.
    pub fn payload_len(&self) -> u64 {
        self.fields
            .iter()
            .map(|(_, v)| match v {
                FieldValue::File { data, .. } => data.len() as u64,
                other => other.as_text().map(|s| s.len() as u64).unwrap_or(0),
            })
            .sum()
    }
}

impl IntoIterator for FormData {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_rendering() {
        assert_eq!(FieldValue::Text(json!("foo")).as_text().as_deref(), Some("foo"));
        assert_eq!(FieldValue::Text(json!(12345)).as_text().as_deref(), Some("12345"));
        assert_eq!(FieldValue::Text(json!(true)).as_text().as_deref(), Some("true"));
        assert_eq!(
            FieldValue::Text(json!({"a": 1})).as_text().as_deref(),
            Some("{\"a\":1}")
        );
        let file = FieldValue::File {
            data: vec![1, 2],
            filename: None,
            content_type: None,
        };
        assert!(file.as_text().is_none());
        assert_eq!(file.file_data(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn repeated_names_keep_order() {
        let mut form = FormData::new();
        form.append("tag", FieldValue::Text(json!("a")));
        form.append("tag", FieldValue::Text(json!("b")));
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("tag"), Some(&FieldValue::Text(json!("a"))));
        let all: Vec<_> = form.get_all("tag").collect();
        assert_eq!(all.len(), 2);
        assert!(!form.contains("other"));
    }
}
