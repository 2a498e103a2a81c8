use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{LoadError, MissingFieldError};

pub(crate) const SHORT_NAME: &str = "short_name";
pub(crate) const UNIFIED: &str = "unified";

/// One entry of Slack's emoji metadata.
///
/// Only `short_name` and `unified` are interpreted; every other field is kept
/// as-is, in its original order, so records can be written back out without
/// losing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmojiRecord(Map<String, Value>);

impl EmojiRecord {
    /// Create a record with just the two fields slackmoji cares about.
    pub fn new(
        short_name: impl Into<String>,
        unified: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert(SHORT_NAME.to_owned(), Value::String(short_name.into()));
        fields.insert(UNIFIED.to_owned(), Value::String(unified.into()));
        EmojiRecord(fields)
    }

    /// The record's short name (`"grinning"`), if it has one.
    #[inline]
    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.string_field(SHORT_NAME)
    }

    /// The record's hyphen-joined code points (`"1F600"`), if it has them.
    #[inline]
    #[must_use]
    pub fn unified(&self) -> Option<&str> {
        self.string_field(UNIFIED)
    }

    /// Look up any field of the record.
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Add or replace a field. Returns the previous value, if any.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    fn string_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Fetch a string field the caller can't do without; `position` is only
    /// used to point at the record in the error.
    pub(crate) fn require(
        &self,
        field: &'static str,
        position: usize,
    ) -> Result<&str, MissingFieldError> {
        self.string_field(field)
            .ok_or_else(|| MissingFieldError::new(position, field))
    }

    pub(crate) fn set_unified(&mut self, unified: String) {
        self.0.insert(UNIFIED.to_owned(), Value::String(unified));
    }
}

/// Load the array of emoji records in `emoji_pretty.json` format, preserving
/// their order.
pub fn load_records(
    path: impl AsRef<Path>,
) -> Result<Vec<EmojiRecord>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|io_err| LoadError::FailedToRead(path.to_owned(), io_err))?;
    let records: Vec<EmojiRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|json_err| {
            LoadError::MalformedJson(path.to_owned(), json_err)
        })?;
    log::debug!(
        "loaded {} emoji records from {}",
        records.len(),
        path.display(),
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keeps_unknown_fields_in_order() {
        let record: EmojiRecord = serde_json::from_value(json!({
            "name": "GRINNING FACE",
            "unified": "1F600",
            "image": "1f600.png",
            "short_name": "grinning",
        }))
        .unwrap();
        assert_eq!(record.short_name(), Some("grinning"));
        assert_eq!(record.unified(), Some("1F600"));

        let out = serde_json::to_string(&record).unwrap();
        assert_eq!(
            out,
            r#"{"name":"GRINNING FACE","unified":"1F600","image":"1f600.png","short_name":"grinning"}"#,
        );
    }

    #[test]
    fn non_string_fields_are_missing() {
        let record: EmojiRecord =
            serde_json::from_value(json!({ "short_name": 3, "unified": null }))
                .unwrap();
        assert_eq!(record.short_name(), None);
        let err = record.require(UNIFIED, 7).unwrap_err();
        assert_eq!(err.position(), 7);
        assert_eq!(err.field(), "unified");
    }

    #[test]
    fn load_rejects_non_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emoji_pretty.json");
        std::fs::write(&path, r#"{"short_name": "grinning"}"#).unwrap();
        assert!(matches!(
            load_records(&path),
            Err(LoadError::MalformedJson(..))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_records(dir.path().join("nope.json")),
            Err(LoadError::FailedToRead(..))
        ));
    }
}
