use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{
    EmojiRecord,
    codepoints,
    errors::{LoadError, SlackmojiError, WriteError},
    record::{SHORT_NAME, UNIFIED},
};

/// Emoji records keyed by short name, with `unified` zero-padded to
/// [`PADDED_WIDTH`](codepoints::PADDED_WIDTH).
///
/// This is what gets written to `simple_emoji.json`.
///
/// Iteration follows the order each short name was first seen in. When
/// several records share a short name, the last one wins but it stays in the
/// first one's position:
///
/// ```
/// # use slackmoji::{EmojiIndex, EmojiRecord};
/// let index = EmojiIndex::build([
///     EmojiRecord::new("smile", "1F604"),
///     EmojiRecord::new("snail", "1F40C"),
///     EmojiRecord::new("smile", "1F642"),
/// ])
/// .unwrap();
/// let names: Vec<_> = index.short_names().collect();
/// assert_eq!(names, ["smile", "snail"]);
/// assert_eq!(index.get("smile").unwrap().unified(), Some("0001F642"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmojiIndex {
    entries: IndexMap<String, EmojiRecord>,
}

impl EmojiIndex {
    /// Index `records` by short name, then pad every surviving `unified`.
    ///
    /// Fails on the first record missing `short_name` or `unified`, or the
    /// first `unified` that isn't hex; nothing is skipped.
    pub fn build(
        records: impl IntoIterator<Item = EmojiRecord>,
    ) -> Result<Self, SlackmojiError> {
        let mut entries = records.into_iter().enumerate().try_fold(
            IndexMap::new(),
            |mut entries, (position, record)| -> Result<_, SlackmojiError> {
                let short_name =
                    record.require(SHORT_NAME, position)?.to_owned();
                record.require(UNIFIED, position)?;
                // IndexMap::insert keeps the original slot for existing keys
                if let Some(previous) = entries.insert(short_name, record) {
                    log::debug!(
                        "record #{position} replaces earlier {:?}",
                        previous.short_name().unwrap_or_default(),
                    );
                }
                Ok(entries)
            },
        )?;

        entries
            .values_mut()
            .try_for_each(|record| -> Result<(), SlackmojiError> {
                // Presence was checked on the way in
                let unified = record.unified().unwrap_or_default();
                let padded = codepoints::zero_pad(unified)?;
                record.set_unified(padded);
                Ok(())
            })?;

        log::info!("indexed {} emoji", entries.len());
        Ok(EmojiIndex { entries })
    }

    /// Load a previously saved index (`simple_emoji.json`) as-is.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|io_err| {
            LoadError::FailedToRead(path.to_owned(), io_err)
        })?;
        let entries = serde_json::from_reader(BufReader::new(file)).map_err(
            |json_err| LoadError::MalformedJson(path.to_owned(), json_err),
        )?;
        Ok(EmojiIndex { entries })
    }

    /// Write the index as JSON, pretty-printed with four-space indents.
    pub fn write_json(&self, writer: impl Write) -> io::Result<()> {
        let mut serializer = Serializer::with_formatter(
            writer,
            PrettyFormatter::with_indent(b"    "),
        );
        self.entries.serialize(&mut serializer)?;
        serializer.into_inner().flush()
    }

    /// Write the index to `path`, replacing whatever was there.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        let path = path.as_ref();
        File::create(path)
            .and_then(|file| self.write_json(BufWriter::new(file)))
            .map_err(|io_err| WriteError(path.to_owned(), io_err))?;
        log::info!("wrote {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Look up a record by short name.
    #[inline]
    #[must_use]
    pub fn get(&self, short_name: &str) -> Option<&EmojiRecord> {
        self.entries.get(short_name)
    }

    /// Iterate through `(short name, record)` pairs in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &EmojiRecord)> {
        self.entries
            .iter()
            .map(|(short_name, record)| (short_name.as_str(), record))
    }

    /// Iterate through the short names in index order.
    pub fn short_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Get how many distinct short names there are.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
