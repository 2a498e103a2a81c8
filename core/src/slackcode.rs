use std::collections::{HashMap, hash_map::Entry};

use crate::{EmojiIndex, codepoints, errors::SlackmojiError, record::UNIFIED};

/// Translates between Slack's `:short_name:` codes and the glyphs they stand
/// for.
///
/// ```
/// # use slackmoji::{EmojiIndex, EmojiRecord, SlackcodeTable};
/// let index = EmojiIndex::build([
///     EmojiRecord::new("baby_bottle", "1F37C"),
///     EmojiRecord::new("baby_chick", "1F424"),
/// ])
/// .unwrap();
/// let table = SlackcodeTable::from_index(&index).unwrap();
/// assert_eq!(table.to_unicode(":baby_bottle::baby_chick:"), "🍼🐤");
/// assert_eq!(table.to_slackcode("🍼🐤"), ":baby_bottle::baby_chick:");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SlackcodeTable {
    by_name: HashMap<String, String>,
    by_glyph: HashMap<String, String>,
    /// Length, in chars, of the longest glyph sequence in `by_glyph`.
    longest_glyph: usize,
}

impl SlackcodeTable {
    /// Build the table from every entry of `index`.
    ///
    /// If two short names decode to the same glyph, the one that comes first
    /// in the index is used when translating glyphs back to codes.
    pub fn from_index(index: &EmojiIndex) -> Result<Self, SlackmojiError> {
        index.iter().enumerate().try_fold(
            SlackcodeTable::default(),
            |mut table,
             (position, (short_name, record))|
             -> Result<_, SlackmojiError> {
                let glyph =
                    codepoints::decode(record.require(UNIFIED, position)?)?;
                table.longest_glyph =
                    table.longest_glyph.max(glyph.chars().count());
                if let Entry::Vacant(entry) = table.by_glyph.entry(glyph.clone())
                {
                    entry.insert(short_name.to_owned());
                }
                table.by_name.insert(short_name.to_owned(), glyph);
                Ok(table)
            },
        )
    }

    /// The glyph for a short name (without colons).
    #[inline]
    #[must_use]
    pub fn glyph(&self, short_name: &str) -> Option<&str> {
        self.by_name.get(short_name).map(String::as_str)
    }

    /// The short name for a glyph sequence.
    #[inline]
    #[must_use]
    pub fn short_name(&self, glyph: &str) -> Option<&str> {
        self.by_glyph.get(glyph).map(String::as_str)
    }

    /// Replace every known `:short_name:` in `text` with its glyph.
    ///
    /// Unknown codes are left alone. A code's closing colon can't be shared
    /// with the next code, but an unknown code's closing colon can still open
    /// a known one: `":nope:smile:"` becomes `":nope😄"`.
    #[must_use]
    pub fn to_unicode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find(':') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let name_end =
                after.find(|ch: char| ch == ':' || ch.is_whitespace());
            match name_end {
                Some(end) if end > 0 && after[end..].starts_with(':') => {
                    let name = &after[..end];
                    match self.by_name.get(name) {
                        Some(glyph) => {
                            out.push_str(glyph);
                            rest = &after[end + 1..];
                        },
                        None => {
                            out.push(':');
                            out.push_str(name);
                            rest = &after[end..];
                        },
                    }
                },
                _ => {
                    out.push(':');
                    rest = after;
                },
            }
        }
        out.push_str(rest);
        out
    }

    /// Replace every known glyph sequence in `text` with its `:short_name:`.
    ///
    /// At each position the longest matching sequence wins, so a flag is
    /// translated as a flag rather than two regional indicators.
    #[must_use]
    pub fn to_slackcode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        'outer: while let Some(first) = rest.chars().next() {
            // Byte offsets where each candidate sequence would end
            let ends = rest
                .char_indices()
                .skip(1)
                .map(|(offset, _)| offset)
                .chain([rest.len()])
                .take(self.longest_glyph)
                .collect::<Vec<_>>();
            for &end in ends.iter().rev() {
                if let Some(short_name) = self.by_glyph.get(&rest[..end]) {
                    out.push(':');
                    out.push_str(short_name);
                    out.push(':');
                    rest = &rest[end..];
                    continue 'outer;
                }
            }
            out.push(first);
            rest = &rest[first.len_utf8()..];
        }
        out
    }

    /// Get how many short names the table knows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if the table knows no emoji.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
