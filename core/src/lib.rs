#![cfg_attr(docsrs, feature(doc_cfg))]
//! slackmoji turns Slack's emoji metadata (`emoji_pretty.json`, an array of
//! emoji records) into the things a chat client needs to show those emoji:
//!
//! - an [`EmojiIndex`]: the records keyed by short name, with `unified` code
//!   points zero-padded, saved as `simple_emoji.json`;
//! - a Pidgin smiley [`Theme`], mapping each image file name to the literal
//!   glyphs it replaces;
//! - a local copy of Slack's PNG artwork, kept up to date by an
//!   [`AssetFetcher`];
//! - a [`SlackcodeTable`] for translating `:short_name:` codes in message text
//!   to glyphs and back.
//!
//! Each of these reads the emoji records independently; none of them depends
//! on another's output except the [`SlackcodeTable`], which is built from an
//! [`EmojiIndex`].
//!
//! ```
//! # use slackmoji::{EmojiIndex, EmojiRecord, Theme, ThemeHeader};
//! let records = vec![
//!     EmojiRecord::new("snail", "1F40C"),
//!     EmojiRecord::new("flag-ad", "1F1E6-1F1E9"),
//! ];
//!
//! let theme = Theme::build(ThemeHeader::default(), &records).unwrap();
//! assert_eq!(theme.lines()[0].to_string(), "1F40C.png\t🐌");
//!
//! let index = EmojiIndex::build(records).unwrap();
//! assert_eq!(index.get("snail").unwrap().unified(), Some("0001F40C"));
//! ```

use std::fmt;

pub use fetch::{
    AssetFetcher, AssetSource, AssetTarget, DEFAULT_BASE_URL, FetchOutcome,
    FetchReport,
};
#[cfg(feature = "http")]
pub use fetch::HttpSource;
pub use index::EmojiIndex;
pub use record::{EmojiRecord, load_records};
pub use slackcode::SlackcodeTable;
pub use theme::{THEME_FILE_NAME, Theme, ThemeHeader, ThemeLine};

pub mod codepoints;
pub mod errors;
mod fetch;
mod index;
mod record;
mod slackcode;
mod theme;

/// Where the emoji metadata is read from by default.
pub const EMOJI_DATA_FILE: &str = "emoji_pretty.json";

/// Where the [`EmojiIndex`] is saved by default.
pub const INDEX_FILE: &str = "simple_emoji.json";

/// The artwork sizes Slack publishes. Each gets its own output directory,
/// named after [`Size::as_str`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Size {
    /// Slack's `google-medium` set.
    Medium,
    /// Slack's `google-large` set.
    Large,
}

impl Size {
    /// Every size, in the order outputs are produced.
    pub const ALL: [Size; 2] = [Size::Medium, Size::Large];

    /// The size's name, as used in directory names and asset URLs.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
