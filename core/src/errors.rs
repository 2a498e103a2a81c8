//! The errors produced by slackmoji.
//!
//! [`MissingFieldError`] and [`InvalidCodepointError`] abort a whole run,
//! except while fetching, where a bad code point is just another
//! [`FetchError`]. A [`FetchError`] only ever affects the one asset it was
//! raised for.
use std::{error::Error as StdError, fmt, io, path::PathBuf};

use thiserror::Error;

/// slackmoji hit an error it can't continue past.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SlackmojiError {
    /// An input file couldn't be read or parsed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// A record was missing `short_name` or `unified`.
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    /// A `unified` value contained something other than hex code points.
    #[error(transparent)]
    InvalidCodepoint(#[from] InvalidCodepointError),
    /// An output file couldn't be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// An error encountered while loading emoji data or a theme header.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Unable to read the file.
    #[error("failed to read from {}: {}", .0.display(), .1)]
    FailedToRead(PathBuf, io::Error),
    /// The file wasn't the JSON we expected.
    #[error("failed to parse emoji data from {}: {}", .0.display(), .1)]
    MalformedJson(PathBuf, serde_json::Error),
    /// The theme header TOML didn't parse.
    #[error("failed to parse theme header from {}: {}", .0.display(), .1)]
    MalformedHeader(PathBuf, toml::de::Error),
}

/// Unable to write an output file.
#[derive(Debug, Error)]
#[error("failed to write to {}: {}", .0.display(), .1)]
pub struct WriteError(pub(crate) PathBuf, pub(crate) io::Error);

/// A record didn't have a required string field.
#[derive(Debug, Error)]
#[error("record #{position} has no string field \"{field}\"")]
pub struct MissingFieldError {
    pub(crate) position: usize,
    pub(crate) field: &'static str,
}

impl MissingFieldError {
    pub(crate) const fn new(position: usize, field: &'static str) -> Self {
        MissingFieldError { position, field }
    }

    /// Zero-based position of the offending record in the input.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The name of the missing field.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }
}

/// A token in a `unified` value wasn't a usable code point.
#[derive(Debug, Error)]
#[error("invalid code point \"{token}\" in \"{unified}\": {reason}")]
pub struct InvalidCodepointError {
    pub(crate) unified: String,
    pub(crate) token: String,
    pub(crate) reason: InvalidCodepointReason,
}

impl InvalidCodepointError {
    pub(crate) fn new(
        unified: impl Into<String>,
        token: impl Into<String>,
        reason: InvalidCodepointReason,
    ) -> Self {
        InvalidCodepointError {
            unified: unified.into(),
            token: token.into(),
            reason,
        }
    }

    /// The whole `unified` value the bad token came from.
    #[inline]
    #[must_use]
    pub fn unified(&self) -> &str {
        &self.unified
    }

    /// The bad token.
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Why the token was rejected.
    #[inline]
    #[must_use]
    pub const fn reason(&self) -> InvalidCodepointReason {
        self.reason
    }
}

/// Why a code point token was rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InvalidCodepointReason {
    /// Nothing between two hyphens (or at either end).
    Empty,
    /// Contains a character that isn't a hex digit.
    NotHex,
    /// Valid hex, but not a Unicode scalar value (a surrogate, or above
    /// U+10FFFF).
    NotScalarValue,
}

impl fmt::Display for InvalidCodepointReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvalidCodepointReason::Empty => "empty token",
            InvalidCodepointReason::NotHex => "not hexadecimal",
            InvalidCodepointReason::NotScalarValue => {
                "not a Unicode scalar value"
            },
        })
    }
}

/// Fetching a single asset failed. The rest of the pass carries on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The record's `unified` can't be used as a file name, so nothing was
    /// requested.
    #[error("refusing to fetch: {0}")]
    InvalidTarget(#[from] InvalidCodepointError),
    /// The request never got a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// What the transport reported.
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The server answered with something other than 2xx.
    #[error("{url} responded with HTTP {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: i32,
    },
    /// The response arrived but couldn't be saved.
    #[error("failed to save {}: {source}", path.display())]
    Write {
        /// Where the asset was going to live.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl FetchError {
    /// Wrap any transport error.
    pub fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        FetchError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }
}
