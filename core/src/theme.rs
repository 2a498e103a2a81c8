use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    EmojiRecord, Size, codepoints,
    errors::{LoadError, SlackmojiError, WriteError},
    record::UNIFIED,
};

/// The name of the theme file written into each size directory.
pub const THEME_FILE_NAME: &str = "theme";

/// The key/value block at the top of a Pidgin theme file.
///
/// Defaults to the Slack theme. Can be overridden from TOML; any key left out
/// keeps its default:
/// ```toml
/// name = "Slack"
/// description = "Slack Emojis ported to pidgin"
/// icon = "1F40C.png"
/// author = "Slack"
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeHeader {
    /// Theme name shown in Pidgin's theme picker.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Image file (relative to the theme) used as the theme's icon.
    pub icon: String,
    /// Who made it.
    pub author: String,
}

impl Default for ThemeHeader {
    fn default() -> Self {
        ThemeHeader {
            name: "Slack".to_owned(),
            description: "Slack Emojis ported to pidgin".to_owned(),
            icon: "1F40C.png".to_owned(),
            author: "Slack".to_owned(),
        }
    }
}

impl ThemeHeader {
    /// Load a header from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|io_err| {
            LoadError::FailedToRead(path.to_owned(), io_err)
        })?;
        toml::from_str(&content).map_err(|toml_err| {
            LoadError::MalformedHeader(path.to_owned(), toml_err)
        })
    }
}

impl fmt::Display for ThemeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ThemeHeader {
            name,
            description,
            icon,
            author,
        } = self;
        writeln!(f, "Name={name}")?;
        writeln!(f, "Description={description}")?;
        writeln!(f, "Icon={icon}")?;
        writeln!(f, "Author={author}")?;
        writeln!(f)?;
        write!(f, "[default]")
    }
}

/// One emoji's entry in the theme: its image file name and the glyph Pidgin
/// should swap it in for.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ThemeLine {
    unified: String,
    glyphs: String,
}

impl ThemeLine {
    /// Build the line for `record`.
    ///
    /// The file name uses `unified` exactly as it appears in the record,
    /// without any padding.
    pub fn from_record(
        record: &EmojiRecord,
        position: usize,
    ) -> Result<Self, SlackmojiError> {
        let unified = record.require(UNIFIED, position)?;
        let glyphs = codepoints::decode(unified)?;
        Ok(ThemeLine {
            unified: unified.to_owned(),
            glyphs,
        })
    }

    /// The image file this line points at, e.g. `1F600.png`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.png", self.unified)
    }

    /// The literal glyph(s).
    #[inline]
    #[must_use]
    pub fn glyphs(&self) -> &str {
        &self.glyphs
    }
}

impl fmt::Display for ThemeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.png\t{}", self.unified, self.glyphs)
    }
}

/// A complete Pidgin smiley theme.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Theme {
    header: ThemeHeader,
    lines: Vec<ThemeLine>,
}

impl Theme {
    /// Build a theme with one line per record, in input order.
    ///
    /// Every line is built before anything is returned: the first record
    /// missing `unified` or holding a bad code point fails the whole theme.
    pub fn build<'r>(
        header: ThemeHeader,
        records: impl IntoIterator<Item = &'r EmojiRecord>,
    ) -> Result<Self, SlackmojiError> {
        let lines = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| -> Result<_, SlackmojiError> {
                let line = ThemeLine::from_record(record, position)?;
                log::trace!("{line}");
                Ok(line)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Theme { header, lines })
    }

    /// The theme's header.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &ThemeHeader {
        &self.header
    }

    /// The emoji lines, in input order.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[ThemeLine] {
        &self.lines
    }

    /// Write the theme to `<out_dir>/<size>/theme` for every [`Size`],
    /// creating the size directories if needed and overwriting any existing
    /// theme. Returns the paths written.
    pub fn write(
        &self,
        out_dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, WriteError> {
        let content = self.to_string();
        Size::ALL
            .iter()
            .map(|size| -> Result<PathBuf, WriteError> {
                let dir = out_dir.as_ref().join(size.as_str());
                let path = dir.join(THEME_FILE_NAME);
                fs::create_dir_all(&dir)
                    .and_then(|()| fs::write(&path, &content))
                    .map_err(|io_err| WriteError(path.clone(), io_err))?;
                log::info!(
                    "wrote {} emoji to {}",
                    self.lines.len(),
                    path.display(),
                );
                Ok(path)
            })
            .collect()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        // No trailing newline after the last line
        self.lines.iter().enumerate().try_for_each(|(index, line)| {
            if index == 0 {
                write!(f, "{line}")
            } else {
                write!(f, "\n{line}")
            }
        })
    }
}
