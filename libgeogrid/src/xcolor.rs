//! X windows colour names
//!
//! The XPM format lets colour table entries name colours symbolically
//! ("navy blue") instead of spelling out channel values. Those names come
//! from the X distribution's `rgb.txt`, which this module loads once per
//! process from the usual installation paths.

use crate::color::Color;
use itertools::Itertools;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Name of the file holding the X colour map
pub const XCOLOR_NAME_FILE: &str = "rgb.txt";

/// Directories searched for [`XCOLOR_NAME_FILE`]
pub const XCOLOR_NAME_FILE_LOCATIONS: [&str; 6] = [
    "/usr/share/X11",
    "/etc/X11",
    "/usr/X11/share/X11",
    "/usr/lib/X11",
    "/usr/X11R6/lib/X11",
    "/usr/X11R6/share/X11",
];

/// Why a colour name could not be resolved
///
/// Failing to load the table at all is deliberately distinct from not
/// finding a name in a loaded table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XColorError {
    /// The colour table itself could not be loaded
    #[error("could not load {XCOLOR_NAME_FILE} from anywhere: {0}")]
    Unavailable(String),
    /// The table loaded but does not contain the name
    #[error("{0:?} is not the name of an X standard colour")]
    UnknownName(String),
}

/// A map from X windows colour names to colours
#[derive(Debug, Clone, Default)]
pub struct XColorTable {
    /// Names are stored folded: lowercased with whitespace removed
    entries: Vec<(String, Color)>,
}

impl XColorTable {
    /// Parses a colour table in `rgb.txt` format
    ///
    /// Each line holds three channel values and a (possibly multi-word)
    /// name; `!` starts a comment line. Unparseable lines are skipped.
    ///
    /// # Errors
    /// Fails if the underlying reader fails.
    pub fn from_reader(reader: impl BufRead) -> std::io::Result<Self> {
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('!') {
                continue;
            }
            let mut words = line.split_whitespace();
            let channels: Vec<u8> = words
                .by_ref()
                .take(3)
                .map_while(|w| w.parse().ok())
                .collect();
            let name = words.join(" ");
            if channels.len() != 3 || name.is_empty() {
                continue;
            }
            entries.push((
                fold_name(&name),
                Color::rgb(channels[0], channels[1], channels[2]),
            ));
        }
        Ok(Self { entries })
    }

    /// Loads the colour table from a file
    ///
    /// # Errors
    /// Fails if the file cannot be opened or read.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Loads the colour table from the standard X installation paths
    ///
    /// # Errors
    /// Fails if no candidate file could be opened.
    pub fn load() -> std::io::Result<Self> {
        let mut last_error = None;
        for dir in XCOLOR_NAME_FILE_LOCATIONS {
            let path = PathBuf::from(dir).join(XCOLOR_NAME_FILE);
            match Self::from_file(&path) {
                Ok(table) => {
                    debug!("loaded {} colour names from {}", table.len(), path.display());
                    return Ok(table);
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error
            .unwrap_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound)))
    }

    /// Looks up a colour by name, case-insensitively and ignoring
    /// whitespace ("navy blue" and "NavyBlue" are the same name)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Color> {
        let folded = fold_name(name);
        self.entries
            .iter()
            .find(|(bound, _)| *bound == folded)
            .map(|(_, color)| *color)
    }

    /// Number of names in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no names
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fold_name(name: &str) -> String {
    name.split_whitespace().join("").to_lowercase()
}

/// Resolves an X colour name against the process-wide table
///
/// The table is loaded on first use and cached for the lifetime of the
/// process.
///
/// # Errors
/// Fails with [`XColorError::Unavailable`] if the table could not be
/// loaded, and with [`XColorError::UnknownName`] if it loaded but does not
/// contain the name.
pub fn lookup(name: &str) -> Result<Color, XColorError> {
    static TABLE: OnceLock<Result<XColorTable, String>> = OnceLock::new();
    let table = TABLE
        .get_or_init(|| XColorTable::load().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|reason| XColorError::Unavailable(reason.clone()))?;
    table
        .get(name)
        .ok_or_else(|| XColorError::UnknownName(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::XColorTable;
    use crate::color::Color;

    const RGB_TXT: &str = "\
! $Xorg: rgb.txt,v 1.3 2000/08/17 19:54:00 cpqbld Exp $
255 250 250\t\tsnow
  0   0 128\t\tnavy blue
  0   0 128\t\tNavyBlue
";

    #[test]
    fn parses_names_and_channels() {
        let table = XColorTable::from_reader(RGB_TXT.as_bytes()).unwrap();
        assert_eq!(table.get("snow"), Some(Color::rgb(255, 250, 250)));
        assert_eq!(table.get("navy blue"), Some(Color::rgb(0, 0, 128)));
    }

    #[test]
    fn names_fold_case_and_whitespace() {
        let table = XColorTable::from_reader(RGB_TXT.as_bytes()).unwrap();
        assert_eq!(table.get("NavyBlue"), table.get("navy blue"));
        assert_eq!(table.get("SNOW"), Some(Color::rgb(255, 250, 250)));
        assert_eq!(table.get("no such colour"), None);
    }
}
