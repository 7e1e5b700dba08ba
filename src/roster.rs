//! Entry names, one per line.

use std::fs;
use std::io;
use std::path::Path;

use crate::core::grid::CellIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// One entry per line; surrounding whitespace is trimmed and blank lines
    /// are dropped.
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { names }
    }

    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Appends names given individually, skipping blanks.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                self.names.push(name.to_owned());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: CellIndex) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_skips_blank_lines() {
        let roster = Roster::parse("  Ada \n\n\tGrace\n   \nLinus\r\n");
        assert_eq!(roster.names(), &["Ada", "Grace", "Linus"]);
        assert_eq!(roster.name(1), Some("Grace"));
        assert_eq!(roster.name(3), None);
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        let roster = Roster::parse(" \n\t\n");
        assert!(roster.is_empty());
        assert_eq!(roster.len(), 0);
    }

    #[test]
    fn extend_appends_after_file_entries() {
        let mut roster = Roster::parse("a\nb");
        roster.extend(["c", "  ", " d "]);
        assert_eq!(roster.names(), &["a", "b", "c", "d"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("light_roulette_no_such_roster.txt");
        assert!(Roster::from_path(path).is_err());
    }
}
