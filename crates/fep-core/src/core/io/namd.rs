use super::traits::TextDocument;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

/// Column width that directive keys are left-aligned to when serialized.
pub const KEY_COLUMN_WIDTH: usize = 24;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A single `key value...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub value: String,
}

impl Directive {
    pub fn new(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }

    /// Parses a raw line into a directive, or `None` for blank and comment lines.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let key = parts.next()?.to_string();
        let value = parts.next().map(str::trim).unwrap_or("").to_string();
        Some(Self { key, value })
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<width$} {}", self.key, self.value, width = KEY_COLUMN_WIDTH)
    }
}

/// Returns the first whitespace-delimited token of a line, if any.
pub fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// A NAMD-style configuration document kept line by line.
///
/// Lines are stored without terminators and written back with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectiveDocument {
    lines: Vec<String>,
}

impl DirectiveDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn push_blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn push_directive(&mut self, directive: &Directive) {
        self.lines.push(directive.to_string());
    }

    /// Appends a blank separator line followed by each directive of the block.
    pub fn push_block<'a>(&mut self, block: impl IntoIterator<Item = &'a Directive>) {
        self.push_blank();
        for directive in block {
            self.push_directive(directive);
        }
    }

    /// Iterates over all parsed directives, skipping blank and comment lines.
    pub fn directives(&self) -> impl Iterator<Item = Directive> + '_ {
        self.lines.iter().filter_map(|line| Directive::parse(line))
    }

    /// Values of every directive whose key matches `key` case-insensitively.
    pub fn values_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = String> + 'a {
        self.directives()
            .filter(move |d| d.key.eq_ignore_ascii_case(key))
            .map(|d| d.value)
    }

    /// Returns a copy where every line whose first token satisfies
    /// `is_reserved` is replaced by a blank line.
    ///
    /// Blanking instead of removing keeps the line numbering of the rest of
    /// the document intact.
    pub fn blank_directives(&self, is_reserved: impl Fn(&str) -> bool) -> Self {
        let lines = self
            .lines
            .iter()
            .map(|line| match first_token(line) {
                Some(token) if is_reserved(token) => String::new(),
                _ => line.clone(),
            })
            .collect();
        Self { lines }
    }
}

impl FromStr for DirectiveDocument {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            lines: s.lines().map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for DirectiveDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl TextDocument for DirectiveDocument {
    type Error = DocumentError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { lines })
    }

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        write!(writer, "{}", self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TEMPLATE: &str = "\
structure          ionized.psf
coordinates        ionized.pdb
# a comment line

outputName         old_output
run 500000
";

    #[test]
    fn directive_display_aligns_key_to_column() {
        let directive = Directive::new("run", 50000);
        let rendered = directive.to_string();
        assert_eq!(rendered.len(), KEY_COLUMN_WIDTH + 1 + "50000".len());
        assert!(rendered.starts_with("run "));
        assert!(rendered.ends_with(" 50000"));
    }

    #[test]
    fn directive_parse_splits_key_and_value() {
        let directive = Directive::parse("  alchLambda   0.1000000  ").unwrap();
        assert_eq!(directive.key, "alchLambda");
        assert_eq!(directive.value, "0.1000000");
        assert!(Directive::parse("   ").is_none());
        assert!(Directive::parse("# outputName x").is_none());
    }

    #[test]
    fn read_from_preserves_every_line() {
        let mut reader = Cursor::new(TEMPLATE);
        let doc = DirectiveDocument::read_from(&mut reader).unwrap();
        assert_eq!(doc.len(), 6);
        assert_eq!(doc.lines()[2], "# a comment line");
        assert_eq!(doc.to_string(), TEMPLATE);
    }

    #[test]
    fn values_of_matches_keys_case_insensitively() {
        let doc: DirectiveDocument = TEMPLATE.parse().unwrap();
        let values: Vec<_> = doc.values_of("outputname").collect();
        assert_eq!(values, vec!["old_output".to_string()]);
    }

    #[test]
    fn blank_directives_replaces_matching_lines_with_blanks() {
        let doc: DirectiveDocument = TEMPLATE.parse().unwrap();
        let stripped = doc.blank_directives(|key| {
            key.eq_ignore_ascii_case("outputname") || key.eq_ignore_ascii_case("run")
        });
        assert_eq!(stripped.len(), doc.len());
        assert_eq!(stripped.lines()[4], "");
        assert_eq!(stripped.lines()[5], "");
        assert_eq!(stripped.lines()[0], doc.lines()[0]);
        assert_eq!(stripped.values_of("run").count(), 0);
    }

    #[test]
    fn push_block_prefixes_a_blank_separator() {
        let mut doc = DirectiveDocument::new();
        doc.push_block(&[Directive::new("a", 1), Directive::new("b", 2)]);
        assert_eq!(doc.len(), 3);
        assert!(doc.lines()[0].is_empty());
        assert_eq!(doc.values_of("b").next().as_deref(), Some("2"));
    }

    #[test]
    fn write_to_path_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forward.template");
        let doc: DirectiveDocument = TEMPLATE.parse().unwrap();
        doc.write_to_path(&path).unwrap();
        let reloaded = DirectiveDocument::read_from_path(&path).unwrap();
        assert_eq!(reloaded, doc);
    }
}
