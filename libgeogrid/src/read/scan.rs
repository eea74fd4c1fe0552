//! Line-streamed text scanning for the format readers
//!
//! A [`Scanner`] wraps a buffered reader and hands out tokens: exact
//! literals, whitespace-delimited words, quoted strings, typed numbers,
//! ordered key/value pairs and fixed-shape rows. It knows which file and
//! format it is reading and where it is, so every refusal carries the file
//! name, the expected construct, what was found and the line number.
//!
//! Comment skipping is pluggable per call: between tokens a scanner can be
//! told to skip `#`, `/* */`, `//` and `<!-- -->` comments.

use crate::error::{Error, FormatError};
use crate::grid::Grid;
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;

/// Which comment styles to skip between tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentRules {
    /// `# ...` to end of line
    pub hash: bool,
    /// `/* ... */`, possibly spanning lines
    pub c: bool,
    /// `// ...` to end of line
    pub cpp: bool,
    /// `<!-- ... -->`, possibly spanning lines
    pub xml: bool,
}

impl CommentRules {
    /// Skip no comments
    pub const NONE: Self = Self {
        hash: false,
        c: false,
        cpp: false,
        xml: false,
    };

    /// Skip `/* ... */` comments only
    pub const C: Self = Self {
        hash: false,
        c: true,
        cpp: false,
        xml: false,
    };
}

/// A tokenizer over a line-buffered character stream
///
/// Lines are streamed on demand, never all at once, so large bodies cost
/// one line of memory at a time.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    filename: String,
    format: &'static str,
    /// Current line without its terminator, if one is buffered
    line: Option<String>,
    /// Byte position within the current line
    pos: usize,
    /// 1-based number of the current line; 0 before the first read
    line_no: usize,
    eof: bool,
}

impl<R: BufRead> Scanner<R> {
    /// Creates a scanner reading from `reader`
    ///
    /// `filename` and `format` only label errors.
    pub fn new(reader: R, filename: impl Into<String>, format: &'static str) -> Self {
        Self {
            reader,
            filename: filename.into(),
            format,
            line: None,
            pos: 0,
            line_no: 0,
            eof: false,
        }
    }

    /// Whether the end of the stream has been reached
    #[must_use]
    pub const fn eof(&self) -> bool {
        self.eof
    }

    /// Builds a refusal at the current position
    #[must_use]
    pub fn refuse(&self, expected: impl Into<String>, found: Option<String>) -> FormatError {
        FormatError {
            filename: self.filename.clone(),
            format: self.format,
            expected: expected.into(),
            found,
            line: (self.line_no > 0).then_some(self.line_no),
        }
    }

    fn advance_line(&mut self) -> Result<bool, Error> {
        let mut buf = String::new();
        let read = self.reader.read_line(&mut buf)?;
        if read == 0 {
            self.line = None;
            self.eof = true;
            return Ok(false);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        self.line = Some(buf);
        self.pos = 0;
        self.line_no += 1;
        Ok(true)
    }

    fn rest(&self) -> &str {
        self.line.as_deref().map_or("", |l| &l[self.pos.min(l.len())..])
    }

    /// Ensures some unconsumed text is buffered; false at end of file
    fn ensure_content(&mut self) -> Result<bool, Error> {
        loop {
            if self.line.is_some() && !self.rest().is_empty() {
                return Ok(true);
            }
            if !self.advance_line()? {
                return Ok(false);
            }
        }
    }

    fn skip_block(&mut self, end: &str) -> Result<(), Error> {
        loop {
            if let Some(i) = self.rest().find(end) {
                self.pos += i + end.len();
                return Ok(());
            }
            if !self.advance_line()? {
                return Ok(());
            }
        }
    }

    /// Skips whitespace and any enabled comments, crossing line ends
    fn skip_separators(&mut self, comments: CommentRules) -> Result<(), Error> {
        loop {
            if !self.ensure_content()? {
                return Ok(());
            }
            let rest = self.rest();
            let trimmed = rest.trim_start();
            if trimmed.len() < rest.len() {
                self.pos += rest.len() - trimmed.len();
                continue;
            }
            if comments.c && trimmed.starts_with("/*") {
                self.pos += 2;
                self.skip_block("*/")?;
            } else if comments.xml && trimmed.starts_with("<!--") {
                self.pos += 4;
                self.skip_block("-->")?;
            } else if (comments.cpp && trimmed.starts_with("//"))
                || (comments.hash && trimmed.starts_with('#'))
            {
                self.line = None;
            } else {
                return Ok(());
            }
        }
    }

    fn found_here(&self) -> Option<String> {
        let rest = self.rest().trim();
        if rest.is_empty() {
            None
        } else {
            Some(
                rest.split_whitespace()
                    .next()
                    .unwrap_or(rest)
                    .to_owned(),
            )
        }
    }

    /// Matches an exact literal at the current position
    ///
    /// The cursor first moves to the next non-empty line if the current
    /// one is exhausted. With `skip_leading_space`, spaces and tabs before
    /// the literal are ignored.
    ///
    /// # Errors
    /// Fails if the input at the cursor does not spell the literal.
    pub fn expect_literal(
        &mut self,
        literal: &str,
        ignore_case: bool,
        skip_leading_space: bool,
    ) -> Result<(), Error> {
        if !self.ensure_content()? {
            return Err(self.refuse(format!("\"{literal}\""), None).into());
        }
        if skip_leading_space {
            let rest = self.rest();
            let trimmed = rest.trim_start_matches([' ', '\t']);
            self.pos += rest.len() - trimmed.len();
        }
        let rest = self.rest();
        let matches = rest.len() >= literal.len()
            && rest.is_char_boundary(literal.len())
            && if ignore_case {
                rest[..literal.len()].eq_ignore_ascii_case(literal)
            } else {
                rest.starts_with(literal)
            };
        if !matches {
            return Err(self
                .refuse(format!("\"{literal}\""), self.found_here())
                .into());
        }
        self.pos += literal.len();
        Ok(())
    }

    /// Reads a whitespace-delimited word, skipping separators first
    ///
    /// # Errors
    /// Fails at end of file, naming what the word was wanted for.
    pub fn read_word(&mut self, comments: CommentRules, wanted: &str) -> Result<String, Error> {
        self.read_word_delimited(comments, &[], wanted)
    }

    /// Reads a word that also stops before any of `delimiters`
    ///
    /// The delimiter itself is not consumed.
    ///
    /// # Errors
    /// Fails at end of file or on an empty word.
    pub fn read_word_delimited(
        &mut self,
        comments: CommentRules,
        delimiters: &[char],
        wanted: &str,
    ) -> Result<String, Error> {
        self.skip_separators(comments)?;
        if !self.ensure_content()? {
            return Err(self.refuse(wanted, None).into());
        }
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() || delimiters.contains(c))
            .map_or(rest.len(), |(i, _)| i);
        if end == 0 {
            return Err(self.refuse(wanted, self.found_here()).into());
        }
        let word = rest[..end].to_owned();
        self.pos += end;
        Ok(word)
    }

    /// Reads a word and requires it to be `word`
    ///
    /// # Errors
    /// Fails if the next word differs.
    pub fn expect_word(
        &mut self,
        word: &str,
        comments: CommentRules,
        ignore_case: bool,
    ) -> Result<(), Error> {
        let read = self.read_word(comments, &format!("\"{word}\""))?;
        let matches = if ignore_case {
            read.eq_ignore_ascii_case(word)
        } else {
            read == word
        };
        if !matches {
            return Err(self.refuse(format!("\"{word}\""), Some(read)).into());
        }
        Ok(())
    }

    /// Reads a word and parses it as a number
    ///
    /// # Errors
    /// Fails at end of file or if the word does not parse.
    pub fn read_number<N: FromStr>(
        &mut self,
        comments: CommentRules,
        wanted: &str,
    ) -> Result<N, Error> {
        let word = self.read_word(comments, wanted)?;
        word.parse()
            .map_err(|_| self.refuse(wanted, Some(word)).into())
    }

    /// Reads a string between two delimiter characters on one line
    ///
    /// Separators and comments before the opening delimiter are skipped.
    ///
    /// # Errors
    /// Fails if no opening delimiter follows, or the closing one is
    /// missing on the same line.
    pub fn read_quoted(
        &mut self,
        comments: CommentRules,
        open: char,
        close: char,
    ) -> Result<String, Error> {
        let wanted = format!("a string between {open} and {close}");
        self.skip_separators(comments)?;
        if !self.ensure_content()? {
            return Err(self.refuse(wanted, None).into());
        }
        let rest = self.rest();
        if !rest.starts_with(open) {
            return Err(self.refuse(wanted, self.found_here()).into());
        }
        let body = &rest[open.len_utf8()..];
        let Some(end) = body.find(close) else {
            return Err(self.refuse(wanted, Some(rest.to_owned())).into());
        };
        let quoted = body[..end].to_owned();
        self.pos += open.len_utf8() + end + close.len_utf8();
        Ok(quoted)
    }

    /// Peeks at the next non-separator character without consuming it
    ///
    /// # Errors
    /// Fails only if the underlying reader fails.
    pub fn peek_char(&mut self, comments: CommentRules) -> Result<Option<char>, Error> {
        self.skip_separators(comments)?;
        Ok(self.rest().chars().next())
    }

    /// Returns the unconsumed remainder of the current line, reading a new
    /// line if the current one is exhausted; [`None`] at end of file
    ///
    /// The line is not consumed; a later call sees it again.
    ///
    /// # Errors
    /// Fails only if the underlying reader fails.
    pub fn peek_line(&mut self) -> Result<Option<&str>, Error> {
        if !self.ensure_content()? {
            return Ok(None);
        }
        Ok(Some(self.rest()))
    }

    /// Consumes the rest of the current line
    pub fn consume_line(&mut self) {
        self.line = None;
    }

    /// Takes the unconsumed remainder of the current or next line
    ///
    /// # Errors
    /// Fails only if the underlying reader fails.
    pub fn take_line(&mut self) -> Result<Option<String>, Error> {
        if !self.ensure_content()? {
            return Ok(None);
        }
        let line = self.rest().to_owned();
        self.consume_line();
        Ok(Some(line))
    }

    /// Reads ordered key/value lines driven by a small grammar of keys
    ///
    /// Each element of `keys` is `key`, `?key`, `a|b` or `?a|b`: a `?`
    /// prefix makes the line optional, `|` separates alternative key
    /// names. Keys match case-insensitively; each matching line must hold
    /// exactly the key and one value, whitespace-separated. The map is
    /// keyed by whichever alternative matched, lowercased. A line that
    /// does not match an optional key is left for the next caller.
    ///
    /// # Errors
    /// Fails when a required key is missing, out of order, or the file
    /// ends early.
    pub fn read_ordered_key_value_pairs(
        &mut self,
        keys: &[&str],
    ) -> Result<HashMap<String, String>, Error> {
        let mut pairs = HashMap::new();
        for pattern in keys {
            let (optional, options) = parse_key_pattern(pattern);
            let wanted = key_message(optional, &options);
            let Some(line) = self.peek_line()? else {
                if optional {
                    continue;
                }
                return Err(self.refuse(wanted, None).into());
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            let matched = (words.len() == 2)
                .then(|| {
                    options
                        .iter()
                        .find(|option| words[0].eq_ignore_ascii_case(option))
                })
                .flatten();
            match matched {
                Some(option) => {
                    pairs.insert(option.to_lowercase(), words[1].to_owned());
                    self.consume_line();
                }
                None if optional => {}
                None => {
                    let found = words.first().map(|w| (*w).to_owned());
                    return Err(self.refuse(wanted, found).into());
                }
            }
        }
        Ok(pairs)
    }

    /// Reads a grid of exactly `rows` lines of exactly `cols` cells each
    ///
    /// # Errors
    /// Fails on a short row, a long row, or a premature end of file.
    pub fn read_rows(&mut self, rows: usize, cols: usize) -> Result<Grid<String>, Error> {
        let wanted = format!("{cols} columns of whitespace-separated cells");
        let mut grid = Grid::new(rows, cols);
        for row in 0..rows {
            let Some(line) = self.take_line()? else {
                return Err(self.refuse(wanted, None).into());
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() != cols {
                return Err(self.refuse(wanted, Some(line)).into());
            }
            for (col, word) in words.into_iter().enumerate() {
                grid.set_rc(row, col, Some(word.to_owned()))?;
            }
        }
        Ok(grid)
    }
}

fn parse_key_pattern(pattern: &str) -> (bool, Vec<&str>) {
    let (optional, names) = match pattern.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, pattern),
    };
    (optional, names.split('|').collect())
}

fn key_message(optional: bool, options: &[&str]) -> String {
    let names = options
        .iter()
        .map(|o| format!("\"{o}\""))
        .collect::<Vec<_>>()
        .join(" or ");
    if optional {
        format!("optionally key {names}")
    } else {
        format!("key {names}")
    }
}

#[cfg(test)]
mod tests {
    use super::{CommentRules, Scanner};

    fn scanner(text: &str) -> Scanner<&[u8]> {
        Scanner::new(text.as_bytes(), "test.txt", "test")
    }

    #[test]
    fn literals_and_words() {
        let mut s = scanner("/* XPM */\nstatic char *name[] = {\n");
        s.expect_literal("/* XPM */", false, false).unwrap();
        s.expect_word("static", CommentRules::C, false).unwrap();
        s.expect_literal("char", false, true).unwrap();
        s.expect_literal("*", false, true).unwrap();
        let name = s
            .read_word_delimited(CommentRules::C, &['[', '='], "a name")
            .unwrap();
        assert_eq!(name, "name");
        s.expect_literal("[", false, true).unwrap();
        s.expect_literal("]", false, true).unwrap();
        s.expect_literal("=", false, true).unwrap();
        s.expect_word("{", CommentRules::C, false).unwrap();
    }

    #[test]
    fn comments_are_skipped_between_tokens() {
        let mut s = scanner("/* one */ a /* two\nspans lines */ b # not a comment here\n");
        assert_eq!(s.read_word(CommentRules::C, "a word").unwrap(), "a");
        assert_eq!(s.read_word(CommentRules::C, "a word").unwrap(), "b");
        assert_eq!(s.read_word(CommentRules::C, "a word").unwrap(), "#");
    }

    #[test]
    fn each_comment_style_can_be_enabled() {
        let all = CommentRules {
            hash: true,
            c: true,
            cpp: true,
            xml: true,
        };
        let mut s = scanner("# line one\n// line two\n<!-- spans\nlines --> word\n");
        assert_eq!(s.read_word(all, "a word").unwrap(), "word");
        // the same input is all words when nothing is enabled
        let mut s = scanner("# line one\n");
        assert_eq!(s.read_word(CommentRules::NONE, "a word").unwrap(), "#");
    }

    #[test]
    fn quoted_strings() {
        let mut s = scanner("  /* colours */ \"a c #000000\",\n\"next\"");
        let q = s.read_quoted(CommentRules::C, '"', '"').unwrap();
        assert_eq!(q, "a c #000000");
        s.expect_literal(",", false, false).unwrap();
        assert_eq!(s.read_quoted(CommentRules::C, '"', '"').unwrap(), "next");
    }

    #[test]
    fn missing_literal_names_the_position() {
        let mut s = scanner("something else\n");
        let err = s.expect_literal("/* XPM */", false, false).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("test.txt"), "{text}");
        assert!(text.contains("line 1"), "{text}");
        assert!(text.contains("something"), "{text}");
    }

    #[test]
    fn ordered_pairs_follow_the_grammar() {
        let mut s = scanner("nrows 2\nNCOLS 3\nxllcenter 0.5\nyllcorner 0\ncellsize 1\n1 2 3\n");
        let pairs = s
            .read_ordered_key_value_pairs(&[
                "nrows",
                "ncols",
                "xllcorner|xllcenter",
                "yllcorner|yllcenter",
                "cellsize",
                "?nodata_value",
            ])
            .unwrap();
        assert_eq!(pairs["nrows"], "2");
        assert_eq!(pairs["ncols"], "3");
        assert_eq!(pairs["xllcenter"], "0.5");
        assert!(!pairs.contains_key("nodata_value"));
        // the unmatched body line is still there for row reading
        let grid = s.read_rows(1, 3).unwrap();
        assert_eq!(grid.at_rc(0, 0).unwrap(), Some(&"1".to_owned()));
    }

    #[test]
    fn missing_required_key_is_refused() {
        let mut s = scanner("nrows 2\ncellsize 1\n");
        let err = s
            .read_ordered_key_value_pairs(&["nrows", "ncols", "cellsize"])
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("\"ncols\""), "{text}");
        assert!(text.contains("cellsize"), "{text}");
    }

    #[test]
    fn short_rows_are_refused() {
        let mut s = scanner("1 2 3\n4 5\n");
        let err = s.read_rows(2, 3).unwrap_err();
        assert!(err.to_string().contains("3 columns"));
        let mut s = scanner("1 2 3\n");
        assert!(s.read_rows(2, 3).is_err());
    }
}
