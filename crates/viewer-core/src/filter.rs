//! Name filter for the file tree.
//!
//! Directories always pass so the tree stays navigable; files are matched
//! against a case-insensitive wildcard pattern (`*` any run, `?` one char).

use regex::{Regex, RegexBuilder};

const DEFAULT_PATTERN: &str = "*.pdf";

#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: String,
    matcher: Option<Regex>,
}

impl NameFilter {
    /// Directories plus `*.pdf` files.
    pub fn pdf_only() -> Self {
        Self::wildcard(DEFAULT_PATTERN)
    }

    /// Builds the filter for the search box: blank text restores the
    /// default, anything else matches `*text*`.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Self::pdf_only()
        } else {
            Self::wildcard(&format!("*{text}*"))
        }
    }

    fn wildcard(pattern: &str) -> Self {
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        source.push('$');

        // Literals are escaped, so only the compiled size limit can fail here.
        let matcher = match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(matcher) => Some(matcher),
            Err(err) => {
                log::warn!("filter pattern {pattern:?} rejected: {err}");
                None
            }
        };

        Self { pattern: pattern.to_owned(), matcher }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_default(&self) -> bool {
        self.pattern == DEFAULT_PATTERN
    }

    pub fn matches(&self, name: &str, is_dir: bool) -> bool {
        is_dir || self.matcher.as_ref().is_some_and(|matcher| matcher.is_match(name))
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::pdf_only()
    }
}

impl PartialEq for NameFilter {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for NameFilter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_shows_pdfs_and_directories() {
        let filter = NameFilter::default();

        assert!(filter.is_default());
        assert!(filter.matches("report.pdf", false));
        assert!(filter.matches("SCAN.PDF", false));
        assert!(!filter.matches("notes.txt", false));
        assert!(!filter.matches("report.pdf.bak", false));
        assert!(filter.matches("Documents", true));
    }

    #[test]
    fn blank_text_restores_default() {
        assert_eq!(NameFilter::from_text(""), NameFilter::pdf_only());
        assert_eq!(NameFilter::from_text("   "), NameFilter::pdf_only());
    }

    #[test]
    fn text_matches_anywhere_in_name() {
        let filter = NameFilter::from_text("rep");

        assert_eq!(filter.pattern(), "*rep*");
        assert!(filter.matches("Report.txt", false));
        assert!(filter.matches("q1-rep.pdf", false));
        assert!(!filter.matches("invoice.pdf", false));
        assert!(filter.matches("unrelated-dir", true));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let filter = NameFilter::from_text("a+b (1)");

        assert!(filter.matches("x a+b (1).pdf", false));
        assert!(!filter.matches("aab 1.pdf", false));
    }

    #[test]
    fn user_wildcards_keep_their_meaning() {
        let filter = NameFilter::from_text("q?.pdf");

        assert!(filter.matches("q1.pdf", false));
        assert!(!filter.matches("q12.pdf", false));
    }
}
