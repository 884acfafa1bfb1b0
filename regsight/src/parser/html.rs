//! Streaming HTML scanner and register table collector.
//!
//! Vendor datasheets are prose-heavy HTML; the only structure this module
//! relies on is tag nesting. Attribute values and text content are treated
//! as opaque. Tables are collected row by row and tagged with the text of
//! the nearest preceding `<h2>` heading, which carries the register title
//! phrase in the documents we consume.

use thiserror::Error;

use crate::parser::table::RawTable;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("table end tag with no open table at position {0}")]
    UnbalancedTable(usize),
    #[error("nested table start tag at position {0}")]
    NestedTable(usize),
    #[error("unterminated tag at position {0}")]
    UnterminatedTag(usize),
}

#[derive(Debug, PartialEq)]
enum Token {
    Open(String),
    Close(String),
    Text(String),
}

struct Scanner {
    input: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        loop {
            if self.is_eof() {
                return Ok(None);
            }
            if self.peek() != '<' {
                return Ok(Some(Token::Text(self.scan_text())));
            }
            if self.starts_with("<!--") {
                self.skip_comment()?;
                continue;
            }
            if self.starts_with("<!") || self.starts_with("<?") {
                // Doctype or processing instruction; no content of interest.
                self.skip_until('>')?;
                continue;
            }
            return self.scan_tag().map(Some);
        }
    }

    fn scan_text(&mut self) -> String {
        let mut s = String::new();
        while !self.is_eof() && self.peek() != '<' {
            if self.peek() == '&' {
                s.push(self.scan_entity());
            } else {
                s.push(self.peek());
                self.advance();
            }
        }
        s
    }

    /// Decode the handful of character references datasheets actually use.
    /// Anything unrecognized is kept verbatim, ampersand included.
    fn scan_entity(&mut self) -> char {
        let start = self.pos;
        let mut name = String::new();
        self.advance(); // consume '&'
        while !self.is_eof() && name.len() < 8 {
            let ch = self.peek();
            if ch == ';' {
                self.advance();
                break;
            }
            if !ch.is_ascii_alphanumeric() && ch != '#' {
                break;
            }
            name.push(ch);
            self.advance();
        }
        match name.as_str() {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "nbsp" | "#160" => ' ',
            _ => {
                self.pos = start + 1;
                '&'
            }
        }
    }

    fn scan_tag(&mut self) -> Result<Token, ScanError> {
        let start = self.pos;
        self.advance(); // consume '<'
        let closing = self.peek() == '/';
        if closing {
            self.advance();
        }

        let mut name = String::new();
        while !self.is_eof() {
            let ch = self.peek();
            if ch.is_whitespace() || ch == '>' || ch == '/' {
                break;
            }
            name.push(ch.to_ascii_lowercase());
            self.advance();
        }

        // Skip attributes; quoted values may contain '>'.
        let mut quote: Option<char> = None;
        while !self.is_eof() {
            let ch = self.peek();
            match quote {
                Some(q) => {
                    if ch == q {
                        quote = None;
                    }
                }
                None => {
                    if ch == '"' || ch == '\'' {
                        quote = Some(ch);
                    } else if ch == '>' {
                        self.advance();
                        if closing {
                            return Ok(Token::Close(name));
                        }
                        return Ok(Token::Open(name));
                    }
                }
            }
            self.advance();
        }
        Err(ScanError::UnterminatedTag(start))
    }

    fn skip_comment(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        self.pos += 4; // consume "<!--"
        while !self.is_eof() {
            if self.starts_with("-->") {
                self.pos += 3;
                return Ok(());
            }
            self.advance();
        }
        Err(ScanError::UnterminatedTag(start))
    }

    fn skip_until(&mut self, target: char) -> Result<(), ScanError> {
        let start = self.pos;
        while !self.is_eof() {
            if self.peek() == target {
                self.advance();
                return Ok(());
            }
            self.advance();
        }
        Err(ScanError::UnterminatedTag(start))
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(i, ch)| self.input.get(self.pos + i) == Some(&ch))
    }

    fn peek(&self) -> char {
        if self.pos < self.input.len() {
            self.input[self.pos]
        } else {
            '\0'
        }
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

/// Where the collector currently is in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CollectState {
    /// Between elements of interest.
    Scanning,
    /// Inside an `<h2>`, accumulating the next table title.
    InHeading,
    /// Inside a `<th>`/`<td>`, accumulating cell text.
    InCell,
}

struct TableCollector {
    state: CollectState,
    title: Option<String>,
    heading: String,
    cell: String,
    current: Option<RawTable>,
    tables: Vec<RawTable>,
}

impl TableCollector {
    fn new() -> Self {
        Self {
            state: CollectState::Scanning,
            title: None,
            heading: String::new(),
            cell: String::new(),
            current: None,
            tables: Vec::new(),
        }
    }

    fn open_tag(&mut self, name: &str, pos: usize) -> Result<(), ScanError> {
        match name {
            "h2" => {
                self.state = CollectState::InHeading;
                self.heading.clear();
            }
            "table" => {
                if self.current.is_some() {
                    return Err(ScanError::NestedTable(pos));
                }
                self.current = Some(RawTable::new(self.title.clone()));
            }
            "tr" => {
                if let Some(table) = self.current.as_mut() {
                    table.rows.push(Vec::new());
                }
            }
            "th" | "td" => {
                if self.current.is_some() {
                    self.state = CollectState::InCell;
                    self.cell.clear();
                }
            }
            // Line breaks inside a cell become literal newlines so
            // multi-line descriptions survive collection.
            "span" | "br" => {
                if self.state == CollectState::InCell {
                    self.cell.push('\n');
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_tag(&mut self, name: &str, pos: usize) -> Result<(), ScanError> {
        match name {
            "h2" => {
                if self.state == CollectState::InHeading {
                    self.title = Some(self.heading.trim().to_string());
                    self.state = CollectState::Scanning;
                }
            }
            "table" => match self.current.take() {
                Some(table) => self.tables.push(table),
                None => return Err(ScanError::UnbalancedTable(pos)),
            },
            "th" | "td" => {
                if self.state == CollectState::InCell {
                    let cell = std::mem::take(&mut self.cell);
                    if let Some(table) = self.current.as_mut() {
                        if let Some(row) = table.rows.last_mut() {
                            row.push(cell);
                        }
                    }
                    self.state = CollectState::Scanning;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, data: &str) {
        match self.state {
            CollectState::InHeading => self.heading.push_str(data),
            CollectState::InCell => self.cell.push_str(data),
            CollectState::Scanning => {}
        }
    }
}

/// Single pass over the document: collect every table together with the
/// most recently seen section heading. Malformed nesting is the only fatal
/// condition; everything else is deferred to classification.
pub fn collect_tables(input: &str) -> Result<Vec<RawTable>, ScanError> {
    let mut scanner = Scanner::new(input);
    let mut collector = TableCollector::new();

    while let Some(token) = scanner.next_token()? {
        match token {
            Token::Open(name) => collector.open_tag(&name, scanner.pos)?,
            Token::Close(name) => collector.close_tag(&name, scanner.pos)?,
            Token::Text(data) => collector.text(&data),
        }
    }
    Ok(collector.tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_table_with_title() {
        let html = "<h2>1.2 STATUS Register</h2>\
                    <table><tr><th>Bit</th><th>Field</th></tr>\
                    <tr><td>7</td><td>LINK</td></tr></table>";
        let tables = collect_tables(html).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].title.as_deref(), Some("1.2 STATUS Register"));
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[1], vec!["7", "LINK"]);
    }

    #[test]
    fn test_heading_applies_to_following_tables() {
        // One heading followed by two table fragments: both get the title.
        let html = "<h2>Split Register</h2>\
                    <table><tr><td>a</td></tr></table>\
                    <table><tr><td>b</td></tr></table>";
        let tables = collect_tables(html).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].title.as_deref(), Some("Split Register"));
        assert_eq!(tables[1].title.as_deref(), Some("Split Register"));
    }

    #[test]
    fn test_span_becomes_newline_in_cell() {
        let html = "<table><tr><td>line1<span>line2</span></td></tr></table>";
        let tables = collect_tables(html).unwrap();
        assert_eq!(tables[0].rows[0][0], "line1\nline2");
    }

    #[test]
    fn test_br_becomes_newline_in_cell() {
        let html = "<table><tr><td>one<br/>two</td></tr></table>";
        let tables = collect_tables(html).unwrap();
        assert_eq!(tables[0].rows[0][0], "one\ntwo");
    }

    #[test]
    fn test_unbalanced_table_is_fatal() {
        let html = "<p>text</p></table>";
        let result = collect_tables(html);
        assert!(matches!(result, Err(ScanError::UnbalancedTable(_))));
    }

    #[test]
    fn test_attributes_and_comments_are_ignored() {
        let html = "<!-- note --><h2 class=\"title\">T</h2>\
                    <table border=\"1\"><tr><td align='left'>x</td></tr></table>";
        let tables = collect_tables(html).unwrap();
        assert_eq!(tables[0].title.as_deref(), Some("T"));
        assert_eq!(tables[0].rows[0][0], "x");
    }

    #[test]
    fn test_entities_decoded_in_cells() {
        let html = "<table><tr><td>a &amp; b &lt;= 3</td></tr></table>";
        let tables = collect_tables(html).unwrap();
        assert_eq!(tables[0].rows[0][0], "a & b <= 3");
    }

    #[test]
    fn test_table_without_heading_has_no_title() {
        let html = "<table><tr><td>x</td></tr></table>";
        let tables = collect_tables(html).unwrap();
        assert_eq!(tables[0].title, None);
    }

    #[test]
    fn test_unterminated_tag_is_fatal() {
        let result = collect_tables("<table><tr><td>x</td></tr");
        assert!(matches!(result, Err(ScanError::UnterminatedTag(_))));
    }
}
