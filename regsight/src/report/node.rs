//! Markup node tree for the report renderer.
//!
//! A closed set of node variants with a uniform render-to-text capability.
//! The report only ever needs this fixed vocabulary, so a tagged union
//! beats an open element tree: the renderer cannot produce markup the
//! serializer does not understand.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Raw text, escaped on render.
    Text(String),
    /// Section heading; `flagged` renders with the deviation style class.
    Heading { text: String, flagged: bool },
    /// Table of rows.
    Table(Vec<Node>),
    /// Row of cells.
    Row(Vec<Node>),
    /// Header cell with an optional fixed width.
    HeaderCell {
        text: String,
        width: Option<&'static str>,
    },
    /// Data cell; lines render separated by `<br>`, `flagged` renders with
    /// the deviation style class.
    Cell { lines: Vec<String>, flagged: bool },
    /// Grouping container (one per register section).
    Container(Vec<Node>),
    /// Stylesheet link for the document head.
    Stylesheet(String),
    /// Whole document.
    Document { head: Vec<Node>, body: Vec<Node> },
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    Ok(())
}

fn write_children(f: &mut fmt::Formatter<'_>, children: &[Node]) -> fmt::Result {
    for child in children {
        write!(f, "{}", child)?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => write_escaped(f, text),
            Node::Heading { text, flagged } => {
                if *flagged {
                    f.write_str("<h1 class=\"red\">")?;
                } else {
                    f.write_str("<h1>")?;
                }
                write_escaped(f, text)?;
                f.write_str("</h1>")
            }
            Node::Table(rows) => {
                f.write_str("<table>")?;
                write_children(f, rows)?;
                f.write_str("</table>")
            }
            Node::Row(cells) => {
                f.write_str("<tr>")?;
                write_children(f, cells)?;
                f.write_str("</tr>")
            }
            Node::HeaderCell { text, width } => {
                match width {
                    Some(w) => write!(f, "<th style=\"width:{}\">", w)?,
                    None => f.write_str("<th>")?,
                }
                write_escaped(f, text)?;
                f.write_str("</th>")
            }
            Node::Cell { lines, flagged } => {
                if *flagged {
                    f.write_str("<td class=\"red\">")?;
                } else {
                    f.write_str("<td>")?;
                }
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        f.write_str("<br>")?;
                    }
                    write_escaped(f, line)?;
                }
                f.write_str("</td>")
            }
            Node::Container(children) => {
                f.write_str("<div>")?;
                write_children(f, children)?;
                f.write_str("</div>")
            }
            Node::Stylesheet(href) => {
                write!(f, "<link rel=\"stylesheet\" href=\"{}\">", href)
            }
            Node::Document { head, body } => {
                f.write_str("<html><head>")?;
                write_children(f, head)?;
                f.write_str("</head><body>")?;
                write_children(f, body)?;
                f.write_str("</body></html>")
            }
        }
    }
}
