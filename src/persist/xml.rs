//! Minimal tag-delimited text reader and writer.
//!
//! Covers what the cvars file needs: nested elements, text content, the five
//! predefined entities plus numeric references, comments, CDATA and a leading
//! declaration. Attributes are skipped on read and never written.

use thiserror::Error;

/// A parse failure with the byte offset where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at byte {offset}")]
pub struct XmlError {
    pub offset: usize,
    pub reason: String,
}

/// One parsed element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Concatenated and unescaped text content, whitespace included.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// First child with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// The value this element carries: its text, or for a structured value
    /// the serialized form of its first child element.
    pub fn value_text(&self) -> String {
        match self.children.first() {
            Some(first) => {
                let mut writer = XmlWriter::new(4);
                writer.write_element(first);
                writer.finish().trim_end().to_string()
            }
            None => self.text.clone(),
        }
    }
}

/// Parse a single element, ignoring surrounding whitespace.
pub fn parse_element(input: &str) -> Result<Element, XmlError> {
    parse_document(input)
}

/// Parse a document: optional declaration and comments, then one root element.
pub fn parse_document(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader { input, pos: 0 };
    reader.skip_misc()?;
    let root = reader.element()?;
    reader.skip_misc()?;
    if reader.pos < input.len() {
        return Err(reader.error("unexpected content after the root element"));
    }
    Ok(root)
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error(&self, reason: impl Into<String>) -> XmlError {
        XmlError {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn skip_past(&mut self, terminator: &str) -> Result<&'a str, XmlError> {
        let rest = self.rest();
        match rest.find(terminator) {
            Some(end) => {
                self.pos += end + terminator.len();
                Ok(&rest[..end])
            }
            None => Err(self.error(format!("missing \"{terminator}\""))),
        }
    }

    // Whitespace, declarations, comments and doctype between elements.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<!") && !rest.starts_with("<![CDATA[") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<&'a str, XmlError> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '<' | '='))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected a tag name"));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    // Attributes are read past, honouring quotes.
    fn skip_attributes(&mut self) -> Result<bool, XmlError> {
        let mut quote = None;
        for (offset, c) in self.rest().char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '>') => {
                    let self_closing = self.rest()[..offset].trim_end().ends_with('/');
                    self.pos += offset + 1;
                    return Ok(self_closing);
                }
                (None, '<') => break,
                (None, _) => {}
            }
        }
        Err(self.error("unterminated start tag"))
    }

    fn element(&mut self) -> Result<Element, XmlError> {
        if !self.rest().starts_with('<') {
            return Err(self.error("expected '<'"));
        }
        self.pos += 1;

        let name = self.name()?.to_string();
        let mut element = Element {
            name,
            ..Element::default()
        };

        if self.skip_attributes()? {
            return Ok(element);
        }

        let mut text = String::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error(format!("missing </{}>", element.name)));
            } else if rest.starts_with("</") {
                self.pos += 2;
                let closing = self.name()?;
                if closing != element.name {
                    return Err(self.error(format!(
                        "expected </{}>, found </{}>",
                        element.name, closing
                    )));
                }
                self.skip_whitespace();
                if !self.rest().starts_with('>') {
                    return Err(self.error("expected '>'"));
                }
                self.pos += 1;
                break;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                text.push_str(self.skip_past("]]>")?);
            } else if rest.starts_with('<') {
                element.children.push(self.element()?);
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                text.push_str(&unescape(&rest[..end]));
                self.pos += end;
            }
        }

        element.text = text;
        Ok(element)
    }
}

/// Escape text content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Resolve entity and character references. Unknown references are kept.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = rest.find(';') else {
            break;
        };
        let entity = &rest[1..end];
        let resolved = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse))
                .and_then(|code| code.ok())
                .and_then(char::from_u32),
        };

        match resolved {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Indenting writer for nested elements.
#[derive(Debug)]
pub struct XmlWriter {
    out: String,
    depth: usize,
    step: usize,
}

impl XmlWriter {
    /// Create a writer that indents `step` spaces per nesting level.
    pub fn new(step: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            step,
        }
    }

    fn indent(&mut self) {
        let width = self.depth * self.step;
        self.out.extend(std::iter::repeat_n(' ', width));
    }

    /// Write `<tag>` and indent what follows.
    pub fn open(&mut self, tag: &str) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    /// Unindent and write `</tag>`.
    pub fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// Write `<tag>value</tag>`.
    ///
    /// With `structured` set, a value that is itself a well formed element is
    /// nested as a block. Anything else is escaped.
    pub fn element(&mut self, tag: &str, value: &str, structured: bool) {
        if structured && is_structured(value) {
            self.open(tag);
            self.block(value);
            self.close(tag);
        } else {
            self.text_element(tag, value);
        }
    }

    /// Write `<tag>value</tag>` with `value` always escaped.
    pub fn text_element(&mut self, tag: &str, value: &str) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push('>');
        self.out.push_str(&escape(value));
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// Write a parsed element and its subtree.
    pub fn write_element(&mut self, element: &Element) {
        if element.children.is_empty() {
            self.text_element(&element.name, &element.text);
            return;
        }

        self.open(&element.name);
        for child in &element.children {
            self.write_element(child);
        }
        self.close(&element.name);
    }

    // Re-indent a pre-rendered block, reading its nesting from multiples of
    // four leading spaces.
    fn block(&mut self, text: &str) {
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let trimmed = line.trim_start();
            let nested = (line.len() - trimmed.len()) / 4;
            self.indent();
            self.out
                .extend(std::iter::repeat_n(' ', nested * self.step));
            self.out.push_str(trimmed.trim_end());
            self.out.push('\n');
        }
    }

    /// The rendered text, ending in a newline.
    pub fn finish(self) -> String {
        self.out
    }
}

fn is_structured(value: &str) -> bool {
    value.trim_start().starts_with('<') && parse_element(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let doc = parse_document(
            "<?xml version=\"1.0\"?>\n<!-- saved -->\n<cvars>\n  <a.b>1</a.b>\n  <c attr=\"x\">two words</c>\n  <empty/>\n</cvars>\n",
        )
        .unwrap();

        assert_eq!(doc.name, "cvars");
        assert_eq!(doc.children.len(), 3);
        assert_eq!(doc.child("a.b").unwrap().text, "1");
        assert_eq!(doc.child("c").unwrap().text, "two words");
        assert_eq!(doc.child("empty").unwrap().text, "");
    }

    #[test]
    fn test_leaf_text_keeps_whitespace() {
        let doc = parse_document("<v>  padded  </v>").unwrap();
        assert_eq!(doc.value_text(), "  padded  ");
    }

    #[test]
    fn test_markup_text_stays_text_unless_structured() {
        let mut writer = XmlWriter::new(4);
        writer.element("v", "<a><b>1</b></a>", false);
        let text = writer.finish();
        assert_eq!(text, "<v>&lt;a&gt;&lt;b&gt;1&lt;/b&gt;&lt;/a&gt;</v>\n");

        let doc = parse_document(&text).unwrap();
        assert!(doc.children.is_empty());
        assert_eq!(doc.value_text(), "<a><b>1</b></a>");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("<a>").is_err());
        assert!(parse_document("plain").is_err());
        assert!(parse_document("<a></a><b></b>").is_err());
    }

    #[test]
    fn test_escape_round_trip() {
        let raw = "a < b && \"c\" > 'd'";
        let escaped = escape(raw);
        assert!(!escaped.contains('<'));
        assert_eq!(unescape(&escaped), raw);
        assert_eq!(unescape("&#65;&#x42;&bogus;"), "AB&bogus;");
    }

    #[test]
    fn test_cdata() {
        let doc = parse_document("<v><![CDATA[<raw> & text]]></v>").unwrap();
        assert_eq!(doc.text, "<raw> & text");
    }

    #[test]
    fn test_writer_nests_structured_values() {
        let mut inner = XmlWriter::new(4);
        inner.open("map");
        inner.element("Key", "k", false);
        inner.close("map");
        let inner = inner.finish();

        let mut writer = XmlWriter::new(2);
        writer.open("cvars");
        writer.element("plain", "1 < 2", true);
        writer.element("nested", &inner, true);
        writer.close("cvars");

        let text = writer.finish();
        assert_eq!(
            text,
            "<cvars>\n  <plain>1 &lt; 2</plain>\n  <nested>\n    <map>\n      <Key>k</Key>\n    </map>\n  </nested>\n</cvars>\n"
        );

        let doc = parse_document(&text).unwrap();
        assert_eq!(doc.child("plain").unwrap().value_text(), "1 < 2");
        assert_eq!(
            doc.child("nested").unwrap().value_text(),
            "<map>\n    <Key>k</Key>\n</map>"
        );
    }

    #[test]
    fn test_unbalanced_text_is_escaped() {
        let mut writer = XmlWriter::new(4);
        writer.element("v", "<not closed", true);
        assert_eq!(writer.finish(), "<v>&lt;not closed</v>\n");
    }
}
