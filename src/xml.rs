//! Minimal path lookup over XML documents.
//!
//! WinRM bodies are read for a handful of values (`Fault/Reason/Text`,
//! `IdentifyResponse/ProductVendor`, ...). [`find_text`] streams the document
//! once with quick-xml and returns the string value of the first element whose
//! ancestry ends with the given local names, the way `//A/B/C` selects in
//! XPath. Namespace prefixes are ignored.

use std::fmt::{self, Display};

use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// The document could not be read as well-formed XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedXml(String);

impl Display for MalformedXml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MalformedXml {}

fn malformed(err: impl Display) -> MalformedXml {
    MalformedXml(err.to_string())
}

/// Text being collected for a matched element.
struct Capture {
    depth: usize,
    text: String,
}

impl Capture {
    fn push(capture: &mut Option<Capture>, text: &str) {
        if let Some(capture) = capture.as_mut() {
            capture.text.push_str(text);
        }
    }
}

fn ends_with(stack: &[Vec<u8>], path: &[&[u8]]) -> bool {
    stack.len() >= path.len()
        && stack[stack.len() - path.len()..]
            .iter()
            .zip(path.iter())
            .all(|(name, expected)| name.as_slice() == *expected)
}

/// Find the string value of the first element matching `//path[0]/.../path[n]`.
///
/// The whole document is read even after a match, so a truncated or otherwise
/// broken body is an error rather than a partial success. Entity and
/// character references are resolved; CDATA is included verbatim.
pub fn find_text(body: &[u8], path: &[&[u8]]) -> Result<Option<String>, MalformedXml> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut capture: Option<Capture> = None;
    let mut found: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(malformed)? {
            Event::Start(element) => {
                stack.push(element.local_name().as_ref().to_vec());
                if found.is_none() && capture.is_none() && ends_with(&stack, path) {
                    capture = Some(Capture {
                        depth: stack.len(),
                        text: String::new(),
                    });
                }
            }
            Event::Empty(element) => {
                stack.push(element.local_name().as_ref().to_vec());
                if found.is_none() && capture.is_none() && ends_with(&stack, path) {
                    found = Some(String::new());
                }
                stack.pop();
            }
            Event::End(element) => {
                let name = element.local_name();
                match stack.pop() {
                    Some(open) if open.as_slice() == name.as_ref() => {}
                    _ => {
                        return Err(MalformedXml(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(name.as_ref())
                        )))
                    }
                }
                if capture.as_ref().is_some_and(|c| stack.len() < c.depth) {
                    found = capture.take().map(|c| c.text);
                }
            }
            Event::Text(text) => {
                let decoded = text.decode().map_err(malformed)?;
                Capture::push(&mut capture, &decoded);
            }
            Event::CData(cdata) => {
                let decoded = cdata.decode().map_err(malformed)?;
                Capture::push(&mut capture, &decoded);
            }
            Event::GeneralRef(reference) => {
                let name = reference.decode().map_err(malformed)?;
                let reference = format!("&{};", name);
                let resolved = unescape(&reference).map_err(malformed)?;
                Capture::push(&mut capture, &resolved);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(MalformedXml(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(open)
        )));
    }

    Ok(found)
}

/// Escape special characters for XML text and attribute values.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const A_B: [&[u8]; 2] = [b"A", b"B"];

    #[test]
    fn test_find_text_ignores_prefixes() {
        let body = br#"<s:Envelope xmlns:s="urn:s"><s:Body><s:A><s:B>value</s:B></s:A></s:Body></s:Envelope>"#;
        assert_eq!(find_text(body, &A_B).unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_find_text_includes_descendant_text() {
        let body = b"<A><B>one <i>two</i> three</B></A>";
        assert_eq!(find_text(body, &A_B).unwrap().as_deref(), Some("one two three"));
    }

    #[test]
    fn test_find_text_resolves_references() {
        let body = b"<A><B>&quot;x&quot; &amp;&#32;&#x79;</B></A>";
        assert_eq!(find_text(body, &A_B).unwrap().as_deref(), Some("\"x\" & y"));
    }

    #[test]
    fn test_find_text_absent() {
        assert_eq!(find_text(b"<A><C>x</C></A>", &A_B).unwrap(), None);
        assert_eq!(find_text(b"", &A_B).unwrap(), None);
    }

    #[test]
    fn test_find_text_unclosed() {
        assert!(find_text(b"<A><B>x</B>", &A_B).is_err());
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("hello"), "hello");
        assert_eq!(xml_escape("<script>"), "&lt;script&gt;");
        assert_eq!(xml_escape("a & b"), "a &amp; b");
        assert_eq!(xml_escape("\"quoted\""), "&quot;quoted&quot;");
    }
}
