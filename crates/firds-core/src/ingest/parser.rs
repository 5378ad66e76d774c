use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed XML at byte {position}: {source}")]
    Malformed {
        position: u64,
        source: quick_xml::Error,
    },
    #[error("Invalid attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("Invalid character data: {0}")]
    Escape(#[from] quick_xml::Error),
    #[error("Document ended with {0} unclosed element(s)")]
    Unclosed(usize),
    #[error("Document has no root element")]
    NoRoot,
}

pub type ParseResult<T> = Result<T, ParseError>;

/// One step of a depth-tracked walk over an XML document.
///
/// `depth` is the nesting level of the element the event belongs to, with the
/// root element at depth 1. Self-closing elements produce a `Start` followed
/// by a matching `End`. Text inside the root is reported exactly as written,
/// whitespace included; text outside the root is dropped.
#[derive(Debug)]
pub(crate) enum XmlEvent<'a> {
    Start { element: BytesStart<'a>, depth: usize },
    End { depth: usize },
    Text(String),
}

pub(crate) struct ElementStream<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
    seen_root: bool,
    pending_end: Option<usize>,
}

impl<'a> ElementStream<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::from_reader(input),
            depth: 0,
            seen_root: false,
            pending_end: None,
        }
    }

    /// Returns `Ok(None)` once the document is exhausted and balanced.
    pub(crate) fn next_event(&mut self) -> ParseResult<Option<XmlEvent<'a>>> {
        if let Some(depth) = self.pending_end.take() {
            return Ok(Some(XmlEvent::End { depth }));
        }

        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(source) => {
                    return Err(ParseError::Malformed {
                        position: self.reader.buffer_position(),
                        source,
                    })
                }
            };

            match event {
                Event::Start(element) => {
                    self.seen_root = true;
                    self.depth += 1;
                    return Ok(Some(XmlEvent::Start {
                        element,
                        depth: self.depth,
                    }));
                }
                Event::Empty(element) => {
                    self.seen_root = true;
                    let depth = self.depth + 1;
                    self.pending_end = Some(depth);
                    return Ok(Some(XmlEvent::Start { element, depth }));
                }
                Event::End(_) => {
                    let depth = self.depth;
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Some(XmlEvent::End { depth }));
                }
                Event::Text(text) if self.depth > 0 => {
                    let text = text.unescape()?;
                    if !text.is_empty() {
                        return Ok(Some(XmlEvent::Text(text.into_owned())));
                    }
                }
                Event::CData(data) if self.depth > 0 => {
                    let raw = data.into_inner();
                    return Ok(Some(XmlEvent::Text(
                        String::from_utf8_lossy(&raw).into_owned(),
                    )));
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(ParseError::Unclosed(self.depth));
                    }
                    if !self.seen_root {
                        return Err(ParseError::NoRoot);
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

/// Compare an element's name ignoring any namespace prefix
pub(crate) fn has_local_name(element: &BytesStart<'_>, name: &str) -> bool {
    element.local_name().as_ref() == name.as_bytes()
}

/// First attribute whose local name matches `key`
pub(crate) fn attribute(element: &BytesStart<'_>, key: &str) -> ParseResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
