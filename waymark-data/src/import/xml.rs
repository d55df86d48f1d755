//! [`Tokenizer`] implementation backed by `quick-xml`.

use std::io::{self, BufRead, Read};

use quick_xml::{
    Reader,
    events::{BytesStart, Event, attributes::AttrError},
};
use thiserror::Error;

use super::tokenizer::{Location, StartElement, Tokenizer, XmlEvent};

/// Errors raised while tokenizing XML input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenizeError {
    /// The document is not well-formed or could not be read.
    #[error("malformed XML: {source}")]
    Xml {
        /// Error reported by `quick-xml`.
        #[from]
        source: quick_xml::Error,
    },
    /// An attribute could not be parsed.
    #[error("malformed attribute: {source}")]
    Attribute {
        /// Error reported by `quick-xml`.
        #[from]
        source: AttrError,
    },
    /// A name was not valid UTF-8.
    #[error("name is not valid UTF-8: {source}")]
    Encoding {
        /// Decoding failure.
        #[from]
        source: std::str::Utf8Error,
    },
}

/// Streams [`XmlEvent`]s out of a buffered reader.
///
/// Self-closing elements produce a start event immediately followed by an
/// end event. Text, comments, processing instructions and declarations are
/// skipped. Mismatched end tags are reported as errors.
///
/// # Examples
/// ```
/// use waymark_data::{QuickXmlTokenizer, Tokenizer, XmlEvent};
///
/// let mut tokenizer = QuickXmlTokenizer::new(&b"<osm version=\"0.6\"/>"[..]);
/// let XmlEvent::Start(root) = tokenizer.next_event()? else {
///     panic!("expected the root element");
/// };
/// assert_eq!(root.attribute("version"), Some("0.6"));
/// assert_eq!(tokenizer.next_event()?, XmlEvent::End);
/// assert_eq!(tokenizer.next_event()?, XmlEvent::Eof);
/// # Ok::<(), waymark_data::TokenizeError>(())
/// ```
pub struct QuickXmlTokenizer<R: BufRead> {
    reader: Reader<LineTracking<R>>,
    buf: Vec<u8>,
    pending_end: bool,
}

impl<R: BufRead> QuickXmlTokenizer<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(LineTracking::new(inner));
        reader.check_end_names(true);
        Self {
            reader,
            buf: Vec::new(),
            pending_end: false,
        }
    }

    fn start_element(start: &BytesStart<'_>) -> Result<StartElement, TokenizeError> {
        let mut element = StartElement::new(std::str::from_utf8(start.local_name().as_ref())?);
        for attribute in start.attributes() {
            let attribute = attribute?;
            let name = std::str::from_utf8(attribute.key.local_name().as_ref())?.to_owned();
            let value = attribute.unescape_value()?.into_owned();
            element.push_attribute(name, value);
        }
        Ok(element)
    }
}

impl<R: BufRead> Tokenizer for QuickXmlTokenizer<R> {
    type Error = TokenizeError;

    fn next_event(&mut self) -> Result<XmlEvent, Self::Error> {
        if self.pending_end {
            self.pending_end = false;
            return Ok(XmlEvent::End);
        }
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => return Ok(XmlEvent::Start(Self::start_element(&start)?)),
                Event::Empty(start) => {
                    let element = Self::start_element(&start)?;
                    self.pending_end = true;
                    return Ok(XmlEvent::Start(element));
                }
                Event::End(_) => return Ok(XmlEvent::End),
                Event::Eof => return Ok(XmlEvent::Eof),
                Event::Text(_)
                | Event::CData(_)
                | Event::Comment(_)
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => {}
            }
        }
    }

    fn location(&self) -> Option<Location> {
        Some(
            self.reader
                .get_ref()
                .location_of(self.reader.buffer_position()),
        )
    }
}

/// Buffered reader that counts the lines it has consumed.
///
/// Only the current position is ever located, so two counters suffice.
struct LineTracking<R> {
    inner: R,
    consumed: usize,
    /// Newlines consumed so far.
    lines: usize,
    /// Offset of the first byte after the latest newline.
    line_start: usize,
}

impl<R> LineTracking<R> {
    const fn new(inner: R) -> Self {
        Self {
            inner,
            consumed: 0,
            lines: 0,
            line_start: 0,
        }
    }

    /// Locate an offset on the current line.
    const fn location_of(&self, offset: usize) -> Location {
        Location {
            line: self.lines + 1,
            column: offset.saturating_sub(self.line_start) + 1,
        }
    }
}

impl<R: BufRead> Read for LineTracking<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let count = available.len().min(out.len());
        if let (Some(target), Some(source)) = (out.get_mut(..count), available.get(..count)) {
            target.copy_from_slice(source);
        }
        self.consume(count);
        Ok(count)
    }
}

impl<R: BufRead> BufRead for LineTracking<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amount: usize) {
        if amount == 0 {
            return;
        }
        // The bytes being consumed are still at the front of the inner buffer.
        if let Ok(buffer) = self.inner.fill_buf() {
            let taken = buffer.get(..amount).unwrap_or(buffer);
            self.lines += taken.iter().filter(|byte| **byte == b'\n').count();
            if let Some(last) = taken.iter().rposition(|byte| *byte == b'\n') {
                self.line_start = self.consumed + last + 1;
            }
        }
        self.consumed += amount;
        self.inner.consume(amount);
    }
}
