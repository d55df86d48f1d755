//! Event-level view of an input document.
//!
//! The importer consumes a document only through [`Tokenizer`]: a stream of
//! start-element and end-element events with attribute lookup and a
//! position for diagnostics. Character decoding and transport are the
//! tokenizer's concern.

use std::fmt;

/// A 1-based position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number in bytes, starting at 1.
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// An element start tag with its attributes.
///
/// # Examples
/// ```
/// use waymark_data::StartElement;
///
/// let element = StartElement::new("node")
///     .with_attribute("id", "1")
///     .with_attribute("version", "2");
/// assert_eq!(element.name(), "node");
/// assert_eq!(element.attribute("version"), Some("2"));
/// assert_eq!(element.attribute("changeset"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    name: String,
    attributes: Vec<(String, String)>,
}

impl StartElement {
    /// An element without attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_attribute(name, value);
        self
    }

    /// Append an attribute in place.
    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Local name of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the first attribute called `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One step through the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element starts.
    Start(StartElement),
    /// The most recently started open element ends.
    End,
    /// The input is exhausted.
    Eof,
}

/// Source of [`XmlEvent`]s.
///
/// Implementations guarantee that every `End` closes the innermost open
/// `Start`; the importer treats any violation as a fatal stream error.
pub trait Tokenizer {
    /// Transport or decoding failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Advance to the next event.
    fn next_event(&mut self) -> Result<XmlEvent, Self::Error>;

    /// Position of the most recently returned event, if known.
    fn location(&self) -> Option<Location>;
}
