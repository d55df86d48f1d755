//! Test doubles for the importer's collaborators.
//!
//! [`ScriptedTokenizer`] replays a fixed event list, which lets tests feed
//! event sequences no XML parser would produce. [`RecordingMonitor`] logs
//! every progress callback.

use std::{
    cell::RefCell,
    collections::VecDeque,
    convert::Infallible,
    rc::Rc,
};

use super::{ImportPhase, Location, ProgressMonitor, StartElement, Tokenizer, XmlEvent};

/// Tokenizer that replays scripted events, then reports `Eof` forever.
///
/// The reported location uses the 1-based event index as the line number.
///
/// # Example
///
/// ```
/// use waymark_data::{ImportOptions, StartElement, XmlEvent, import_osm};
/// use waymark_data::test_support::ScriptedTokenizer;
///
/// let tokenizer = ScriptedTokenizer::new()
///     .start(StartElement::new("osm").with_attribute("version", "0.6"))
///     .empty(StartElement::new("node").with_attribute("id", "-1"))
///     .end();
/// let report = import_osm(tokenizer, ImportOptions::default())?;
/// assert_eq!(report.dataset.len(), 1);
/// # Ok::<(), waymark_data::ImportError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedTokenizer {
    events: VecDeque<XmlEvent>,
    consumed: usize,
}

impl ScriptedTokenizer {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay exactly these events.
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = XmlEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Append a start event.
    #[must_use]
    pub fn start(mut self, element: StartElement) -> Self {
        self.events.push_back(XmlEvent::Start(element));
        self
    }

    /// Append an end event.
    #[must_use]
    pub fn end(mut self) -> Self {
        self.events.push_back(XmlEvent::End);
        self
    }

    /// Append a start event immediately followed by its end event.
    #[must_use]
    pub fn empty(self, element: StartElement) -> Self {
        self.start(element).end()
    }
}

impl Tokenizer for ScriptedTokenizer {
    type Error = Infallible;

    fn next_event(&mut self) -> Result<XmlEvent, Self::Error> {
        let event = self.events.pop_front().unwrap_or(XmlEvent::Eof);
        self.consumed += 1;
        Ok(event)
    }

    fn location(&self) -> Option<Location> {
        (self.consumed > 0).then_some(Location {
            line: self.consumed,
            column: 1,
        })
    }
}

/// One progress callback observed by a [`RecordingMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCall {
    /// `begin(total_steps)`.
    Begin(usize),
    /// `phase(phase)`.
    Phase(ImportPhase),
    /// `worked(steps)`.
    Worked(usize),
    /// `finish()`.
    Finish,
}

/// Monitor that records every callback and can simulate cancellation.
///
/// Clones share the same log, so a test keeps one handle while the importer
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingMonitor {
    calls: Rc<RefCell<Vec<MonitorCall>>>,
    cancel_before: Option<ImportPhase>,
}

impl RecordingMonitor {
    /// Report cancellation once `phase` is about to start.
    #[must_use]
    pub const fn cancelling_before(mut self, phase: ImportPhase) -> Self {
        self.cancel_before = Some(phase);
        self
    }

    /// Snapshot of the callbacks so far.
    #[must_use]
    pub fn calls(&self) -> Vec<MonitorCall> {
        self.calls.borrow().clone()
    }

    fn next_phase(&self) -> ImportPhase {
        let started = self
            .calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, MonitorCall::Phase(_)))
            .count();
        if started == 0 {
            ImportPhase::Parsing
        } else {
            ImportPhase::Resolving
        }
    }
}

impl ProgressMonitor for RecordingMonitor {
    fn begin(&mut self, total_steps: usize) {
        self.calls.borrow_mut().push(MonitorCall::Begin(total_steps));
    }

    fn phase(&mut self, phase: ImportPhase) {
        self.calls.borrow_mut().push(MonitorCall::Phase(phase));
    }

    fn worked(&mut self, steps: usize) {
        self.calls.borrow_mut().push(MonitorCall::Worked(steps));
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_before == Some(self.next_phase())
    }

    fn finish(&mut self) {
        self.calls.borrow_mut().push(MonitorCall::Finish);
    }
}
