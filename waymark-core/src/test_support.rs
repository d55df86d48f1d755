//! Test-only helpers shared by unit and behaviour tests.

use std::{cell::RefCell, rc::Rc};

use crate::{DatasetEvent, DatasetListener};

/// Listener that records every delivered event.
///
/// Clones share the same log, so a test can keep one handle while the
/// dataset owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Rc<RefCell<Vec<DatasetEvent>>>,
}

impl RecordingListener {
    /// Snapshot of the events delivered so far.
    pub fn events(&self) -> Vec<DatasetEvent> {
        self.events.borrow().clone()
    }
}

impl DatasetListener for RecordingListener {
    fn on_event(&mut self, event: &DatasetEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
