#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Shared test helper; not every integration test uses every mock/utility

pub mod mock_input;
pub mod mock_terminal;

use opentui_mouse::dispatch::{ElementId, Rect};
use opentui_mouse::{MouseSession, SessionOptions};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::Level;

pub use mock_input::MockInput;
pub use mock_terminal::MockTerminal;

/// Route crate diagnostics to the test output.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Element layout the test can edit between events.
#[derive(Clone, Default)]
pub struct Layout {
    rects: Rc<RefCell<HashMap<ElementId, Rect>>>,
}

impl Layout {
    pub fn place(&self, element: ElementId, rect: Rect) {
        self.rects.borrow_mut().insert(element, rect);
    }

    pub fn remove(&self, element: ElementId) {
        self.rects.borrow_mut().remove(&element);
    }

    /// Geometry closure reading this layout.
    pub fn geometry(&self) -> impl Fn(ElementId) -> Option<Rect> + 'static {
        let rects = Rc::clone(&self.rects);
        move |id| rects.borrow().get(&id).copied()
    }
}

/// A session over mocks with the given options.
pub fn session_with(
    options: SessionOptions,
) -> (MouseSession<MockInput, MockTerminal>, MockInput, MockTerminal, Layout) {
    let input = MockInput::tty();
    let terminal = MockTerminal::new();
    let layout = Layout::default();
    let session = MouseSession::new(input.clone(), terminal.clone(), layout.geometry(), options);
    (session, input, terminal, layout)
}

/// A session over mocks with default options.
pub fn session() -> (MouseSession<MockInput, MockTerminal>, MockInput, MockTerminal, Layout) {
    session_with(SessionOptions::default())
}

/// Shared event log for handlers.
pub type Trace = Rc<RefCell<Vec<String>>>;

/// Handler that appends `tag:event` to `trace`.
pub fn record(trace: &Trace, tag: &str) -> impl Fn(&opentui_mouse::MouseEvent) + 'static {
    let trace = Rc::clone(trace);
    let tag = tag.to_string();
    move |event| trace.borrow_mut().push(format!("{tag}:{event}"))
}

/// Render a trace as one line per entry.
pub fn lines(trace: &Trace) -> String {
    trace.borrow().join("\n")
}
