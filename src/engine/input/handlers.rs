// Edge listeners

use super::action::{ActionEvent, Edge};
use std::collections::HashMap;
use std::fmt;

/// Listener invoked for every dispatched edge event
pub type Handler = Box<dyn FnMut(&ActionEvent<'_>)>;

/// One listener per edge type
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<Edge, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the listener for an edge, replacing any previous one
    pub fn on<F>(&mut self, edge: Edge, handler: F)
    where
        F: FnMut(&ActionEvent<'_>) + 'static,
    {
        self.handlers.insert(edge, Box::new(handler));
    }

    /// Remove the listener for an edge
    pub fn remove(&mut self, edge: Edge) -> bool {
        self.handlers.remove(&edge).is_some()
    }

    pub fn contains(&self, edge: Edge) -> bool {
        self.handlers.contains_key(&edge)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver an event to this table's listener for its edge, falling back
    /// to `fallback` when this table has none. Returns whether a listener ran.
    pub fn dispatch(&mut self, fallback: &mut HandlerTable, event: &ActionEvent<'_>) -> bool {
        let handler = match self.handlers.get_mut(&event.edge) {
            Some(handler) => handler,
            None => match fallback.handlers.get_mut(&event.edge) {
                Some(handler) => handler,
                None => return false,
            },
        };
        handler(event);
        true
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("edges", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
