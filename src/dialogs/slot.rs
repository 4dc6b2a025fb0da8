//! One-shot handler slot
//!
//! A flow keeps its pending invocation here. Arming replaces whatever was
//! armed before, and taking empties the slot, so a dialog button can fire
//! the handler of the latest configuration at most once.

/// Holds at most one armed handler
#[derive(Debug)]
pub struct HandlerSlot<T> {
    current: Option<T>,
}

impl<T> HandlerSlot<T> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Bind a new handler, returning the one it displaced
    pub fn arm(&mut self, handler: T) -> Option<T> {
        self.current.replace(handler)
    }

    /// Consume the armed handler
    pub fn take(&mut self) -> Option<T> {
        self.current.take()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }
}

impl<T> Default for HandlerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
