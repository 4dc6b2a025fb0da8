//! Named callbacks for the input dialog
//!
//! Pages name the function that receives the typed text with the
//! `data-input-callback` attribute. Names are resolved against this registry
//! at submit time; nothing is looked up dynamically.

use super::types::{DialogError, DialogResult};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// A callback receiving the submitted text
pub type Callback = Box<dyn FnMut(&str) -> anyhow::Result<()>>;

/// Registry mapping callback names to functions
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Callback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&str) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        debug!("Registering callback '{}'", name);
        self.callbacks.insert(name, Box::new(callback));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.callbacks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve `name` and call it with `text`
    pub fn invoke(&mut self, name: &str, text: &str) -> DialogResult<()> {
        let callback = self
            .callbacks
            .get_mut(name)
            .ok_or_else(|| DialogError::UnknownCallback(name.to_string()))?;

        callback(text).map_err(|source| DialogError::Callback {
            name: name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_invoke_registered() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut registry = CallbackRegistry::new();
        registry.register("tag", move |text: &str| {
            sink.borrow_mut().push(text.to_string());
            Ok(())
        });

        registry.invoke("tag", "v1.0").unwrap();
        registry.invoke("tag", "").unwrap();
        assert_eq!(*seen.borrow(), vec!["v1.0".to_string(), String::new()]);
    }

    #[test]
    fn test_unknown_callback() {
        let mut registry = CallbackRegistry::new();
        let err = registry.invoke("nope", "x").unwrap_err();

        assert!(matches!(err, DialogError::UnknownCallback(name) if name == "nope"));
    }

    #[test]
    fn test_failing_callback() {
        let mut registry = CallbackRegistry::new();
        registry.register("fail", |_: &str| Err(anyhow::anyhow!("rejected")));

        let err = registry.invoke("fail", "x").unwrap_err();
        assert!(matches!(err, DialogError::Callback { ref name, .. } if name == "fail"));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = CallbackRegistry::new();
        registry.register("b", |_: &str| Ok(()));
        registry.register("a", |_: &str| Ok(()));

        assert!(registry.contains("a"));
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    }
}
