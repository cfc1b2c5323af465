//! Declarative event wiring
//!
//! A page raises `UiEvent`s named after the action on the element (the
//! `data-action` of a button, the id of an input). Each controller publishes
//! a `Bindings` table turning those names into its own action type, so the
//! whole interaction surface can be listed and driven without markup.

use std::collections::HashMap;

/// A user interaction, with the element's data attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiEvent {
    pub name: String,
    pub data: HashMap<String, String>,
}

impl UiEvent {
    pub fn new(name: &str) -> Self {
        UiEvent {
            name: name.to_string(),
            data: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// The `value` of an input event, empty when absent.
    pub fn value(&self) -> &str {
        self.get("value").unwrap_or("")
    }
}

type Builder<A> = fn(&UiEvent) -> Option<A>;

/// Action name -> action constructor.
pub struct Bindings<A> {
    entries: Vec<(&'static str, Builder<A>)>,
}

impl<A> Bindings<A> {
    pub fn new() -> Self {
        Bindings {
            entries: Vec::new(),
        }
    }

    pub fn bind(mut self, name: &'static str, build: Builder<A>) -> Self {
        self.entries.push((name, build));
        self
    }

    /// The action for an event, `None` for unknown names or missing data.
    pub fn resolve(&self, event: &UiEvent) -> Option<A> {
        self.entries
            .iter()
            .find(|(name, _)| *name == event.name)
            .and_then(|(_, build)| build(event))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl<A> Default for Bindings<A> {
    fn default() -> Self {
        Self::new()
    }
}
