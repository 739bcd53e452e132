//! The animatable surface: the inline style of a rendered element.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::{StyleMap, StyleValue};

/// Shared handle to an element's inline style.
///
/// The view tree owns the surface; a started transition keeps a clone so it
/// can keep writing styles while its animation is in flight.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    inline: Rc<RefCell<StyleMap>>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: StyleMap) -> Self {
        Self {
            inline: Rc::new(RefCell::new(style)),
        }
    }

    /// Snapshot of the current inline style.
    pub fn inline_style(&self) -> StyleMap {
        self.inline.borrow().clone()
    }

    pub fn get(&self, property: &str) -> Option<StyleValue> {
        self.inline.borrow().get(property).cloned()
    }

    pub fn set(&self, property: impl Into<String>, value: StyleValue) {
        self.inline.borrow_mut().insert(property.into(), value);
    }

    pub fn remove(&self, property: &str) -> Option<StyleValue> {
        self.inline.borrow_mut().remove(property)
    }

    /// Replace the whole inline style, e.g. to restore a snapshot.
    pub fn replace(&self, style: StyleMap) {
        *self.inline.borrow_mut() = style;
    }

    /// True if both handles point at the same surface.
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.inline, &other.inline)
    }
}
