//! Style reads, writes and animations on a running transition.
//!
//! `animate_style` diffs the requested targets against the surface's computed
//! style and only hands the properties that actually change to the driver:
//!
//! ```text
//! hidden surface ─────────────► apply targets, resolve
//! zero / absent duration ─────► apply targets, resolve
//! nothing differs ────────────► resolve
//! otherwise ──► pin changed properties to their computed value
//!           └─► driver.drive(..) ──► on_done ──► resolve
//! ```

use futures::channel::oneshot;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::driver::DriveRequest;
use crate::error::{Result, TransitionError};
use crate::handle::TransitionHandle;
use crate::params::AnimationOptions;
use crate::value::{StyleMap, StyleValue, normalize_zero_length, numeric_or_string_equals};

/// Styles to apply or animate: one property or a whole map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRequest(pub StyleMap);

impl<V: Into<StyleValue>> From<(&str, V)> for StyleRequest {
    fn from((property, value): (&str, V)) -> Self {
        let mut map = StyleMap::new();
        map.insert(property.to_string(), value.into());
        Self(map)
    }
}

impl From<StyleMap> for StyleRequest {
    fn from(map: StyleMap) -> Self {
        Self(map)
    }
}

impl From<&StyleMap> for StyleRequest {
    fn from(map: &StyleMap) -> Self {
        Self(map.clone())
    }
}

/// Properties to read with `get_style`.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleQuery {
    Single(String),
    Many(Vec<String>),
}

impl StyleQuery {
    /// Build a query from dynamic input, such as a handler argument.
    ///
    /// Only a string or an array of strings is accepted.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::Single(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| TransitionError::InvalidStyleQuery(item.to_string()))
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Many),
            other => Err(TransitionError::InvalidStyleQuery(other.to_string())),
        }
    }
}

impl From<&str> for StyleQuery {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for StyleQuery {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for StyleQuery {
    fn from(names: Vec<String>) -> Self {
        Self::Many(names)
    }
}

impl From<&[&str]> for StyleQuery {
    fn from(names: &[&str]) -> Self {
        Self::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for StyleQuery {
    fn from(names: [&str; N]) -> Self {
        Self::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Result of `get_style`: a single value, or a map keyed by the requested names.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleLookup {
    Single(Option<StyleValue>),
    Map(StyleMap),
}

impl StyleLookup {
    pub fn single(&self) -> Option<&StyleValue> {
        match self {
            Self::Single(value) => value.as_ref(),
            Self::Map(_) => None,
        }
    }

    pub fn map(&self) -> Option<&StyleMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Single(_) => None,
        }
    }
}

/// Future returned by `animate_style`; resolves when the animation is done.
#[derive(Debug)]
#[must_use = "an animation does nothing to the transition's completion unless awaited or returned"]
pub struct StyleAnimation {
    done: Option<oneshot::Receiver<()>>,
}

impl StyleAnimation {
    pub(crate) fn resolved() -> Self {
        Self { done: None }
    }

    pub(crate) fn pending(done: oneshot::Receiver<()>) -> Self {
        Self { done: Some(done) }
    }

    /// True once the driver has signalled completion (or dropped its callback).
    pub fn is_settled(&mut self) -> bool {
        match self.done.as_mut() {
            None => true,
            Some(rx) => !matches!(rx.try_recv(), Ok(None)),
        }
    }
}

impl Future for StyleAnimation {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(rx) = self.done.as_mut() else {
            return Poll::Ready(());
        };
        match Pin::new(rx).poll(cx) {
            // A dropped sender also settles, so a misbehaving driver cannot hang the transition.
            Poll::Ready(_) => {
                self.done = None;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl TransitionHandle {
    /// Animate the surface towards `request`.
    ///
    /// Without `options` a one-time warning is emitted and the transition's
    /// own first parameter supplies duration and easing.
    pub fn animate_style(
        &self,
        request: impl Into<StyleRequest>,
        options: Option<&AnimationOptions>,
    ) -> StyleAnimation {
        let StyleRequest(targets) = request.into();

        if !self.env.styles.is_visible() {
            self.apply(&targets);
            return StyleAnimation::resolved();
        }

        let options = match options {
            Some(options) => options.clone(),
            None => {
                self.env.diagnostics.warn_once(
                    "animate_style was called without options; using the transition's own parameters",
                    &self.name,
                );
                self.ambient.clone()
            }
        };

        if !options.is_animated() {
            self.apply(&targets);
            return StyleAnimation::resolved();
        }

        let computed = self.env.styles.computed_style(&self.surface);
        let mut resolved = StyleMap::new();
        let mut changed = Vec::new();
        for (property, target) in &targets {
            let name = self.env.resolver.resolve(property);
            let current = computed.get(&name).cloned().map(normalize_zero_length);
            resolved.insert(name.clone(), target.clone());

            // A computed "0px" reads as 0 here, so a "0px" target still counts as a change.
            if current
                .as_ref()
                .is_some_and(|current| numeric_or_string_equals(current, target))
            {
                continue;
            }
            // Pin the computed value so the driver has a concrete start (e.g. for `auto`).
            if let Some(current) = current {
                self.surface.set(name.clone(), current);
            }
            changed.push(name);
        }

        if changed.is_empty() {
            tracing::trace!(transition = %self.id, "no style changes to animate");
            return StyleAnimation::resolved();
        }

        let (tx, rx) = oneshot::channel();
        self.env.driver.drive(DriveRequest {
            transition: self.id,
            surface: self.surface.clone(),
            targets: resolved,
            options,
            changed,
            on_done: Box::new(move || {
                let _ = tx.send(());
            }),
        });
        StyleAnimation::pending(rx)
    }

    /// Callback-style `animate_style`; always fails.
    #[deprecated(note = "await the StyleAnimation returned by animate_style instead")]
    pub fn animate_style_with_callback<F: FnOnce()>(
        &self,
        _request: impl Into<StyleRequest>,
        _options: Option<&AnimationOptions>,
        _callback: F,
    ) -> Result<StyleAnimation> {
        Err(TransitionError::CallbackArgument)
    }

    /// Read computed values. A zero pixel length reads as the number zero.
    pub fn get_style(&self, query: impl Into<StyleQuery>) -> StyleLookup {
        let computed = self.env.styles.computed_style(&self.surface);
        let read = |property: &str| {
            computed
                .get(&self.env.resolver.resolve(property))
                .cloned()
                .map(normalize_zero_length)
        };

        match query.into() {
            StyleQuery::Single(property) => StyleLookup::Single(read(&property)),
            StyleQuery::Many(properties) => StyleLookup::Map(
                properties
                    .into_iter()
                    .filter_map(|property| read(&property).map(|value| (property, value)))
                    .collect(),
            ),
        }
    }

    /// `get_style` for dynamic input; fails unless given a string or an array of strings.
    pub fn try_get_style(&self, query: &Value) -> Result<StyleLookup> {
        Ok(self.get_style(StyleQuery::from_value(query)?))
    }

    /// Write styles to the surface immediately.
    pub fn set_style(&self, request: impl Into<StyleRequest>) -> &Self {
        let StyleRequest(styles) = request.into();
        self.apply(&styles);
        self
    }

    fn apply(&self, styles: &StyleMap) {
        for (property, value) in styles {
            self.surface
                .set(self.env.resolver.resolve(property), value.clone());
        }
    }
}
