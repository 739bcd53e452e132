//! Parameter shorthand expansion and animation options.
//!
//! Handlers receive their first argument in whatever shape the template
//! author wrote it: a number, a preset name or a full options object.
//! [`process_params`] expands all of them to an options map merged over the
//! handler's defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Duration of the `"slow"` preset in milliseconds.
pub const SLOW_DURATION_MS: u64 = 600;
/// Duration of the `"fast"` preset in milliseconds.
pub const FAST_DURATION_MS: u64 = 200;
/// Duration of any other preset name in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 400;

/// Expand shorthand parameters and merge them over `defaults`.
///
/// - a number `n` becomes `{duration: n}`
/// - a string becomes a preset: `"slow"` → 600, `"fast"` → 200, anything else → 400
/// - an object is used as-is
/// - `null`, `false` and other non-object values contribute nothing
///
/// Keys from `params` win over keys from `defaults`.
pub fn process_params(params: &Value, defaults: &Map<String, Value>) -> Map<String, Value> {
    let explicit = match params {
        Value::Number(n) => duration_map(Value::Number(n.clone())),
        Value::String(name) => duration_map(Value::from(match name.as_str() {
            "slow" => SLOW_DURATION_MS,
            "fast" => FAST_DURATION_MS,
            _ => DEFAULT_DURATION_MS,
        })),
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let mut merged = defaults.clone();
    merged.extend(explicit);
    merged
}

fn duration_map(duration: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("duration".to_string(), duration);
    map
}

/// Timing options for a single `animate_style` call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationOptions {
    /// Duration in milliseconds. Absent or zero means "apply immediately".
    pub duration: Option<f64>,
    /// CSS timing-function name.
    pub easing: Option<String>,
    /// Delay before the animation starts, in milliseconds.
    pub delay: Option<f64>,
}

impl AnimationOptions {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Read options out of a processed parameter map.
    ///
    /// Fields of the wrong type are ignored rather than rejected.
    pub fn from_params(params: &Map<String, Value>) -> Self {
        Self {
            duration: params.get("duration").and_then(Value::as_f64),
            easing: params
                .get("easing")
                .and_then(Value::as_str)
                .map(str::to_string),
            delay: params.get("delay").and_then(Value::as_f64),
        }
    }

    /// True when there is a positive duration to animate over.
    pub fn is_animated(&self) -> bool {
        self.duration.is_some_and(|d| d > 0.0)
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.unwrap_or(0.0).max(0.0)
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay.unwrap_or(0.0).max(0.0)
    }
}

/// Truthiness of a parameter value.
///
/// `null`, `false`, `0`, NaN and `""` are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
