//! Frame-ticked transition driver.
//!
//! `FrameDriver` is the timer flavour of "animation finished" detection. The
//! host calls [`FrameDriver::tick`] once per frame; each pending animation
//! waits out its delay, interpolates its changed properties with the
//! requested easing, and on reaching `delay + duration` writes the exact
//! targets and fires its completion callback.
//!
//! # Usage
//!
//! ```ignore
//! let driver = Rc::new(FrameDriver::new());
//! let env = TransitionEnv::new(pool.spawner()).with_driver(driver.clone());
//!
//! // ... start transitions ...
//!
//! while !driver.is_idle() {
//!     driver.advance_frame();
//!     pool.run_until_stalled();
//! }
//! ```

use rune_config::TransitionConfig;
use std::cell::RefCell;
use std::fmt;

use crate::easing::EasingFunction;
use crate::env::TransitionDriver;
use crate::params::AnimationOptions;
use crate::surface::Surface;
use crate::types::TransitionId;
use crate::value::{StyleMap, StyleValue};

/// One `animate_style` call handed to a driver.
///
/// Property names in `targets` and `changed` are already resolved to engine
/// names, and each changed property has been pinned on `surface` to its
/// computed starting value.
pub struct DriveRequest {
    pub transition: TransitionId,
    pub surface: Surface,
    pub targets: StyleMap,
    pub options: AnimationOptions,
    pub changed: Vec<String>,
    pub on_done: Box<dyn FnOnce()>,
}

impl fmt::Debug for DriveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveRequest")
            .field("transition", &self.transition)
            .field("targets", &self.targets)
            .field("options", &self.options)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}

struct Track {
    property: String,
    from: StyleValue,
    to: StyleValue,
}

struct RunningAnimation {
    transition: TransitionId,
    surface: Surface,
    tracks: Vec<Track>,
    duration_ms: f64,
    delay_ms: f64,
    elapsed_ms: f64,
    easing: EasingFunction,
    on_done: Option<Box<dyn FnOnce()>>,
}

impl RunningAnimation {
    /// Advance by `delta_ms`. Returns true once the animation has finished.
    fn advance(&mut self, delta_ms: f64) -> bool {
        self.elapsed_ms += delta_ms;
        let active = self.elapsed_ms - self.delay_ms;
        if active < 0.0 {
            return false;
        }

        let progress = if self.duration_ms > 0.0 {
            (active / self.duration_ms).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        let eased = if progress >= 1.0 {
            1.0
        } else {
            self.easing.evaluate(progress)
        };

        for track in &self.tracks {
            self.surface
                .set(track.property.clone(), track.from.interpolate(&track.to, eased));
        }
        progress >= 1.0
    }
}

/// Default frame length in milliseconds (about 60 frames per second).
pub const DEFAULT_FRAME_MS: f64 = 16.0;

/// Driver advanced by explicit frame ticks.
pub struct FrameDriver {
    running: RefCell<Vec<RunningAnimation>>,
    frame_ms: f64,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::with_frame_ms(DEFAULT_FRAME_MS)
    }

    /// Driver ticking `frame_ms` per frame. A length that is not finite and
    /// positive would never finish an animation, so it falls back to
    /// [`DEFAULT_FRAME_MS`].
    pub fn with_frame_ms(frame_ms: f64) -> Self {
        let frame_ms = if frame_ms.is_finite() && frame_ms > 0.0 {
            frame_ms
        } else {
            tracing::warn!(frame_ms, "unusable frame length, using default");
            DEFAULT_FRAME_MS
        };
        Self {
            running: RefCell::new(Vec::new()),
            frame_ms,
        }
    }

    pub fn from_config(config: &TransitionConfig) -> Self {
        Self::with_frame_ms(config.driver.frame_ms)
    }

    pub fn frame_ms(&self) -> f64 {
        self.frame_ms
    }

    /// Advance by one frame of the configured length.
    pub fn advance_frame(&self) {
        self.tick(self.frame_ms);
    }

    /// Advance every running animation by `delta_ms`.
    ///
    /// Completion callbacks run after the driver has released its internal
    /// state, so they may start new animations.
    pub fn tick(&self, delta_ms: f64) {
        let finished: Vec<Box<dyn FnOnce()>> = {
            let mut running = self.running.borrow_mut();
            let mut done = Vec::new();
            running.retain_mut(|animation| {
                if !animation.advance(delta_ms) {
                    return true;
                }
                tracing::debug!(transition = %animation.transition, "driver finished animation");
                done.extend(animation.on_done.take());
                false
            });
            done
        };

        for on_done in finished {
            on_done();
        }
    }

    /// Number of animations still running.
    pub fn len(&self) -> usize {
        self.running.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.running.borrow().is_empty()
    }
}

impl fmt::Debug for FrameDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDriver")
            .field("running", &self.len())
            .field("frame_ms", &self.frame_ms)
            .finish()
    }
}

impl TransitionDriver for FrameDriver {
    fn drive(&self, request: DriveRequest) {
        let easing = match request.options.easing.as_deref() {
            None => EasingFunction::Linear,
            Some(name) => EasingFunction::parse(name).unwrap_or_else(|| {
                tracing::warn!(easing = %name, "unknown easing, falling back to linear");
                EasingFunction::Linear
            }),
        };

        let tracks = request
            .changed
            .iter()
            .filter_map(|property| {
                let to = request.targets.get(property)?.clone();
                let from = request.surface.get(property).unwrap_or_else(|| to.clone());
                Some(Track {
                    property: property.clone(),
                    from,
                    to,
                })
            })
            .collect();

        tracing::debug!(
            transition = %request.transition,
            properties = ?request.changed,
            duration_ms = request.options.duration_ms(),
            "driver started animation"
        );

        self.running.borrow_mut().push(RunningAnimation {
            transition: request.transition,
            surface: request.surface,
            tracks,
            duration_ms: request.options.duration_ms(),
            delay_ms: request.options.delay_ms(),
            elapsed_ms: 0.0,
            easing,
            on_done: Some(request.on_done),
        });
    }
}
