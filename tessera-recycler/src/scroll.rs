//! Scroll offset ownership and per-frame motion.
//!
//! [`ScrollController`] keeps two offsets along the scroll axis: the
//! `position` that is rendered this frame and the `target` requested by input
//! or by the host. Every [`ScrollController::tick`] moves the position toward
//! the target according to the configured [`MovementPolicy`].
use derive_setters::Setters;

/// Remaining distance, in pixels, under which an eased scroll snaps onto its
/// target.
pub const SCROLL_SNAP_EPSILON: f32 = 0.1;

/// How the rendered offset follows the target offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementPolicy {
    /// The target is applied as soon as it is set.
    Direct,
    /// The offset travels toward the target and arrives in roughly
    /// `ease_duration` seconds, however often the target changes.
    #[default]
    Eased,
}

/// Host-provided scroll behavior.
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollSettings {
    /// Movement policy.
    pub movement: MovementPolicy,
    /// Quantize requested offsets to whole rows.
    pub step_scrolling: bool,
    /// Pixels scrolled per unit of wheel delta.
    pub sensitivity: f32,
    /// Seconds an eased scroll takes to cover the remaining distance.
    pub ease_duration: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            movement: MovementPolicy::Eased,
            step_scrolling: false,
            sensitivity: 1.0,
            ease_duration: 0.1,
        }
    }
}

/// Scroll input resolved by the host for one frame.
///
/// Positive values move toward the end of the content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollInput {
    /// Wheel delta, scaled by [`ScrollSettings::sensitivity`].
    pub wheel: f32,
    /// Drag delta in pixels.
    pub drag: f32,
}

impl ScrollInput {
    /// Wheel-only input.
    pub fn wheel(delta: f32) -> Self {
        Self {
            wheel: delta,
            drag: 0.0,
        }
    }

    /// Drag-only input.
    pub fn drag(delta: f32) -> Self {
        Self {
            wheel: 0.0,
            drag: delta,
        }
    }

    /// Whether the input carries no movement.
    pub fn is_idle(&self) -> bool {
        self.wheel == 0.0 && self.drag == 0.0
    }
}

/// Owner of the scroll offset of a single vertical scroll view.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollController {
    position: f32,
    target: f32,
    max_extent: f32,
    step: f32,
    settings: ScrollSettings,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(ScrollSettings::default())
    }
}

impl ScrollController {
    /// Creates a controller at offset zero with nothing to scroll.
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            position: 0.0,
            target: 0.0,
            max_extent: 0.0,
            step: 0.0,
            settings,
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &ScrollSettings {
        &self.settings
    }

    /// Replaces the settings. Switching to [`MovementPolicy::Direct`] lands
    /// any pending eased scroll immediately.
    pub fn set_settings(&mut self, settings: ScrollSettings) {
        self.settings = settings;
        if self.settings.movement == MovementPolicy::Direct {
            self.position = self.target;
        }
    }

    /// Rendered offset in pixels.
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Requested offset in pixels.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Largest valid offset.
    pub fn max_extent(&self) -> f32 {
        self.max_extent
    }

    /// Row height used to quantize stepped scrolling.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Scrolling is allowed only when the content overflows the viewport.
    pub fn is_scrolling_allowed(&self) -> bool {
        self.max_extent > 0.0
    }

    /// Rendered offset as a fraction of the scroll range.
    pub fn normalized_position(&self) -> f32 {
        self.normalize(self.position)
    }

    /// Requested offset as a fraction of the scroll range.
    pub fn normalized_target(&self) -> f32 {
        self.normalize(self.target)
    }

    /// Updates the scroll range and clamps both offsets into it.
    pub fn set_max_extent(&mut self, max_extent: f32) {
        self.max_extent = if max_extent.is_finite() {
            max_extent.max(0.0)
        } else {
            0.0
        };
        self.position = self.clamp(self.position);
        self.target = self.clamp(self.target);
    }

    /// Sets the row height used by stepped scrolling.
    pub fn set_step(&mut self, step: f32) {
        self.step = if step.is_finite() { step.max(0.0) } else { 0.0 };
    }

    /// Requests a normalized offset in `[0, 1]`.
    ///
    /// With stepped scrolling, values other than exactly `0.0` and `1.0` are
    /// snapped to the nearest row. Returns `false` when scrolling is not
    /// allowed and nothing changed.
    pub fn set_normalized_target(&mut self, value: f32, immediate: bool) -> bool {
        if !self.is_scrolling_allowed() || !value.is_finite() {
            return false;
        }
        let value = value.clamp(0.0, 1.0);
        let offset = value * self.max_extent;
        let offset = if value > 0.0 && value < 1.0 {
            self.quantize(offset)
        } else {
            offset
        };
        self.apply_target(offset, immediate);
        true
    }

    /// Requests an absolute offset in pixels. Quantized like any other
    /// request when stepped scrolling is on.
    pub fn set_target_offset(&mut self, offset: f32, immediate: bool) -> bool {
        if !self.is_scrolling_allowed() || !offset.is_finite() {
            return false;
        }
        let offset = self.quantize(offset);
        self.apply_target(offset, immediate);
        true
    }

    /// Moves the target by `delta` pixels.
    ///
    /// With stepped scrolling, any non-zero delta moves by at least one row.
    pub fn scroll_by(&mut self, delta: f32) -> bool {
        if self.settings.step_scrolling && self.step > 0.0 && delta != 0.0 {
            let rows = (delta / self.step).round();
            let rows = if rows == 0.0 { delta.signum() } else { rows };
            let offset = self.quantize(self.target) + rows * self.step;
            return self.set_target_offset(offset, false);
        }
        self.set_target_offset(self.target + delta, false)
    }

    /// Applies one frame of host input to the target.
    pub fn apply_input(&mut self, input: ScrollInput) -> bool {
        if input.is_idle() {
            return false;
        }
        self.scroll_by(input.wheel * self.settings.sensitivity + input.drag)
    }

    /// Advances the rendered offset by `delta_time` seconds. Returns whether
    /// it moved.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let before = self.position;
        match self.settings.movement {
            MovementPolicy::Direct => self.position = self.target,
            MovementPolicy::Eased => self.ease(delta_time),
        }
        self.position = self.clamp(self.position);
        self.position != before
    }

    /// Whether the rendered offset has not yet reached the target.
    pub fn is_animating(&self) -> bool {
        self.position != self.target
    }

    fn ease(&mut self, delta_time: f32) {
        let distance = self.target - self.position;
        if distance.abs() < SCROLL_SNAP_EPSILON {
            self.position = self.target;
            return;
        }
        if delta_time.is_nan() || delta_time <= 0.0 {
            return;
        }
        let duration = self.settings.ease_duration;
        if duration.is_nan() || duration <= 0.0 {
            self.position = self.target;
            return;
        }

        let speed = distance.abs() / duration;
        let travel = speed * delta_time;
        if travel >= distance.abs() {
            self.position = self.target;
        } else {
            self.position += travel.copysign(distance);
        }
        if (self.target - self.position).abs() < SCROLL_SNAP_EPSILON {
            self.position = self.target;
        }
    }

    fn apply_target(&mut self, offset: f32, immediate: bool) {
        self.target = self.clamp(offset);
        if immediate || self.settings.movement == MovementPolicy::Direct {
            self.position = self.target;
        }
    }

    fn quantize(&self, offset: f32) -> f32 {
        if !self.settings.step_scrolling || self.step <= 0.0 {
            return offset;
        }
        (offset / self.step).round() * self.step
    }

    fn clamp(&self, offset: f32) -> f32 {
        if offset.is_finite() {
            offset.clamp(0.0, self.max_extent)
        } else {
            0.0
        }
    }

    fn normalize(&self, offset: f32) -> f32 {
        if self.is_scrolling_allowed() {
            (offset / self.max_extent).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
