//! Scrollbar handle geometry derived from the scroll offset.
//!
//! The scrollbar owns no scroll state. [`ScrollbarSync`] maps the normalized
//! offset and the viewport/content ratio onto a handle, and only reports a
//! new [`ScrollbarState`] when it differs from the last one pushed.

/// Smallest handle size, as a fraction of the track, used by default.
pub const DEFAULT_MIN_HANDLE_SIZE: f32 = 0.05;

/// Handle geometry expressed as fractions of the track length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarState {
    /// Handle length in `[min_handle_size, 1]`.
    pub handle_size: f32,
    /// Normalized scroll position in `[0, 1]` the handle represents.
    pub value: f32,
}

impl ScrollbarState {
    /// The "nothing to scroll" state: a full-length handle at the start.
    pub const FULL: Self = Self {
        handle_size: 1.0,
        value: 0.0,
    };

    /// Computes the handle for a scroll view.
    ///
    /// `viewport_extent` and `max_extent` are in pixels along the scroll
    /// axis. When `max_extent` is not positive the handle fills the track.
    pub fn compute(
        normalized: f32,
        viewport_extent: f32,
        max_extent: f32,
        min_handle_size: f32,
    ) -> Self {
        if !(max_extent > 0.0 && viewport_extent > 0.0) {
            return Self::FULL;
        }
        let min = min_handle_size.clamp(0.0, 1.0);
        let ratio = viewport_extent / (max_extent + viewport_extent);
        Self {
            handle_size: ratio.clamp(min, 1.0),
            value: if normalized.is_finite() {
                normalized.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    /// Start of the handle along the track, as a fraction of the track.
    pub fn handle_offset(&self) -> f32 {
        (1.0 - self.handle_size) * self.value
    }

    /// Handle start and length in pixels for a track of `track_length`.
    pub fn handle_span(&self, track_length: f32) -> (f32, f32) {
        (
            self.handle_offset() * track_length,
            self.handle_size * track_length,
        )
    }

    /// Normalized scroll position that puts the handle start at
    /// `handle_offset` (a fraction of the track). Used to drive scrolling from
    /// a dragged handle.
    pub fn normalized_for_handle(&self, handle_offset: f32) -> f32 {
        let travel = 1.0 - self.handle_size;
        if travel <= 0.0 || !handle_offset.is_finite() {
            return 0.0;
        }
        (handle_offset / travel).clamp(0.0, 1.0)
    }
}

/// Pushes scrollbar updates only when the handle changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollbarSync {
    min_handle_size: f32,
    last: Option<ScrollbarState>,
}

impl Default for ScrollbarSync {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HANDLE_SIZE)
    }
}

impl ScrollbarSync {
    /// Creates a sync with the given minimum handle size.
    pub fn new(min_handle_size: f32) -> Self {
        Self {
            min_handle_size,
            last: None,
        }
    }

    /// Minimum handle size, as a fraction of the track.
    pub fn min_handle_size(&self) -> f32 {
        self.min_handle_size
    }

    /// Last state pushed to the host.
    pub fn last(&self) -> Option<ScrollbarState> {
        self.last
    }

    /// Recomputes the handle and returns it if it changed.
    pub fn sync(
        &mut self,
        normalized: f32,
        viewport_extent: f32,
        max_extent: f32,
    ) -> Option<ScrollbarState> {
        let state = ScrollbarState::compute(
            normalized,
            viewport_extent,
            max_extent,
            self.min_handle_size,
        );
        if self.last == Some(state) {
            return None;
        }
        self.last = Some(state);
        Some(state)
    }

    /// Forgets the last pushed state so the next sync always reports.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_size_ratio() {
        let state = ScrollbarState::compute(0.5, 200.0, 600.0, 0.05);
        assert_eq!(state.handle_size, 0.25);
        assert_eq!(state.value, 0.5);
        assert_eq!(state.handle_offset(), 0.375);
        assert_eq!(state.handle_span(400.0), (150.0, 100.0));
    }

    #[test]
    fn test_min_handle_size() {
        let state = ScrollbarState::compute(1.0, 100.0, 99_900.0, 0.05);
        assert_eq!(state.handle_size, 0.05);
        assert_eq!(state.handle_offset(), 0.95);
    }

    #[test]
    fn test_nothing_to_scroll_is_full() {
        assert_eq!(
            ScrollbarState::compute(0.8, 300.0, 0.0, 0.05),
            ScrollbarState::FULL
        );
        assert_eq!(ScrollbarState::FULL.normalized_for_handle(0.3), 0.0);
    }

    #[test]
    fn test_drag_mapping_inverts_offset() {
        let state = ScrollbarState::compute(0.0, 200.0, 600.0, 0.05);
        assert_eq!(state.normalized_for_handle(0.375), 0.5);
        assert_eq!(state.normalized_for_handle(2.0), 1.0);
        assert_eq!(state.normalized_for_handle(-1.0), 0.0);
    }

    #[test]
    fn test_sync_skips_redundant_updates() {
        let mut sync = ScrollbarSync::default();
        assert!(sync.sync(0.0, 100.0, 300.0).is_some());
        assert!(sync.sync(0.0, 100.0, 300.0).is_none());
        assert!(sync.sync(0.1, 100.0, 300.0).is_some());

        sync.invalidate();
        assert!(sync.sync(0.1, 100.0, 300.0).is_some());
        assert_eq!(sync.last().map(|state| state.value), Some(0.1));
    }
}
