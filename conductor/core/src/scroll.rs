//! Follow Scroll
//!
//! Keeps a growing chat transcript in view. While text is being typed the
//! offset eases towards the bottom of the content each frame; once typing is
//! done the user may scroll freely within `[0, max]`.
//!
//! Offsets are measured from the top of the content, in surface units (rows
//! for the terminal).

/// Fraction of the remaining distance covered per frame while following
pub const FOLLOW_FACTOR: f32 = 0.18;

/// Offsets closer than this to the target snap onto it
const SNAP_EPSILON: f32 = 0.01;

/// Scroll state of the chat panel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowScroll {
    offset: f32,
    content: f32,
    viewport: f32,
    following: bool,
}

impl FollowScroll {
    /// Create a scroll for a viewport of `viewport` units, following
    #[must_use]
    pub fn new(viewport: f32) -> Self {
        Self {
            offset: 0.0,
            content: 0.0,
            viewport: viewport.max(0.0),
            following: true,
        }
    }

    /// Largest valid offset: overflow below the viewport
    #[must_use]
    pub fn max(&self) -> f32 {
        (self.content - self.viewport).max(0.0)
    }

    /// Current offset
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether the offset is tracking the bottom
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.following
    }

    /// Start or stop following; typing sessions toggle this
    pub fn set_following(&mut self, following: bool) {
        self.following = following;
        self.clamp();
    }

    /// Report the current content height
    pub fn set_content(&mut self, height: f32) {
        self.content = height.max(0.0);
        if !self.following {
            self.clamp();
        }
    }

    /// Report a new viewport height; `max` is recomputed
    pub fn resize(&mut self, viewport: f32) {
        self.viewport = viewport.max(0.0);
        self.clamp();
    }

    /// Advance one frame and return the offset
    pub fn update(&mut self) -> f32 {
        if self.following {
            let target = self.max();
            self.offset += (target - self.offset) * FOLLOW_FACTOR;
            if (target - self.offset).abs() < SNAP_EPSILON {
                self.offset = target;
            }
        }
        self.offset
    }

    /// Apply a manual scroll delta (positive = down)
    ///
    /// Ignored while following.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        if !self.following {
            self.offset = (self.offset + delta).clamp(0.0, self.max());
        }
        self.offset
    }

    fn clamp(&mut self) {
        self.offset = self.offset.clamp(0.0, self.max());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_eases_towards_bottom() {
        let mut scroll = FollowScroll::new(10.0);
        scroll.set_content(20.0);
        let first = scroll.update();
        assert!((first - 1.8).abs() < 1e-5);
        for _ in 0..200 {
            scroll.update();
        }
        assert_eq!(scroll.offset(), 10.0);
    }

    #[test]
    fn test_no_overflow_stays_at_top() {
        let mut scroll = FollowScroll::new(10.0);
        scroll.set_content(4.0);
        assert_eq!(scroll.update(), 0.0);
        assert_eq!(scroll.max(), 0.0);
    }

    #[test]
    fn test_manual_scroll_ignored_while_following() {
        let mut scroll = FollowScroll::new(10.0);
        scroll.set_content(30.0);
        assert_eq!(scroll.scroll_by(5.0), 0.0);
    }

    #[test]
    fn test_manual_scroll_clamped_after_typing() {
        let mut scroll = FollowScroll::new(10.0);
        scroll.set_content(30.0);
        scroll.set_following(false);
        assert_eq!(scroll.scroll_by(50.0), 20.0);
        assert_eq!(scroll.scroll_by(-100.0), 0.0);
        assert_eq!(scroll.scroll_by(3.0), 3.0);
    }

    #[test]
    fn test_resize_recomputes_max() {
        let mut scroll = FollowScroll::new(10.0);
        scroll.set_content(30.0);
        scroll.set_following(false);
        scroll.scroll_by(20.0);
        scroll.resize(25.0);
        assert_eq!(scroll.max(), 5.0);
        assert_eq!(scroll.offset(), 5.0);
    }
}
