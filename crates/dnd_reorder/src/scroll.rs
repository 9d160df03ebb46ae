use gpui::Axis;

use crate::item::VisibleWindow;

/// Sign applied to auto-scroll velocity before it reaches the native scroll position.
///
/// Velocity is positive when the item overshoots the bottom (or right) edge on screen.
/// A reversed list grows the other way, and right-to-left reading flips a horizontal
/// list once more.
pub fn scroll_direction(reverse_layout: bool, orientation: Axis, rtl: bool) -> f32 {
    let mut forward = !reverse_layout;
    if rtl && orientation == Axis::Horizontal {
        forward = !forward;
    }
    if forward { 1. } else { -1. }
}

/// Converts a native scroll offset (content moves towards negative values) into a
/// forward scroll position. Mirrored lists start scrolled to the far end.
pub fn native_to_position(native: f32, max_position: f32, mirrored: bool) -> f32 {
    if mirrored {
        max_position + native
    } else {
        -native
    }
}

pub fn position_to_native(position: f32, max_position: f32, mirrored: bool) -> f32 {
    if mirrored {
        position - max_position
    } else {
        -position
    }
}

/// Scroll position of a list along its main axis, plus change tracking of the visible
/// item window.
#[derive(Clone, Debug, Default)]
pub struct ScrollDriver {
    position: f32,
    max_position: f32,
    last_window: Option<VisibleWindow>,
}

impl ScrollDriver {
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn max_position(&self) -> f32 {
        self.max_position
    }

    /// Updates the scrollable range after content or viewport size changed.
    pub fn set_extent(&mut self, content: f32, viewport: f32) {
        self.max_position = (content - viewport).max(0.);
        self.position = self.position.clamp(0., self.max_position);
    }

    /// Takes over a position set by someone else, e.g. a wheel scroll.
    pub fn sync_position(&mut self, position: f32) {
        self.position = position.clamp(0., self.max_position);
    }

    /// Scrolls by `amount` and returns how much was actually applied.
    pub fn scroll_by(&mut self, amount: f32) -> f32 {
        let before = self.position;
        self.position = (self.position + amount).clamp(0., self.max_position);
        self.position - before
    }

    /// Records `window` and reports whether it differs from the previous one, either in
    /// its first index or in its item count.
    pub fn observe(&mut self, window: VisibleWindow) -> bool {
        let changed = self.last_window.is_some_and(|last| last != window);
        self.last_window = Some(window);
        changed
    }

    pub fn reset_observation(&mut self) {
        self.last_window = None;
    }
}
