//! Selection state shared across views.

/// Tracks the clip currently selected in the timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selected_clip_id: Option<String>,
}

impl SelectionState {
    /// Replace the selection with a single clip, or clear it with `None`.
    pub fn select_clip(&mut self, clip_id: Option<String>) {
        self.selected_clip_id = clip_id;
    }

    /// Drop a clip from the selection, if it is the selected one.
    /// Returns true if the selection changed.
    pub fn remove_clip(&mut self, clip_id: &str) -> bool {
        if self.selected_clip_id.as_deref() == Some(clip_id) {
            self.selected_clip_id = None;
            true
        } else {
            false
        }
    }

    /// Return the primary selected clip, if any.
    pub fn primary_clip(&self) -> Option<&str> {
        self.selected_clip_id.as_deref()
    }
}
