/// Page position and zoom of the open document.
///
/// While a document is open `current_page < page_count`; with no document
/// every field is at its reset value and `page_count` is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub current_page: u32,
    pub zoom_level: f32,
    pub page_count: u32,
}

impl ViewState {
    /// State of a freshly opened document.
    pub fn opened(page_count: u32, zoom_level: f32) -> Self {
        Self { current_page: 0, zoom_level, page_count }
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page + 1 < self.page_count
    }

    /// Moves one page forward. Returns false on the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Moves one page back. Returns false on the first page.
    pub fn prev_page(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    /// Adds `delta` to the zoom level, clamped to `[min, max]`. Returns
    /// whether the level changed.
    pub fn zoom_by(&mut self, delta: f32, min: f32, max: f32) -> bool {
        let zoom = (self.zoom_level + delta).clamp(min, max);
        let changed = zoom != self.zoom_level;
        self.zoom_level = zoom;
        changed
    }

    /// Zoom as a whole percentage, rounded down.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom_level * 100.0).floor() as u32
    }

    /// One-based page indicator, e.g. `"Page 1 / 3"`.
    pub fn page_label(&self) -> String {
        format!("Page {} / {}", self.current_page + 1, self.page_count)
    }

    pub fn zoom_label(&self) -> String {
        format!("{}%", self.zoom_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_is_bounded() {
        let mut state = ViewState::opened(3, 1.0);

        assert!(!state.can_go_prev());
        assert!(!state.prev_page());
        assert!(state.next_page());
        assert!(state.next_page());
        assert!(!state.next_page());
        assert_eq!(state.current_page, 2);
        assert!(!state.can_go_next());
        assert_eq!(state.page_label(), "Page 3 / 3");
    }

    #[test]
    fn zoom_clamps_to_limits() {
        let mut state = ViewState::opened(1, 1.0);

        for _ in 0..10 {
            state.zoom_by(0.25, 0.5, 3.0);
        }
        assert_eq!(state.zoom_level, 3.0);
        assert!(!state.zoom_by(0.25, 0.5, 3.0));

        for _ in 0..20 {
            state.zoom_by(-0.25, 0.5, 3.0);
        }
        assert_eq!(state.zoom_level, 0.5);
        assert_eq!(state.zoom_label(), "50%");
    }

    #[test]
    fn single_page_document_disables_both_directions() {
        let state = ViewState::opened(1, 1.0);

        assert!(!state.can_go_prev());
        assert!(!state.can_go_next());
        assert_eq!(state.page_label(), "Page 1 / 1");
        assert_eq!(state.zoom_label(), "100%");
    }
}
