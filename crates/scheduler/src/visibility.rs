/// Two independent visibility signals folded into one render gate.
///
/// The viewport signal and the page signal come from unrelated sources and
/// may flip in any order; rendering is allowed only while both are true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityGate {
    in_viewport: bool,
    page_visible: bool,
}

impl VisibilityGate {
    pub fn new(in_viewport: bool, page_visible: bool) -> Self {
        Self {
            in_viewport,
            page_visible,
        }
    }

    pub fn in_viewport(&self) -> bool {
        self.in_viewport
    }

    pub fn page_visible(&self) -> bool {
        self.page_visible
    }

    /// Records the viewport signal. Returns whether the gate flipped.
    pub fn set_in_viewport(&mut self, in_viewport: bool) -> bool {
        let before = self.should_render();
        self.in_viewport = in_viewport;
        before != self.should_render()
    }

    /// Records the page signal. Returns whether the gate flipped.
    pub fn set_page_visible(&mut self, page_visible: bool) -> bool {
        let before = self.should_render();
        self.page_visible = page_visible;
        before != self.should_render()
    }

    pub fn should_render(&self) -> bool {
        self.in_viewport && self.page_visible
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(true, true)
    }
}
