use super::commit::commit;
use super::overlay::{Overlay, Selection, SELECTED_CLASS};
use super::surface::EditSurface;

/// Ephemeral state for the one element currently being edited.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum EditSession<N> {
    Idle,
    Selected(Selection<N>),
}

impl<N> Default for EditSession<N> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<N: Clone + PartialEq> EditSession<N> {
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }

    pub fn selection(&self) -> Option<&Selection<N>> {
        match self {
            Self::Idle => None,
            Self::Selected(sel) => Some(sel),
        }
    }

    /// Replaces any previous selection; working copies start from the element.
    pub fn select(&mut self, selection: Selection<N>) {
        *self = Self::Selected(selection);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Self::Selected(sel) = self {
            sel.text = text.into();
        }
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        if let Self::Selected(sel) = self {
            sel.style = Some(style.into());
        }
    }

    /// Drops the working copies and the highlight. Content is untouched.
    pub fn cancel<S: EditSurface<Node = N>>(&mut self, surface: &mut S) {
        if let Self::Selected(sel) = std::mem::take(self) {
            surface.remove_class(&sel.node, SELECTED_CLASS);
        }
    }

    /// Forced return to Idle after the document was replaced. Nothing is
    /// written through the stale reference.
    pub fn reset(&mut self) {
        if self.is_selected() {
            log::debug!("edit session reset");
        }
        *self = Self::Idle;
    }

    /// Commits the working copies and returns the new canonical markup.
    /// Always ends Idle; `None` when there was nothing valid to save.
    pub fn save<S: EditSurface<Node = N>>(
        &mut self,
        surface: &mut S,
        overlay: &mut Overlay,
    ) -> Option<String> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Selected(sel) => commit(surface, overlay, &sel),
        }
    }
}
