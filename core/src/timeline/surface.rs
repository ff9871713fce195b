//! Drawing surface the timeline renders into.

use super::render::DrawCommand;

/// Host-side collaborator for the timeline: receives draw commands and owns
/// the document-level pointer listeners used while a drag is in progress.
pub trait TimelineSurface {
    /// Replace the current frame.
    fn draw(&mut self, commands: &[DrawCommand]);
    fn install_drag_listeners(&mut self);
    fn remove_drag_listeners(&mut self);
}

/// Surface that records every frame and listener change. Used by the shell and
/// in tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub frames: Vec<Vec<DrawCommand>>,
    pub installs: usize,
    pub removals: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Listeners installed and not yet removed.
    pub fn active_listeners(&self) -> usize {
        self.installs.saturating_sub(self.removals)
    }
}

impl TimelineSurface for RecordingSurface {
    fn draw(&mut self, commands: &[DrawCommand]) {
        self.frames.push(commands.to_vec());
    }

    fn install_drag_listeners(&mut self) {
        self.installs += 1;
    }

    fn remove_drag_listeners(&mut self) {
        self.removals += 1;
    }
}
