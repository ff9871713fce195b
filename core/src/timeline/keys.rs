//! Keyboard bindings for the brush.

use phf::phf_map;

/// Keyboard gestures understood by the brush controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushKey {
    /// Translate the interval back in time
    Left,
    /// Translate the interval forward in time
    Right,
    /// Grow the interval from its right edge
    Grow,
    /// Shrink the interval from its right edge
    Shrink,
    /// Clear the interval and reset to the full extent
    Reset,
}

static KEY_BINDINGS: phf::Map<&'static str, BrushKey> = phf_map! {
    "ArrowLeft" => BrushKey::Left,
    "ArrowRight" => BrushKey::Right,
    "ArrowUp" => BrushKey::Grow,
    "ArrowDown" => BrushKey::Shrink,
    "Escape" => BrushKey::Reset,
    "Esc" => BrushKey::Reset,
};

impl BrushKey {
    /// Resolve a DOM `KeyboardEvent.key` name.
    pub fn from_key_name(name: &str) -> Option<Self> {
        KEY_BINDINGS.get(name).copied()
    }

    /// Every bound key name, sorted.
    pub fn key_names() -> impl Iterator<Item = &'static str> {
        let mut names: Vec<&'static str> = KEY_BINDINGS.keys().copied().collect();
        names.sort_unstable();
        names.into_iter()
    }
}
