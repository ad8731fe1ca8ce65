//! Lightbox navigation state.
//!
//! The open index always points into the canonical album, so navigation walks
//! the full album regardless of the grid filter.

use iced::keyboard::key::Named;

/// Something the user asked the open lightbox to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxAction {
    Close,
    Prev,
    Next,
}

/// Which navigation buttons are clickable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lightbox {
    open_index: Option<usize>,
}

impl Lightbox {
    pub fn current(&self) -> Option<usize> {
        self.open_index
    }

    pub fn is_open(&self) -> bool {
        self.open_index.is_some()
    }

    /// Open at `index`. Refuses indices outside an album of `len` records.
    pub fn open(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.open_index = Some(index);
        true
    }

    /// Close the lightbox, returning the index that was open
    pub fn close(&mut self) -> Option<usize> {
        self.open_index.take()
    }

    /// Step back. Returns false (and changes nothing) at the first record.
    pub fn prev(&mut self) -> bool {
        match self.open_index {
            Some(index) if index > 0 => {
                self.open_index = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    /// Step forward. Returns false (and changes nothing) at the last record.
    pub fn next(&mut self, len: usize) -> bool {
        match self.open_index {
            Some(index) if index + 1 < len => {
                self.open_index = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn controls(&self, len: usize) -> NavControls {
        match self.open_index {
            Some(index) => NavControls {
                prev_enabled: index > 0,
                next_enabled: index + 1 < len,
            },
            None => NavControls::default(),
        }
    }

    /// Key bindings, active only while the lightbox is open
    pub fn action_for_key(&self, key: Named) -> Option<LightboxAction> {
        if !self.is_open() {
            return None;
        }

        match key {
            Named::Escape => Some(LightboxAction::Close),
            Named::ArrowLeft => Some(LightboxAction::Prev),
            Named::ArrowRight => Some(LightboxAction::Next),
            _ => None,
        }
    }

    /// Apply an action. Returns true if the open index changed.
    pub fn apply(&mut self, action: LightboxAction, len: usize) -> bool {
        match action {
            LightboxAction::Close => self.close().is_some(),
            LightboxAction::Prev => self.prev(),
            LightboxAction::Next => self.next(len),
        }
    }
}
