//! Accordion open/closed state.
//!
//! Drives both the page-level Show/Hide buttons and the FAQ item.  Purely
//! in-memory; nothing is persisted between runs.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accordion {
    is_open: bool,
}

impl Accordion {
    /// A closed accordion.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Flip between open and closed.
    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    /// Button text for the action a [`toggle`](Self::toggle) would perform.
    pub fn label<'a>(&self, show: &'a str, hide: &'a str) -> &'a str {
        if self.is_open {
            hide
        } else {
            show
        }
    }
}
