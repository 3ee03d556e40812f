//! Expandable panel visibility
//!
//! Two states, one transition: `toggle` flips between the collapsed launcher
//! and the expanded panel. Resets to closed whenever a widget is created.

use serde::Serialize;

/// Visibility of the chat panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelVisibility {
    #[default]
    Closed,
    Open,
}

impl PanelVisibility {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            PanelVisibility::Closed => PanelVisibility::Open,
            PanelVisibility::Open => PanelVisibility::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == PanelVisibility::Open
    }
}

/// Owns the open/closed state of one panel instance
#[derive(Debug, Default)]
pub struct PanelController {
    visibility: PanelVisibility,
}

impl PanelController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip visibility and return the new value
    pub fn toggle(&mut self) -> PanelVisibility {
        self.visibility = self.visibility.toggled();
        tracing::debug!(visibility = ?self.visibility, "Panel toggled");
        self.visibility
    }

    pub fn visibility(&self) -> PanelVisibility {
        self.visibility
    }

    #[allow(dead_code)] // API completeness
    pub fn is_open(&self) -> bool {
        self.visibility.is_open()
    }
}
