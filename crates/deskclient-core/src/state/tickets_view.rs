use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Kanban,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::List => write!(f, "list"),
            ViewMode::Kanban => write!(f, "kanban"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(ViewMode::List),
            "kanban" => Ok(ViewMode::Kanban),
            other => Err(format!("unknown view mode '{}', expected list or kanban", other)),
        }
    }
}

/// Layout and selection mode of the tickets screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TicketsView {
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub bulk_mode: bool,
}

impl TicketsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_bulk_mode(&mut self) {
        self.bulk_mode = !self.bulk_mode;
    }

    pub fn disable_bulk_mode(&mut self) {
        self.bulk_mode = false;
    }
}
