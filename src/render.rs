//! Server-side rendering of the chat widget
//!
//! Pure functions from a widget snapshot to HTML. Styling is carried by
//! utility class names composed per state.

mod classes;
mod markup;

pub use markup::render_page;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Corner the launcher is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatPosition {
    #[default]
    BottomRight,
    BottomLeft,
}

/// Panel dimensions on wide screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
    Full,
}

/// Placement and size of one widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Appearance {
    pub position: ChatPosition,
    pub size: ChatSize,
}

impl fmt::Display for ChatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChatPosition::BottomRight => "bottom-right",
            ChatPosition::BottomLeft => "bottom-left",
        })
    }
}

impl FromStr for ChatPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom-right" => Ok(ChatPosition::BottomRight),
            "bottom-left" => Ok(ChatPosition::BottomLeft),
            other => Err(format!(
                "unknown position '{other}' (expected bottom-right or bottom-left)"
            )),
        }
    }
}

impl FromStr for ChatSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sm" => Ok(ChatSize::Sm),
            "md" => Ok(ChatSize::Md),
            "lg" => Ok(ChatSize::Lg),
            "xl" => Ok(ChatSize::Xl),
            "full" => Ok(ChatSize::Full),
            other => Err(format!("unknown size '{other}' (expected sm, md, lg, xl or full)")),
        }
    }
}
