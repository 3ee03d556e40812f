//! Class-name composition for the panel, launcher, and bubbles

use super::{ChatPosition, ChatSize};
use crate::panel::PanelVisibility;
use crate::state_machine::Sender;

const PANEL_BASE: &str = "flex flex-col bg-background border sm:rounded-lg shadow-md overflow-hidden transition-all duration-250 ease-out sm:absolute sm:w-[90vw] sm:h-[80vh] fixed inset-0 w-full h-full sm:inset-auto";
const LAUNCHER_BASE: &str = "w-14 h-14 rounded-full shadow-md flex items-center justify-center hover:shadow-lg hover:shadow-black/30 transition-all duration-300";
const BUBBLE_BASE: &str = "flex items-end gap-3 mb-6 animate-[slideIn_300ms_ease-in-out]";
const BUBBLE_MESSAGE_BASE: &str =
    "relative max-w-[70%] px-5 py-4 text-right leading-relaxed transition-all duration-200 hover:shadow-lg";

/// Join the non-empty class fragments with single spaces
pub fn cn(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

impl ChatSize {
    pub fn dimension_classes(self) -> &'static str {
        match self {
            ChatSize::Sm => "sm:max-w-sm sm:max-h-[500px]",
            ChatSize::Md => "sm:max-w-md sm:max-h-[600px]",
            ChatSize::Lg => "sm:max-w-lg sm:max-h-[700px]",
            ChatSize::Xl => "sm:max-w-xl sm:max-h-[800px]",
            ChatSize::Full => "sm:w-full sm:h-full",
        }
    }
}

impl ChatPosition {
    /// Anchor of the fixed container holding launcher and panel
    pub fn container_classes(self) -> &'static str {
        match self {
            ChatPosition::BottomRight => "bottom-5 right-5",
            ChatPosition::BottomLeft => "bottom-5 left-5",
        }
    }

    /// Offset of the panel relative to the launcher
    pub fn panel_classes(self) -> &'static str {
        match self {
            ChatPosition::BottomRight => "sm:bottom-[calc(100%+10px)] sm:right-0",
            ChatPosition::BottomLeft => "sm:bottom-[calc(100%+10px)] sm:left-0",
        }
    }
}

pub fn visibility_classes(visibility: PanelVisibility) -> &'static str {
    match visibility {
        PanelVisibility::Open => "pointer-events-auto opacity-100 visible scale-100 translate-y-0",
        PanelVisibility::Closed => {
            "pointer-events-none opacity-0 invisible scale-100 sm:translate-y-5"
        }
    }
}

pub fn container_class(position: ChatPosition) -> String {
    cn(&["fixed", position.container_classes(), "z-50"])
}

pub fn panel_class(
    position: ChatPosition,
    size: ChatSize,
    visibility: PanelVisibility,
) -> String {
    cn(&[
        PANEL_BASE,
        position.panel_classes(),
        size.dimension_classes(),
        visibility_classes(visibility),
    ])
}

pub fn launcher_class() -> String {
    cn(&[LAUNCHER_BASE])
}

// In RTL layout sent bubbles sit on the left, received on the right
pub fn bubble_class(sender: Sender) -> String {
    let variant = match sender {
        Sender::User => "flex-row-reverse justify-start",
        Sender::Agent => "justify-end",
    };
    cn(&[BUBBLE_BASE, variant])
}

pub fn bubble_message_class(sender: Sender) -> String {
    let variant = match sender {
        Sender::User => "bg-black text-white rounded-2xl rounded-bl-sm shadow-[0px_2px_8px_rgba(0,0,0,0.2)]",
        Sender::Agent => "bg-gray-50 text-gray-800 rounded-2xl rounded-br-sm shadow-[0px_2px_6px_rgba(0,0,0,0.1)]",
    };
    cn(&[BUBBLE_MESSAGE_BASE, variant])
}
