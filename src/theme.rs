use crate::settings;
use log::{debug, warn};
use ratatui::style::Color;
use std::sync::atomic::{AtomicUsize, Ordering};

// Color palette structure
#[derive(Clone, Debug, PartialEq)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_09: Color, // Orange
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
    pub base_0e: Color, // Purple
    pub base_0f: Color, // Brown
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BuiltinTheme {
    OceanicNext,
    CatppuccinMocha,
    Kanagawa,
    KanagawaDragon,
}

impl BuiltinTheme {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinTheme::OceanicNext => "Oceanic Next",
            BuiltinTheme::CatppuccinMocha => "Catppuccin Mocha",
            BuiltinTheme::Kanagawa => "Kanagawa",
            BuiltinTheme::KanagawaDragon => "Kanagawa Dragon",
        }
    }

    fn palette(&self) -> &'static Base16Palette {
        match self {
            BuiltinTheme::OceanicNext => &OCEANIC_NEXT_PALETTE,
            BuiltinTheme::CatppuccinMocha => &CATPPUCCIN_MOCHA_PALETTE,
            BuiltinTheme::Kanagawa => &KANAGAWA_PALETTE,
            BuiltinTheme::KanagawaDragon => &KANAGAWA_DRAGON_PALETTE,
        }
    }

    pub fn all() -> &'static [BuiltinTheme] {
        &[
            BuiltinTheme::OceanicNext,
            BuiltinTheme::CatppuccinMocha,
            BuiltinTheme::Kanagawa,
            BuiltinTheme::KanagawaDragon,
        ]
    }
}

static CURRENT_THEME_INDEX: AtomicUsize = AtomicUsize::new(0);

/// Applies the theme named in the loaded settings.
pub fn apply_saved_theme() {
    let saved_theme = settings::get_theme_name();
    match get_theme_index_by_name(&saved_theme) {
        Some(index) => {
            CURRENT_THEME_INDEX.store(index, Ordering::Relaxed);
            debug!("Applied saved theme: {saved_theme}");
        }
        None => warn!("Saved theme '{saved_theme}' not found, using default"),
    }
}

pub fn get_theme_index_by_name(name: &str) -> Option<usize> {
    BuiltinTheme::all().iter().position(|t| t.name() == name)
}

pub fn current_theme_index() -> usize {
    CURRENT_THEME_INDEX.load(Ordering::Relaxed)
}

pub fn current_theme_name() -> &'static str {
    BuiltinTheme::all()
        .get(current_theme_index())
        .map(|t| t.name())
        .unwrap_or(BuiltinTheme::OceanicNext.name())
}

/// Switches to the next built-in theme and records it in settings.
pub fn cycle_theme() -> &'static str {
    let next = (current_theme_index() + 1) % BuiltinTheme::all().len();
    CURRENT_THEME_INDEX.store(next, Ordering::Relaxed);
    let name = current_theme_name();
    settings::set_theme_name(name);
    name
}

pub fn current_theme() -> &'static Base16Palette {
    BuiltinTheme::all()
        .get(current_theme_index())
        .map(|t| t.palette())
        .unwrap_or(&OCEANIC_NEXT_PALETTE)
}

const fn rgb(value: u32) -> Color {
    Color::Rgb(
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    )
}

// ============================================================================
// Built-in theme palettes
// ============================================================================

static OCEANIC_NEXT_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0x1B2B34),
    base_01: rgb(0x343D46),
    base_02: rgb(0x4F5B66),
    base_03: rgb(0x65737E),
    base_04: rgb(0xA7ADBA),
    base_05: rgb(0xC0C5CE),
    base_06: rgb(0xCDD3DE),
    base_07: rgb(0xF0F4F8),
    base_08: rgb(0xEC5F67),
    base_09: rgb(0xF99157),
    base_0a: rgb(0xFAC863),
    base_0b: rgb(0x99C794),
    base_0c: rgb(0x5FB3B3),
    base_0d: rgb(0x6699CC),
    base_0e: rgb(0xC594C5),
    base_0f: rgb(0xAB7967),
};

static CATPPUCCIN_MOCHA_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0x1E1E2E),
    base_01: rgb(0x313244),
    base_02: rgb(0x45475A),
    base_03: rgb(0x6C7086),
    base_04: rgb(0x7F849C),
    base_05: rgb(0xA6ADC8),
    base_06: rgb(0xCDD6F4),
    base_07: rgb(0xF5E0DC),
    base_08: rgb(0xF38BA8),
    base_09: rgb(0xFAB387),
    base_0a: rgb(0xF9E2AF),
    base_0b: rgb(0xA6E3A1),
    base_0c: rgb(0x94E2D5),
    base_0d: rgb(0x89B4FA),
    base_0e: rgb(0xCBA6F7),
    base_0f: rgb(0xEBA0AC),
};

// Japanese-inspired warm tones
static KANAGAWA_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0x1F1F28),
    base_01: rgb(0x2A2A37),
    base_02: rgb(0x223249),
    base_03: rgb(0x727169),
    base_04: rgb(0xC8C093),
    base_05: rgb(0xDCD7BA),
    base_06: rgb(0xDCD7BA),
    base_07: rgb(0xE6E0C2),
    base_08: rgb(0xC34043),
    base_09: rgb(0xFFA066),
    base_0a: rgb(0xDCA561),
    base_0b: rgb(0x98BB6C),
    base_0c: rgb(0x7FB4CA),
    base_0d: rgb(0x7E9CD8),
    base_0e: rgb(0x957FB8),
    base_0f: rgb(0xD27E99),
};

// Darker variant with cooler tones
static KANAGAWA_DRAGON_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0x181616),
    base_01: rgb(0x0d0c0c),
    base_02: rgb(0x2d4f67),
    base_03: rgb(0xa6a69c),
    base_04: rgb(0x7fb4ca),
    base_05: rgb(0xc5c9c5),
    base_06: rgb(0xc5c9c5),
    base_07: rgb(0xc5c9c5),
    base_08: rgb(0xc4746e),
    base_09: rgb(0xe46876),
    base_0a: rgb(0xc4b28a),
    base_0b: rgb(0x8a9a7b),
    base_0c: rgb(0x8ea4a2),
    base_0d: rgb(0x8ba4b0),
    base_0e: rgb(0xa292a3),
    base_0f: rgb(0x7aa89f),
};

// ============================================================================
// Color utilities for focus states
// ============================================================================

impl Base16Palette {
    /// (border, title, background) for a side panel.
    pub fn get_panel_colors(&self, is_focused: bool) -> (Color, Color, Color) {
        if is_focused {
            (self.base_07, self.base_04, self.base_00)
        } else {
            (self.base_03, self.base_03, self.base_00)
        }
    }

    /// (background, foreground) for the highlighted list row.
    pub fn get_selection_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.base_02, self.base_06)
        } else {
            (self.base_02, self.base_03)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_splits_channels() {
        assert_eq!(rgb(0x1B2B34), Color::Rgb(0x1B, 0x2B, 0x34));
    }

    #[test]
    fn finds_builtin_by_name() {
        assert_eq!(get_theme_index_by_name("Kanagawa"), Some(2));
        assert_eq!(get_theme_index_by_name("Solarized"), None);
    }
}
