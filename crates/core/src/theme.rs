//! Colour theme catalogue.

/// One selectable colour theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    /// Name of the palette applied globally; empty for the default theme.
    pub style_class: &'static str,
    /// Primary colour, also shown as the picker swatch.
    pub swatch: [u8; 3],
}

pub const THEMES: &[Theme] = &[
    Theme {
        id: "gold",
        name: "Gold",
        style_class: "",
        swatch: [250, 204, 21],
    },
    Theme {
        id: "purple",
        name: "Purple",
        style_class: "theme-purple",
        swatch: [168, 85, 247],
    },
    Theme {
        id: "blue",
        name: "Blue",
        style_class: "theme-blue",
        swatch: [59, 130, 246],
    },
    Theme {
        id: "green",
        name: "Green",
        style_class: "theme-green",
        swatch: [34, 197, 94],
    },
    Theme {
        id: "pink",
        name: "Pink",
        style_class: "theme-pink",
        swatch: [236, 72, 153],
    },
];

pub const DEFAULT_THEME_ID: &str = "gold";

impl Theme {
    /// Looks up a theme by id, falling back to the default.
    pub fn by_id(id: &str) -> Theme {
        THEMES
            .iter()
            .find(|t| t.id == id)
            .copied()
            .unwrap_or(THEMES[0])
    }
}

impl Default for Theme {
    fn default() -> Self {
        THEMES[0]
    }
}
