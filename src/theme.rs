use ratatui::style::Color;

pub const DEFAULT_THEME: &str = "monkeytype";

/// Colour palette for the typing screen, as `#rrggbb` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub bg: &'static str,
    /// untyped text
    pub main: &'static str,
    pub correct: &'static str,
    pub error: &'static str,
    pub caret: &'static str,
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "monkeytype",
        bg: "#323437",
        main: "#646669",
        correct: "#d1d0c5",
        error: "#ca4754",
        caret: "#e2b714",
    },
    Theme {
        name: "github_light",
        bg: "#ffffff",
        main: "#959da5",
        correct: "#24292e",
        error: "#d73a49",
        caret: "#0366d6",
    },
    Theme {
        name: "github_dark",
        bg: "#0d1117",
        main: "#484f58",
        correct: "#c9d1d9",
        error: "#f85149",
        caret: "#58a6ff",
    },
    Theme {
        name: "mint",
        bg: "#053b3e",
        main: "#479599",
        correct: "#f1fffa",
        error: "#ff5a5f",
        caret: "#00ff9c",
    },
    Theme {
        name: "nord",
        bg: "#2e3440",
        main: "#4c566a",
        correct: "#eceff4",
        error: "#bf616a",
        caret: "#88c0d0",
    },
    Theme {
        name: "dracula",
        bg: "#282a36",
        main: "#6272a4",
        correct: "#f8f8f2",
        error: "#ff5555",
        caret: "#bd93f9",
    },
    Theme {
        name: "solarized_dark",
        bg: "#002b36",
        main: "#586e75",
        correct: "#839496",
        error: "#dc322f",
        caret: "#268bd2",
    },
    Theme {
        name: "solarized_light",
        bg: "#fdf6e3",
        main: "#657b83",
        correct: "#586e75",
        error: "#dc322f",
        caret: "#268bd2",
    },
    Theme {
        name: "gruvbox_dark",
        bg: "#282828",
        main: "#928374",
        correct: "#ebdbb2",
        error: "#fb4934",
        caret: "#fabd2f",
    },
    Theme {
        name: "gruvbox_light",
        bg: "#fbf1c7",
        main: "#7c6f64",
        correct: "#3c3836",
        error: "#cc241d",
        caret: "#b57614",
    },
    Theme {
        name: "one_dark",
        bg: "#282c34",
        main: "#5c6370",
        correct: "#abb2bf",
        error: "#e06c75",
        caret: "#61afef",
    },
    Theme {
        name: "catppuccin_mocha",
        bg: "#1e1e2e",
        main: "#6c7086",
        correct: "#cdd6f4",
        error: "#f38ba8",
        caret: "#89b4fa",
    },
    Theme {
        name: "rose_pine",
        bg: "#191724",
        main: "#6e6a86",
        correct: "#e0def4",
        error: "#eb6f92",
        caret: "#9ccfd8",
    },
    Theme {
        name: "tokyo_night",
        bg: "#1a1b26",
        main: "#565f89",
        correct: "#a9b1d6",
        error: "#f7768e",
        caret: "#7aa2f7",
    },
    Theme {
        name: "everforest",
        bg: "#2f333e",
        main: "#7f897d",
        correct: "#d3c6aa",
        error: "#e67e80",
        caret: "#7fbbb3",
    },
];

impl Theme {
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|t| t.name == name)
    }

    /// Falls back to the default palette for unknown names.
    pub fn named_or_default(name: &str) -> &'static Theme {
        Self::by_name(name).unwrap_or(&THEMES[0])
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        THEMES.iter().map(|t| t.name)
    }

    /// The palette after `name`, wrapping around; unknown names restart at
    /// the default.
    pub fn next_after(name: &str) -> &'static Theme {
        let idx = THEMES
            .iter()
            .position(|t| t.name == name)
            .map_or(0, |i| (i + 1) % THEMES.len());
        &THEMES[idx]
    }

    pub fn bg_color(&self) -> Color {
        hex_color(self.bg)
    }

    pub fn main_color(&self) -> Color {
        hex_color(self.main)
    }

    pub fn correct_color(&self) -> Color {
        hex_color(self.correct)
    }

    pub fn error_color(&self) -> Color {
        hex_color(self.error)
    }

    pub fn caret_color(&self) -> Color {
        hex_color(self.caret)
    }
}

/// Parses `#rrggbb`; anything else renders in the terminal's default colour.
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Color::Reset;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
    match (channel(0), channel(2), channel(4)) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => Color::Reset,
    }
}
