//! Theme system

use ratatui::style::Color;

/// Complete color palette for TUI rendering
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    // Backgrounds
    pub bg_primary: Color,
    pub bg_status: Color,

    // Borders
    pub border_card: Color,
    pub border_muted: Color,

    // Text
    pub text_primary: Color,
    pub text_label: Color,
    pub text_muted: Color,

    // Status
    pub success: Color,
    pub error: Color,
    pub info: Color,

    // Accents
    pub accent_amber: Color,
    pub accent_acorn: Color,
    pub accent_bark: Color,
}

impl ThemeColors {
    /// Default theme
    pub const DEFAULT: Self = Self {
        // Backgrounds
        bg_primary: Color::Rgb(22, 24, 38),
        bg_status: Color::Rgb(15, 15, 25),

        // Borders
        border_card: Color::Rgb(180, 83, 9),
        border_muted: Color::Rgb(90, 95, 115),

        // Text
        text_primary: Color::Rgb(230, 233, 248),
        text_label: Color::Rgb(253, 230, 138),
        text_muted: Color::Rgb(252, 211, 77),

        // Status
        success: Color::Rgb(110, 220, 120),
        error: Color::Rgb(250, 120, 130),
        info: Color::Rgb(110, 200, 245),

        // Accents
        accent_amber: Color::Rgb(217, 119, 6),
        accent_acorn: Color::Rgb(245, 175, 100),
        accent_bark: Color::Rgb(146, 64, 14),
    };

    /// Color for the remaining allowance, warming as it runs out.
    #[inline]
    pub fn allowance(&self, remaining: u64, quota: u64) -> Color {
        if remaining <= quota / 5 {
            self.error
        } else if remaining <= quota / 2 {
            self.accent_acorn
        } else {
            self.success
        }
    }
}

/// Theme container providing access to color palette
#[derive(Debug, Clone, Copy, Default)]
pub struct Theme;

impl Theme {
    #[inline]
    pub const fn colors(&self) -> ThemeColors {
        ThemeColors::DEFAULT
    }
}
