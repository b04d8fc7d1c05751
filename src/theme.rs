//! Immutable theme values. A `Theme` is rebuilt from its preset when the
//! selection changes and passed into each render call; nothing here is
//! mutated in place.

use std::str::FromStr;

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ThemePreset {
    #[default]
    Default,
    Light,
    Mono,
}

impl ThemePreset {
    pub const ALL: [Self; 3] = [Self::Default, Self::Light, Self::Mono];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Light => "light",
            Self::Mono => "mono",
        }
    }
}

impl FromStr for ThemePreset {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "light" | "day" => Ok(Self::Light),
            "mono" | "monochrome" => Ok(Self::Mono),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: BasePalette,
    pub interactive: InteractivePalette,
    pub dialog: DialogPalette,
}

#[derive(Debug, Clone, Copy)]
pub struct BasePalette {
    pub text: Color,
    pub text_muted: Color,
    pub header: Color,
    pub accent: Color,
    pub danger: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct InteractivePalette {
    pub focus: Color,
    pub border: Color,
    pub selected_fg: Color,
    pub selected_marker: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct DialogPalette {
    pub border: Color,
    pub input_border: Color,
    pub input_focus: Color,
}

impl Theme {
    pub fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Default => Self {
                base: BasePalette {
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::Cyan,
                    accent: Color::Cyan,
                    danger: Color::Red,
                },
                interactive: InteractivePalette {
                    focus: Color::Cyan,
                    border: Color::Gray,
                    selected_fg: Color::Yellow,
                    selected_marker: Color::Yellow,
                },
                dialog: DialogPalette {
                    border: Color::Cyan,
                    input_border: Color::Gray,
                    input_focus: Color::Yellow,
                },
            },
            ThemePreset::Light => Self {
                base: BasePalette {
                    text: Color::Black,
                    text_muted: Color::DarkGray,
                    header: Color::Blue,
                    accent: Color::Blue,
                    danger: Color::Red,
                },
                interactive: InteractivePalette {
                    focus: Color::Blue,
                    border: Color::DarkGray,
                    selected_fg: Color::Magenta,
                    selected_marker: Color::Magenta,
                },
                dialog: DialogPalette {
                    border: Color::Blue,
                    input_border: Color::DarkGray,
                    input_focus: Color::Magenta,
                },
            },
            ThemePreset::Mono => Self {
                base: BasePalette {
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::White,
                    accent: Color::White,
                    danger: Color::White,
                },
                interactive: InteractivePalette {
                    focus: Color::White,
                    border: Color::Gray,
                    selected_fg: Color::White,
                    selected_marker: Color::White,
                },
                dialog: DialogPalette {
                    border: Color::White,
                    input_border: Color::Gray,
                    input_focus: Color::White,
                },
            },
        }
    }

    /// Parses a stored column color, falling back to the theme accent when
    /// the value is empty or malformed.
    pub fn column_color(&self, raw: &str) -> Color {
        Color::from_str(raw.trim()).unwrap_or(self.base.accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_names_roundtrip() {
        for preset in ThemePreset::ALL {
            assert_eq!(ThemePreset::from_str(preset.as_str()), Ok(preset));
        }
        assert_eq!(ThemePreset::from_str("MONOCHROME"), Ok(ThemePreset::Mono));
        assert!(ThemePreset::from_str("solarized").is_err());
    }

    #[test]
    fn column_color_parses_hex_and_falls_back() {
        let theme = Theme::from_preset(ThemePreset::Default);
        assert_eq!(theme.column_color("#ff6b6b"), Color::Rgb(0xff, 0x6b, 0x6b));
        assert_eq!(theme.column_color(""), theme.base.accent);
        assert_eq!(theme.column_color("not-a-color"), theme.base.accent);
    }
}
