//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes.

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

/// Available theme variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette::dark(),
            Self::Light => Palette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

/// Every semantic UI role, resolved to a concrete `Style`.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    // -- Article list --
    pub article_title: Style,
    pub article_selected: Style,
    pub article_meta: Style,
    pub article_source: Style,
    pub favorite_mark: Style,

    // -- Detail --
    pub detail_heading: Style,
    pub detail_body: Style,
    pub detail_meta: Style,
    pub detail_link: Style,

    // -- Feedback --
    pub error_title: Style,
    pub error_body: Style,
    pub spinner: Style,
    pub empty: Style,

    // -- Chrome --
    pub header: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub input: Style,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            article_title: Style::default().add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            article_meta: Style::default().fg(Color::DarkGray),
            article_source: Style::default().fg(Color::Cyan),
            favorite_mark: Style::default().fg(Color::Yellow),

            detail_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_meta: Style::default().fg(Color::DarkGray),
            detail_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            error_title: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            error_body: Style::default().fg(Color::Gray),
            spinner: Style::default().fg(Color::Yellow),
            empty: Style::default().fg(Color::DarkGray),

            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            input: Style::default().fg(Color::Yellow),
        }
    }

    /// Adapted for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            article_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::Blue).fg(Color::White),
            article_meta: Style::default().fg(Color::DarkGray),
            article_source: Style::default().fg(Color::Blue),
            favorite_mark: Style::default().fg(Color::Magenta),

            detail_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_meta: Style::default().fg(Color::DarkGray),
            detail_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            error_title: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            error_body: Style::default().fg(Color::DarkGray),
            spinner: Style::default().fg(Color::Magenta),
            empty: Style::default().fg(Color::DarkGray),

            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            input: Style::default().fg(Color::Magenta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_cycles() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next(), ThemeVariant::Dark);
        assert_eq!(ThemeVariant::default(), ThemeVariant::Dark);
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.article_selected, light.article_selected);
        assert_ne!(dark.status_bar, light.status_bar);
        assert_eq!(dark, Palette::dark());
    }

    #[test]
    fn variant_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            theme: ThemeVariant,
        }
        let parsed: Wrapper = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(parsed.theme, ThemeVariant::Light);
        assert!(toml::from_str::<Wrapper>("theme = \"neon\"").is_err());
    }
}
