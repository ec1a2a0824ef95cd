//! Title bar and status bar settings a host applies when showing a screen.

use experience_core::{Color, Screen, TitleBarButtons};

#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarConfiguration {
    /// Keep the host application's own toolbar styling and ignore the colors
    pub use_existing_style: bool,
    pub title: String,
    pub color: Color,
    pub text_color: Color,
    pub button_color: Color,
    pub back_button: bool,
    pub close_button: bool,
    pub status_bar_color: Color,
}

impl ToolbarConfiguration {
    pub fn from_screen(screen: &Screen) -> Self {
        let title_bar = &screen.title_bar;
        Self {
            use_existing_style: title_bar.use_default_style,
            title: title_bar.text.clone(),
            color: title_bar.background_color,
            text_color: title_bar.text_color,
            button_color: title_bar.button_color,
            back_button: matches!(title_bar.buttons, TitleBarButtons::Back | TitleBarButtons::Both),
            close_button: matches!(
                title_bar.buttons,
                TitleBarButtons::Close | TitleBarButtons::Both
            ),
            status_bar_color: screen.status_bar.color,
        }
    }
}
