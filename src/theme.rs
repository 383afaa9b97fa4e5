use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the editor
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground color for the title line
    pub title_fg: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the unsaved-changes marker in the status bar
    pub dirty_marker_color: Color,

    /// Foreground color for active selection
    pub selection_fg: Color,

    /// Background color for active selection
    pub selection_bg: Color,

    /// Foreground color for inline code (InlineStyle::Code)
    pub code_fg: Color,

    /// Background color for inline code and code blocks
    pub code_bg: Color,

    /// Color for the placeholder shown in an empty document
    pub placeholder_fg: Color,

    /// Foreground color for the saved notification
    pub toast_fg: Color,

    /// Background color for the saved notification
    pub toast_bg: Color,

    /// Border color for the saved notification
    pub toast_border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title_fg: Color::Gray,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            dirty_marker_color: Color::LightYellow,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            code_fg: Color::LightRed,
            code_bg: Color::Reset,
            placeholder_fg: Color::DarkGray,
            toast_fg: Color::White,
            toast_bg: Color::Green,
            toast_border: Color::LightGreen,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title_fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    pub fn dirty_marker_style(&self) -> Style {
        self.status_bar_style().fg(self.dirty_marker_color)
    }

    /// Get the style for selected text
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    /// Get the style for inline code and code blocks
    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code_fg).bg(self.code_bg)
    }

    pub fn placeholder_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder_fg)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get the style for the saved notification popup
    pub fn toast_style(&self) -> Style {
        Style::default().fg(self.toast_fg).bg(self.toast_bg)
    }

    pub fn toast_border_style(&self) -> Style {
        Style::default().fg(self.toast_border).bg(self.toast_bg)
    }
}
