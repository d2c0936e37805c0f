use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub focus_border: Style,
    pub blurred_border: Style,
    pub disabled: Style,
    pub text: Style,
    pub selection: Style,
    pub chosen: Style,

    // Specific components
    pub title: Style,
    pub button: Style,
    pub button_busy: Style,
    pub button_disabled: Style,
    pub error: Style,
    pub result_summary: Style,
    pub result_timestamp: Style,
    pub list_number: Style,
    pub footer: Style,
    pub popup_border: Style,
    pub popup_text: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            blurred_border: Style::default().fg(Color::DarkGray),
            disabled: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            text: Style::default().fg(Color::White),
            selection: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            chosen: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),

            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            button: Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
            button_busy: Style::default().fg(Color::Black).bg(Color::Gray),
            button_disabled: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            result_summary: Style::default().add_modifier(Modifier::BOLD),
            result_timestamp: Style::default().fg(Color::Magenta),
            list_number: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            popup_border: Style::default().fg(Color::Magenta).bg(Color::Black),
            popup_text: Style::default().fg(Color::White),
        }
    }
}
