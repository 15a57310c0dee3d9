use localchat_core::ThemeMode;
use ratatui::style::Color;

#[derive(Clone, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub user_color: Color,
    pub bot_color: Color,
    pub border: Color,
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            bg: Color::Rgb(46, 46, 46),
            fg: Color::Rgb(255, 255, 255),
            accent: Color::Rgb(122, 162, 247),
            muted: Color::Rgb(120, 120, 120),
            error: Color::Rgb(247, 118, 142),
            user_color: Color::Cyan,
            bot_color: Color::Rgb(158, 206, 106),
            border: Color::Rgb(80, 80, 80),
            bar_bg: Color::Rgb(30, 30, 30),
            bar_fg: Color::Rgb(220, 220, 220),
            highlight_bg: Color::Blue,
            highlight_fg: Color::White,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            bg: Color::Rgb(255, 255, 255),
            fg: Color::Rgb(0, 0, 0),
            accent: Color::Rgb(46, 89, 182),
            muted: Color::Rgb(130, 130, 130),
            error: Color::Rgb(190, 30, 45),
            user_color: Color::Rgb(0, 110, 140),
            bot_color: Color::Rgb(40, 120, 40),
            border: Color::Rgb(190, 190, 190),
            bar_bg: Color::Rgb(225, 225, 225),
            bar_fg: Color::Rgb(30, 30, 30),
            highlight_bg: Color::Rgb(46, 89, 182),
            highlight_fg: Color::White,
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }
}
