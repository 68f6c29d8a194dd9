//! Terminal style roles
//!
//! Each role maps to one `colored::Color`. Painting takes an explicit
//! `enabled` flag rather than consulting global state, so output is the
//! same under test as on a terminal.

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Success => Some(Color::Green),
    Failure => Some(Color::Red),
    Warning => Some(Color::Yellow),
    Prompt  => Some(Color::Cyan),
    Dim     => Some(Color::BrightBlack),
    Plain   => None,
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        self.color().and_then(ansi_code)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code().filter(|_| enabled) {
            Some(code) => format!("\x1b[{code}m{text}\x1b[0m"),
            None => text.to_string(),
        }
    }
}

fn ansi_code(color: Color) -> Option<&'static str> {
    use Color::*;
    Some(match color {
        Black => "30",
        Red => "31",
        Green => "32",
        Yellow => "33",
        Blue => "34",
        Magenta => "35",
        Cyan => "36",
        White => "37",
        BrightBlack => "90",
        BrightRed => "91",
        BrightGreen => "92",
        BrightYellow => "93",
        BrightBlue => "94",
        BrightMagenta => "95",
        BrightCyan => "96",
        BrightWhite => "97",
        TrueColor { .. } => return None,
    })
}

fn clap_color(color: Color) -> Option<AnsiColor> {
    use AnsiColor as A;
    use Color::*;
    Some(match color {
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Cyan => A::Cyan,
        BrightBlack => A::BrightBlack,
        _ => return None,
    })
}

/// Help output styles built from the same roles
pub fn help_styles(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(color) = role.color().and_then(clap_color) {
            s = s.fg_color(Some(ClapColor::Ansi(color)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Warning, true))
        .usage(style(StyleRole::Warning, true))
        .literal(style(StyleRole::Prompt, false))
        .placeholder(style(StyleRole::Success, false))
        .invalid(style(StyleRole::Failure, false))
        .error(style(StyleRole::Failure, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_enabled_and_disabled() {
        assert_eq!(StyleRole::Success.paint("ok", true), "\x1b[32mok\x1b[0m");
        assert_eq!(StyleRole::Success.paint("ok", false), "ok");
    }

    #[test]
    fn test_plain_role_is_never_colored() {
        assert_eq!(StyleRole::Plain.ansi_code(), None);
        assert_eq!(StyleRole::Plain.paint("text", true), "text");
    }
}
