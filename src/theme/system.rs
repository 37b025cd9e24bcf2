//! System color scheme detection

use super::Theme;

/// Environment variable forcing the system preference
pub const COLOR_SCHEME_VAR: &str = "BLOGFRONT_COLOR_SCHEME";

/// Source of the operating system's light/dark preference
pub trait SystemPreference: Send + Sync {
    fn theme(&self) -> Theme;
}

/// Reads the preference from the environment.
///
/// `BLOGFRONT_COLOR_SCHEME` (`dark`/`light`) wins; otherwise the terminal's
/// `COLORFGBG` background color decides. Defaults to light.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvPreference;

impl SystemPreference for EnvPreference {
    fn theme(&self) -> Theme {
        let scheme = std::env::var(COLOR_SCHEME_VAR).ok();
        let colorfgbg = std::env::var("COLORFGBG").ok();
        theme_from_env(scheme.as_deref(), colorfgbg.as_deref())
    }
}

/// A fixed preference
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPreference(pub Theme);

impl SystemPreference for FixedPreference {
    fn theme(&self) -> Theme {
        self.0
    }
}

fn theme_from_env(scheme: Option<&str>, colorfgbg: Option<&str>) -> Theme {
    if let Some(theme) = scheme.and_then(|s| s.to_lowercase().parse().ok()) {
        return theme;
    }

    // "fg;bg" or "fg;default;bg"; dark backgrounds are ANSI 0-6 and 8
    let background = colorfgbg
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());

    match background {
        Some(0..=6 | 8) => Theme::Dark,
        _ => Theme::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_scheme_wins() {
        assert_eq!(theme_from_env(Some("DARK"), Some("0;15")), Theme::Dark);
        assert_eq!(theme_from_env(Some("light"), Some("15;0")), Theme::Light);
    }

    #[test]
    fn test_colorfgbg_background() {
        assert_eq!(theme_from_env(None, Some("15;0")), Theme::Dark);
        assert_eq!(theme_from_env(None, Some("15;default;8")), Theme::Dark);
        assert_eq!(theme_from_env(None, Some("0;15")), Theme::Light);
    }

    #[test]
    fn test_defaults_to_light() {
        assert_eq!(theme_from_env(None, None), Theme::Light);
        assert_eq!(theme_from_env(Some("purple"), Some("garbage")), Theme::Light);
    }
}
