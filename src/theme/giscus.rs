//! Theme sync with the giscus comment widget

use serde::{Deserialize, Serialize};

use super::Theme;

/// Origin the widget frame accepts messages from
pub const GISCUS_ORIGIN: &str = "https://giscus.app";

/// `{"giscus": {"setConfig": {"theme": "dark"}}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiscusMessage {
    giscus: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Command {
    #[serde(rename = "setConfig")]
    set_config: ConfigUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ConfigUpdate {
    theme: Theme,
}

impl GiscusMessage {
    pub fn set_theme(theme: Theme) -> Self {
        Self {
            giscus: Command {
                set_config: ConfigUpdate { theme },
            },
        }
    }

    pub fn theme(&self) -> Theme {
        self.giscus.set_config.theme
    }
}

/// An embedded widget frame that accepts posted messages
pub trait CommentFrame: Send + Sync {
    fn post_message(&self, message: &GiscusMessage, target_origin: &str);

    /// Whether a widget is actually listening right now
    fn is_present(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(GiscusMessage::set_theme(Theme::Dark)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"giscus": {"setConfig": {"theme": "dark"}}})
        );
    }

    #[test]
    fn test_parse_message() {
        let msg: GiscusMessage =
            serde_json::from_str(r#"{"giscus":{"setConfig":{"theme":"light"}}}"#).unwrap();
        assert_eq!(msg.theme(), Theme::Light);
    }
}
