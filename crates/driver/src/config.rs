//! Component configuration.
//!
//! Every field is optional; [`CloudsConfig::resolve`] fills in the defaults.
//! Keys use the camelCase spelling of the embedding page:
//!
//! ```json
//! { "container": "#hero", "width": 800, "height": 600, "mouseTracking": false,
//!   "fixedMouseX": 100, "fixedMouseY": 50, "backgroundColor": "#102030" }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use shading::Vec2;
use thiserror::Error;

use crate::animation::PointerSettings;

pub const DEFAULT_CONTAINER: &str = "body";
pub const DEFAULT_FIXED_POINTER: Vec2 = Vec2::new(400.0, 300.0);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudsConfig {
    pub container: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mouse_tracking: Option<bool>,
    pub fixed_mouse_x: Option<f32>,
    pub fixed_mouse_y: Option<f32>,
    /// `0xRRGGBB`; JSON accepts a number or a `"#rrggbb"` / `"0xrrggbb"` string.
    #[serde(deserialize_with = "de_color")]
    pub background_color: Option<u32>,
    pub interactive: Option<bool>,
    pub auto_start: Option<bool>,
    pub background_image: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Number(u32),
    Text(String),
}

fn de_color<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<ColorValue>::deserialize(de)?;
    match value {
        None => Ok(None),
        Some(ColorValue::Number(n)) => Ok(Some(n & 0x00ff_ffff)),
        Some(ColorValue::Text(s)) => parse_hex_color(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour `{s}`"))),
    }
}

/// Parse `#rrggbb`, `0xrrggbb` or bare `rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Configuration with every default applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub container: String,
    pub width: u32,
    pub height: u32,
    pub mouse_tracking: bool,
    pub fixed_pointer: Vec2,
    pub background_color: u32,
    pub interactive: bool,
    pub auto_start: bool,
    pub background_image: Option<String>,
}

impl ResolvedConfig {
    pub fn pointer_settings(&self) -> PointerSettings {
        PointerSettings {
            tracking: self.mouse_tracking,
            fixed: self.fixed_pointer,
        }
    }
}

impl CloudsConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Apply defaults. The default size is half of `viewport`; a zero width
    /// or height counts as unset.
    pub fn resolve(&self, viewport: (u32, u32)) -> ResolvedConfig {
        let width = self.width.filter(|w| *w > 0).unwrap_or(viewport.0 / 2);
        let height = self.height.filter(|h| *h > 0).unwrap_or(viewport.1 / 2);
        ResolvedConfig {
            container: self
                .container
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_owned()),
            width,
            height,
            mouse_tracking: self.mouse_tracking.unwrap_or(true),
            fixed_pointer: Vec2::new(
                self.fixed_mouse_x.unwrap_or(DEFAULT_FIXED_POINTER.x),
                self.fixed_mouse_y.unwrap_or(DEFAULT_FIXED_POINTER.y),
            ),
            background_color: self.background_color.unwrap_or(0),
            interactive: self.interactive.unwrap_or(true),
            auto_start: self.auto_start.unwrap_or(true),
            background_image: self.background_image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let resolved = CloudsConfig::from_json("{}").unwrap().resolve((1600, 1200));
        assert_eq!(
            resolved,
            ResolvedConfig {
                container: "body".to_owned(),
                width: 800,
                height: 600,
                mouse_tracking: true,
                fixed_pointer: Vec2::new(400.0, 300.0),
                background_color: 0,
                interactive: true,
                auto_start: true,
                background_image: None,
            }
        );
    }

    #[test]
    fn camel_case_keys_are_read() {
        let json = r##"{
            "container": "#hero",
            "width": 640,
            "height": 480,
            "mouseTracking": false,
            "fixedMouseX": 100,
            "fixedMouseY": 50,
            "backgroundColor": "#102030",
            "interactive": false,
            "autoStart": false,
            "backgroundImage": "sky.jpg"
        }"##;
        let r = CloudsConfig::from_json(json).unwrap().resolve((10, 10));
        assert_eq!(r.container, "#hero");
        assert_eq!((r.width, r.height), (640, 480));
        assert!(!r.mouse_tracking);
        assert_eq!(r.fixed_pointer, Vec2::new(100.0, 50.0));
        assert_eq!(r.background_color, 0x0010_2030);
        assert!(!r.interactive);
        assert!(!r.auto_start);
        assert_eq!(r.background_image.as_deref(), Some("sky.jpg"));
    }

    #[test]
    fn zero_size_counts_as_unset() {
        let cfg = CloudsConfig {
            width: Some(0),
            height: Some(300),
            ..CloudsConfig::default()
        };
        let r = cfg.resolve((1000, 900));
        assert_eq!((r.width, r.height), (500, 300));
    }

    #[test]
    fn explicit_zero_pointer_is_kept() {
        let cfg = CloudsConfig::from_json(r#"{"fixedMouseX": 0, "fixedMouseY": 0}"#).unwrap();
        assert_eq!(cfg.resolve((2, 2)).fixed_pointer, Vec2::ZERO);
    }

    #[test]
    fn numeric_colour_is_masked() {
        let cfg = CloudsConfig::from_json(r#"{"backgroundColor": 4294967295}"#).unwrap();
        assert_eq!(cfg.background_color, Some(0x00ff_ffff));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            CloudsConfig::from_json(r#"{"width": "wide"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(CloudsConfig::from_json(r#"{"backgroundColor": "blue"}"#).is_err());
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_color("#ffffff"), Some(0x00ff_ffff));
        assert_eq!(parse_hex_color("0x000080"), Some(0x80));
        assert_eq!(parse_hex_color("abcdef"), Some(0x00ab_cdef));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }
}
