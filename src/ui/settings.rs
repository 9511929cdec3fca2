use serde::{Deserialize, Serialize};
use egui::Color32;
use std::collections::HashMap;

/// Where the conversation goes. Changes apply from the next new case.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    /// OpenAI-compatible API root, e.g. `http://localhost:1234/v1`
    pub base_url: String,
    pub model: String,
    pub temperature: f32,

    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".into(),
            model: "local-model".into(),
            temperature: 0.7,
            api_key_env: "NOIR_FILES_API_KEY".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppSettings {
    pub ui_scale: f32,

    // Speaker → color mapping
    pub speaker_colors: HashMap<String, [u8; 4]>,

    pub llm: LlmSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        let mut speaker_colors = HashMap::new();

        speaker_colors.insert("User".into(), [110, 30, 30, 255]);
        speaker_colors.insert("Assistant".into(), [45, 50, 60, 255]);
        speaker_colors.insert("System".into(), [60, 55, 40, 255]);

        Self {
            ui_scale: 1.0,
            speaker_colors,
            llm: LlmSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn color(&self, key: &str) -> Color32 {
        self.speaker_colors
            .get(key)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, key: &str, color: Color32) {
        self.speaker_colors.insert(
            key.to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let s: AppSettings = serde_json::from_str(r#"{"llm":{"model":"noir-13b"}}"#).unwrap();
        assert_eq!(s.ui_scale, 1.0);
        assert_eq!(s.llm.model, "noir-13b");
        assert_eq!(s.llm.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn colors_round_trip_through_settings() {
        let mut s = AppSettings::default();
        s.set_color("User", Color32::from_rgb(1, 2, 3));
        assert_eq!(s.color("User"), Color32::from_rgb(1, 2, 3));
        assert_eq!(s.color("Nobody"), Color32::DARK_GRAY);
    }
}
