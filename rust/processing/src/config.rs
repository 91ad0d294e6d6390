// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run configuration loaded from environment variables.

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Substring identifying the mechanical model among open documents.
    pub mechanical_model_marker: String,
    /// Family name of the opening to insert.
    pub opening_family_name: String,
    /// Category the opening family symbol must belong to.
    pub opening_category: String,
    /// Instance parameter receiving the opening width.
    pub width_parameter: String,
    /// Instance parameter receiving the opening height.
    pub height_parameter: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::new_defaults();
        Self {
            mechanical_model_marker: std::env::var("MECHANICAL_MODEL_MARKER")
                .unwrap_or(defaults.mechanical_model_marker),
            opening_family_name: std::env::var("OPENING_FAMILY_NAME")
                .unwrap_or(defaults.opening_family_name),
            opening_category: std::env::var("OPENING_CATEGORY")
                .unwrap_or(defaults.opening_category),
            width_parameter: std::env::var("OPENING_WIDTH_PARAM")
                .unwrap_or(defaults.width_parameter),
            height_parameter: std::env::var("OPENING_HEIGHT_PARAM")
                .unwrap_or(defaults.height_parameter),
        }
    }

    /// Built-in defaults, ignoring the environment.
    pub fn new_defaults() -> Self {
        Self {
            mechanical_model_marker: "ОВ".into(),
            opening_family_name: "Отверстия".into(),
            opening_category: "GenericModel".into(),
            width_parameter: "Ширина".into(),
            height_parameter: "Высота".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
