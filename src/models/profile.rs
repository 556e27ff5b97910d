use serde::{Deserialize, Serialize};

use crate::models::{History, School};

pub const DEFAULT_METHOD: u8 = 2;

fn default_name() -> String {
    "Guest".to_string()
}
fn default_method() -> u8 {
    DEFAULT_METHOD
}
fn default_true() -> bool {
    true
}

/// Everything the user owns: settings plus the full progress history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_method")]
    pub calculation_method: u8,
    #[serde(default)]
    pub school: School,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub history: History,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: default_name(),
            calculation_method: default_method(),
            school: School::default(),
            notifications_enabled: true,
            history: History::new(),
        }
    }
}
