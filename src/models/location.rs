use serde::{Deserialize, Serialize};

/// An observer position in decimal degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
        }
    }

    pub fn named(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: Some(name.into()),
        }
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}
