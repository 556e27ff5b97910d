use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Dua,
    Verse,
    Habit,
    Quote,
}

impl RecommendationKind {
    pub const ALL: [RecommendationKind; 4] = [
        RecommendationKind::Dua,
        RecommendationKind::Verse,
        RecommendationKind::Habit,
        RecommendationKind::Quote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Dua => "dua",
            RecommendationKind::Verse => "verse",
            RecommendationKind::Habit => "habit",
            RecommendationKind::Quote => "quote",
        }
    }
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// One piece of guidance. Held for the session only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub reasoning: String,
}

impl Recommendation {
    /// Text shown as the body: duas and verses lead with their translation.
    pub fn display_body(&self) -> &str {
        match self.kind {
            RecommendationKind::Dua | RecommendationKind::Verse => self
                .translation
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(&self.content),
            RecommendationKind::Habit | RecommendationKind::Quote => &self.content,
        }
    }
}
