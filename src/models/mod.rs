pub mod guidance;
pub mod history;
pub mod location;
pub mod prayer;
pub mod profile;
pub mod progress;

pub use guidance::{Recommendation, RecommendationKind};
pub use history::History;
pub use location::Coordinate;
pub use prayer::{PrayerType, School};
pub use profile::Profile;
pub use progress::{DailyProgress, PrayerFlags};
