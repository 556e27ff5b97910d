pub mod bearing;
pub mod heading;

pub use bearing::{qibla_bearing, relative_turn};
pub use heading::HeadingFeed;
