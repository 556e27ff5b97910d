pub mod client;
pub mod methods;
pub mod schedule;

pub use client::TimingClient;
pub use schedule::{next_prayer, seconds_until, DailySchedule};
