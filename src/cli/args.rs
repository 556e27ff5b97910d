use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "miqat", version, author, about = "A terminal prayer-time companion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and countdown to the next prayer
    Times,
    /// Toggle a prayer as performed (run again to undo)
    Mark {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: String,
        /// Day to mark instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show recent daily progress
    History {
        /// Number of most recent days to show
        #[arg(long, default_value_t = 7)]
        days: usize,
    },
    /// Show the qibla bearing from the current location
    Qibla {
        /// Current device heading in degrees, to show how far to turn
        #[arg(long, allow_hyphen_values = true)]
        heading: Option<f64>,
    },
    /// Ask for personalised guidance based on recent prayers
    Guide,
    /// View or change profile settings
    Settings {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Calculation method id (see `miqat methods`)
        #[arg(long)]
        method: Option<u8>,
        /// Asr school: standard (Shafi'i/Hanbali/Maliki) or hanafi
        #[arg(long)]
        school: Option<String>,
        /// Prayer notifications: on or off
        #[arg(long)]
        notifications: Option<String>,
        /// Forget all settings and history
        #[arg(long)]
        reset: bool,
    },
    /// List available calculation methods
    Methods,
    /// Show the configuration file path and current values
    Config {
        /// Write the current values to the config file if it does not exist
        #[arg(long)]
        init: bool,
    },
}
