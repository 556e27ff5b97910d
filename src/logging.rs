use anyhow::{Context, Result};
use env_logger::{Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";

fn env() -> Env<'static> {
    Env::default().default_filter_or(DEFAULT_FILTER)
}

/// Log to stderr.
pub fn init() {
    env_logger::Builder::from_env(env()).init();
}

/// Log to a file instead of stderr, for when the terminal is owned by the dashboard.
pub fn init_to_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Opening log file {:?}", path))?;
    env_logger::Builder::from_env(env())
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn both_targets_share_the_warn_default() {
        // parse the same default the builders use, minus any RUST_LOG override
        let logger = env_logger::Builder::new().parse_filters(DEFAULT_FILTER).build();
        assert_eq!(logger.filter(), LevelFilter::Warn);
    }
}
