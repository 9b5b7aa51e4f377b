/// Logger setup shared by both binaries
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Install the global logger
///
/// `RUST_LOG` overrides the default level, which is `info` or `warn` when
/// quiet. With `log_file` the log goes to that file instead of stderr.
pub fn init_logging(quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if quiet { "warn" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    Ok(())
}
