//! Follow the active log file, like `tail -f`.

use crate::config::Config;
use crate::tail::Tailer;

/// Follows the configured log file until interrupted.
///
/// # Errors
/// A stdout-only configuration and file I/O failures.
pub fn cmd_watch(config: &Config) -> Result<(), crate::Error> {
    let Some(path) = config.output_target() else {
        return Err(crate::Error::Archive(
            "log output is stdout, nothing to follow".into(),
        ));
    };
    println!("following {}", path.display());
    let tailer = Tailer::new(path);
    let mut out = std::io::stdout();
    tailer.run(&mut out)
}
