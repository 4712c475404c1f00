//! stderr logging for the command line.

use anyhow::Result;
use flexi_logger::{Logger, LoggerHandle};

/// Log level for the `-v`/`-q` flags. `RUST_LOG` wins when set.
pub fn level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Start the logger. The handle must be kept alive for the whole run.
pub fn init(verbose: u8, quiet: bool, color: bool) -> Result<LoggerHandle> {
    let format = if color {
        flexi_logger::colored_default_format
    } else {
        flexi_logger::default_format
    };
    let handle = Logger::try_with_env_or_str(level(verbose, quiet))?
        .log_to_stderr()
        .format(format)
        .start()?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level(0, false), "warn");
        assert_eq!(level(1, false), "info");
        assert_eq!(level(2, false), "debug");
        assert_eq!(level(5, false), "trace");
        assert_eq!(level(3, true), "error", "quiet wins over verbose");
    }
}
