use chrono::Local;
use simplelog::*;
use std::fs::File;

/// Maps the textual log level used in configs to a filter.
/// Unknown names fall back to `Info`.
pub fn level_from_str(loglevel: &str) -> LevelFilter {
    match loglevel.trim().to_lowercase().as_str() {
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" | "none" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Initializes the global logger: terminal output and, if `log_to_file`, a copy into
/// `log_<date>_<time>.txt` in the working directory.
///
/// Returns `false` if a logger was already installed; the existing one is kept.
pub fn init_logger(loglevel: &str, log_to_file: bool) -> bool {
    let level = level_from_str(loglevel);
    if level == LevelFilter::Off {
        return false;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        match File::create(&name) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(e) => eprintln!("cannot create log file {}: {}", name, e),
        }
    }
    CombinedLogger::init(loggers).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(level_from_str("debug"), LevelFilter::Debug);
        assert_eq!(level_from_str(" WARN "), LevelFilter::Warn);
        assert_eq!(level_from_str("none"), LevelFilter::Off);
        assert_eq!(level_from_str("whatever"), LevelFilter::Info);
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        let _ = init_logger("info", false);
        assert!(!init_logger("info", false));
        assert!(!init_logger("off", false));
    }
}
