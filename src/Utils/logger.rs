use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Initializes terminal logging at `level`. Safe to call more than once: a logger that is
/// already installed is left in place and `false` is returned.
/// `trace` shows the token sequence after every normalization pass.
pub fn init_logger(level: LevelFilter) -> bool {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Debug)
        .build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_logger(LevelFilter::Warn);
        assert!(!init_logger(LevelFilter::Trace));
        log::warn!("logger initialized twice");
    }
}
