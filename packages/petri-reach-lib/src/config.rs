use petri_reach_macros::config;

use crate::{logger::LogLevel, net::marking::DEFAULT_CAP};

/// Merges an optional, partially specified setting into its default.
pub trait FillDefault<T> {
    fn fill_default(self, default: T) -> T;
}

impl<T> FillDefault<T> for Option<T> {
    fn fill_default(self, default: T) -> T {
        self.unwrap_or(default)
    }
}

impl<T> FillDefault<Option<T>> for Option<T> {
    fn fill_default(self, default: Option<T>) -> Option<T> {
        self.or(default)
    }
}

config! {
    pub struct LoggerConfig {
        enabled: bool = false,
        log_file: bool = false,
        log_level: LogLevel = LogLevel::Warn,
    }
}

config! {
    pub struct AnalysisConfig {
        /// Largest token count a place may reach during the search.
        cap: u32 = DEFAULT_CAP,
        logger: LoggerConfig (Option<PartialLoggerConfig> = LoggerConfig::default()),
    }
}

#[test]
fn test_partial_config() {
    let config = AnalysisConfig::from_toml_str(
        r#"
        [logger]
        enabled = true
        log_level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(*config.get_cap(), DEFAULT_CAP);
    assert!(*config.get_logger().get_enabled());
    assert!(!*config.get_logger().get_log_file());
    assert_eq!(*config.get_logger().get_log_level(), LogLevel::Debug);
}

#[test]
fn test_unknown_setting() {
    assert!(AnalysisConfig::from_toml_str("capp = 3").is_err());
    assert_eq!(
        *AnalysisConfig::from_toml_str("cap = 3").unwrap().get_cap(),
        3
    );
}
