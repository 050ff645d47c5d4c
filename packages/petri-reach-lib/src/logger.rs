use std::{
    fmt::Display,
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
    sync::Mutex,
};

use anyhow::Context;
use chrono::Local;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};

use crate::config::LoggerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn tag(&self) -> ColoredString {
        match self {
            LogLevel::Debug => "DBG".bright_cyan(),
            LogLevel::Info => "INF".bright_green(),
            LogLevel::Warn => "WAR".yellow(),
            LogLevel::Error => "ERR".bright_red(),
        }
    }

    pub fn plain_tag(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WAR",
            LogLevel::Error => "ERR",
        }
    }

    /// Whether a message of this level passes a logger set to `threshold`.
    pub fn passes(&self, threshold: &LogLevel) -> bool {
        self >= threshold
    }

    pub fn to_tracing(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "inf" => Ok(LogLevel::Info),
            "warn" | "warning" | "war" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "Debug"),
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Warn => write!(f, "Warn"),
            LogLevel::Error => write!(f, "Error"),
        }
    }
}

/// User facing log lines on stderr, mirrored without colours into an optional
/// log file. The file receives every message regardless of the level.
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
    name: String,
    file: Option<Mutex<BufWriter<File>>>,
}

impl Logger {
    pub fn new(level: LogLevel, name: String) -> Self {
        Logger {
            level,
            name,
            file: None,
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        self.file = Some(Mutex::new(BufWriter::new(file)));
        Ok(self)
    }

    /// Builds the logger described by `config`, or `None` if logging is
    /// disabled.
    pub fn from_config(config: &LoggerConfig, name: String) -> anyhow::Result<Option<Self>> {
        if !*config.get_enabled() {
            return Ok(None);
        }

        let logger = Logger::new(*config.get_log_level(), name);
        if !*config.get_log_file() {
            return Ok(Some(logger));
        }

        let path = format!(
            "./logs/analysis_run_{}.txt",
            Local::now().format("%Y-%m-%d_%H-%M-%S")
        );
        logger.with_file(path).map(Some)
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        self.write_to_file(&format!("[{}] {}: {}", level.plain_tag(), self.name, message));

        if level.passes(&self.level) {
            eprintln!(
                "[{}] {} {}",
                level.tag(),
                format!("{}:", self.name).dimmed(),
                message
            );
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn write_to_file(&self, line: &str) {
        let Some(file) = &self.file else {
            return;
        };

        // errors writing the log file are ignored
        if let Ok(mut writer) = file.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    pub fn object<'a>(&'a self, name: &'a str) -> ObjectBuilder<'a> {
        ObjectBuilder::new(name, self)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Some(file) = &self.file
            && let Ok(mut writer) = file.lock()
        {
            let _ = writer.flush();
        }
    }
}

/// Multi-line record of named fields, logged as one message.
#[derive(Debug, Clone)]
pub struct ObjectBuilder<'a> {
    logger: &'a Logger,
    name: &'a str,
    fields: Vec<(&'a str, String)>,
}

impl<'a> ObjectBuilder<'a> {
    fn new(name: &'a str, logger: &'a Logger) -> Self {
        ObjectBuilder {
            logger,
            name,
            fields: vec![],
        }
    }

    pub fn add_field(mut self, name: &'a str, value: impl Display) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    fn build(&self) -> String {
        let mut result = format!("{} {{", self.name);
        for (name, value) in &self.fields {
            result.push_str(&format!("\n  {}: {}", name, value));
        }
        result.push_str("\n}");
        result
    }

    pub fn log(&self, level: LogLevel) {
        self.logger.log(level, &self.build());
    }
}

#[test]
fn test_level_filter() {
    assert!(LogLevel::Error.passes(&LogLevel::Warn));
    assert!(LogLevel::Warn.passes(&LogLevel::Warn));
    assert!(!LogLevel::Info.passes(&LogLevel::Warn));
    assert!(LogLevel::Debug.passes(&LogLevel::Debug));
}

#[test]
fn test_level_from_str() {
    assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert_eq!("dbg".parse::<LogLevel>(), Ok(LogLevel::Debug));
    assert!("verbose".parse::<LogLevel>().is_err());
}

#[test]
fn test_object_builder() {
    let logger = Logger::new(LogLevel::Error, "test".to_string());
    let record = logger
        .object("AnalysisResult")
        .add_field("bounded", true)
        .add_field("nodes", 2);

    assert_eq!(
        record.build(),
        "AnalysisResult {\n  bounded: true\n  nodes: 2\n}"
    );
}
