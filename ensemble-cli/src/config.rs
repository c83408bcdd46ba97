//! Configuration loading from ensemble.toml
//!
//! Ensemble configuration can be specified in an `ensemble.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use crate::runner::RunnerKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up by [`EnsembleConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "ensemble.toml";

/// Ensemble configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnsembleConfig {
    /// Suite discovery configuration
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where declaration files live and which ones to load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Directory scanned for declaration files
    #[serde(default = "default_tests_dir")]
    pub tests_dir: PathBuf,
    /// File loaded once before any declaration file
    #[serde(default)]
    pub setup_file: Option<PathBuf>,
    /// File-name glob selecting declaration files (`*` and `?` wildcards)
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            tests_dir: default_tests_dir(),
            setup_file: None,
            pattern: default_pattern(),
        }
    }
}

fn default_tests_dir() -> PathBuf {
    PathBuf::from("benches/suite")
}
fn default_pattern() -> String {
    "*.rs".to_string()
}

/// Runner configuration for group execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Isolation strategy: "process" or "thread"
    #[serde(default)]
    pub strategy: RunnerKind,
    /// How many times the built-in `run` command invokes each test
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            strategy: RunnerKind::default(),
            iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> u64 {
    1
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Print debug diagnostics
    #[serde(default)]
    pub verbose: bool,
}

impl EnsembleConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory.
    ///
    /// Relative paths in a discovered file are resolved against the file's directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path).ok().map(|c| c.relative_to(&dir));
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Resolve relative suite paths against `base`
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.suite.tests_dir.is_relative() {
            self.suite.tests_dir = base.join(&self.suite.tests_dir);
        }
        if let Some(setup) = self.suite.setup_file.as_mut() {
            if setup.is_relative() {
                *setup = base.join(&*setup);
            }
        }
        self
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Ensemble Configuration

[suite]
# Directory scanned for declaration files
tests_dir = "benches/suite"
# File loaded once before the declaration files (uncomment to enable)
# setup_file = "benches/suite/setup.rs"
# File-name pattern selecting declaration files
pattern = "*.rs"

[runner]
# Isolation strategy: "process" (fork per group) or "thread" (thread per group)
strategy = "process"
# Invocations of each test's work in `ensemble run`
iterations = 1

[output]
# Print debug diagnostics
verbose = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnsembleConfig::default();
        assert_eq!(config.suite.tests_dir, PathBuf::from("benches/suite"));
        assert_eq!(config.suite.pattern, "*.rs");
        assert!(config.suite.setup_file.is_none());
        assert_eq!(config.runner.strategy, RunnerKind::Process);
        assert_eq!(config.runner.iterations, 1);
        assert!(!config.output.verbose);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [suite]
            tests_dir = "bench"
            setup_file = "bench/setup.rs"

            [runner]
            strategy = "thread"
        "#;

        let config: EnsembleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.suite.tests_dir, PathBuf::from("bench"));
        assert_eq!(
            config.suite.setup_file,
            Some(PathBuf::from("bench/setup.rs"))
        );
        assert_eq!(config.runner.strategy, RunnerKind::Thread);
        // Defaults should still apply
        assert_eq!(config.suite.pattern, "*.rs");
        assert_eq!(config.runner.iterations, 1);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: EnsembleConfig = toml::from_str(&EnsembleConfig::default_toml()).unwrap();
        assert_eq!(config.suite.tests_dir, PathBuf::from("benches/suite"));
        assert_eq!(config.runner.strategy, RunnerKind::Process);
    }

    #[test]
    fn test_relative_to() {
        let mut config = EnsembleConfig::default();
        config.suite.setup_file = Some(PathBuf::from("setup.rs"));
        let config = config.relative_to(Path::new("/project"));
        assert_eq!(
            config.suite.tests_dir,
            PathBuf::from("/project/benches/suite")
        );
        assert_eq!(
            config.suite.setup_file,
            Some(PathBuf::from("/project/setup.rs"))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[output]\nverbose = true\n").unwrap();

        let config = EnsembleConfig::load(&path).unwrap();
        assert!(config.output.verbose);
    }
}
