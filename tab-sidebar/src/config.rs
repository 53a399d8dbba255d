use anyhow::Context;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};
use tab_sidebar_api::command::TabIndex;

/// Parses and returns the config file contents, or returns the default config if the file does not exist
pub fn load_config(path: &Path) -> anyhow::Result<SidebarConfig> {
    if !path.is_file() {
        return Ok(SidebarConfig::default());
    }

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let config: SidebarConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(config)
}

/// Parses a YAML config.  An empty document is the default config.
pub fn parse_config(yaml: &str) -> anyhow::Result<SidebarConfig> {
    if yaml.trim().is_empty() {
        return Ok(SidebarConfig::default());
    }

    let config = serde_yaml::from_str(yaml).context("failed to parse sidebar config")?;
    Ok(config)
}

/// Options that can be set in the sidebar config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarConfig {
    #[serde(default = "default_log_level")]
    pub log_level: LevelFilter,

    /// The capacity of the registry queue
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Where tabs are inserted in a window created by move-to-new-window
    #[serde(default)]
    pub new_window_index: TabIndex,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            event_capacity: default_event_capacity(),
            new_window_index: TabIndex::default(),
        }
    }
}

fn default_log_level() -> LevelFilter {
    LevelFilter::Info
}

fn default_event_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::{load_config, parse_config, SidebarConfig};
    use log::LevelFilter;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tab_sidebar_api::command::TabIndex;

    #[test]
    fn empty_is_default() {
        assert_eq!(SidebarConfig::default(), parse_config("").unwrap());
        assert_eq!(SidebarConfig::default(), parse_config("{}").unwrap());
    }

    #[test]
    fn partial_uses_defaults() {
        let config = parse_config("log_level: debug").unwrap();

        assert_eq!(LevelFilter::Debug, config.log_level);
        assert_eq!(256, config.event_capacity);
        assert_eq!(TabIndex::End, config.new_window_index);
    }

    #[test]
    fn new_window_index_at() {
        let config = parse_config("new_window_index:\n  at: 0\nevent_capacity: 16").unwrap();

        assert_eq!(TabIndex::At(0), config.new_window_index);
        assert_eq!(16, config.event_capacity);
    }

    #[test]
    fn invalid_is_error() {
        assert!(parse_config("event_capacity: many").is_err());
    }

    #[test]
    fn load_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("sidebar.yml")).unwrap();

        assert_eq!(SidebarConfig::default(), config);
    }

    #[test]
    fn load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level: warn").unwrap();
        writeln!(file, "new_window_index: end").unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(LevelFilter::Warn, config.log_level);
        assert_eq!(TabIndex::End, config.new_window_index);
    }
}
