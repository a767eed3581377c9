use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::parser::classify::{Classifier, RuleSpec, RuleTable, DEFAULT_WINDOW_CHARS};

/// Looked up in the working directory when no `--config` is given.
const DEFAULT_FILE: &str = "diario";

/// Layered settings: defaults, then config file, then `DIARIO_*` env vars
/// (`DIARIO_CLASSIFIER__WINDOW_CHARS=1000`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_window_chars")]
    pub window_chars: usize,
    /// Replaces the built-in table when non-empty. Order is priority order
    /// inside a tier.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        ClassifierSettings {
            window_chars: DEFAULT_WINDOW_CHARS,
            rules: Vec::new(),
        }
    }
}

fn default_window_chars() -> usize {
    DEFAULT_WINDOW_CHARS
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("DIARIO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("loading settings")?
            .try_deserialize()
            .context("invalid settings")
    }

    pub fn classifier(&self) -> Result<Classifier> {
        let window = self.classifier.window_chars;
        if window == 0 {
            bail!("classifier.window_chars must be positive");
        }
        let table = if self.classifier.rules.is_empty() {
            RuleTable::builtin()
        } else {
            RuleTable::from_specs(&self.classifier.rules).context("building classifier rules")?
        };
        Ok(Classifier::new(table, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classify::MovementType;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.classifier.window_chars, DEFAULT_WINDOW_CHARS);
        let c = s.classifier().unwrap();
        assert_eq!(c.table().rules().len(), RuleTable::builtin().rules().len());
    }

    #[test]
    fn file_overrides_rules_and_window() {
        let s = Settings::load(Some(Path::new("tests/fixtures/diario.toml"))).unwrap();
        assert_eq!(s.classifier.window_chars, 800);
        assert_eq!(s.classifier.rules.len(), 3);

        let c = s.classifier().unwrap();
        assert_eq!(c.window_chars(), 800);
        assert_eq!(c.classify("Sentença de mérito. Intimação."), MovementType::Intimacao);
        assert_eq!(c.classify("Edital de intimação"), MovementType::EditalDeIntimacao);
    }

    #[test]
    fn missing_explicit_file_fails() {
        assert!(Settings::load(Some(Path::new("tests/fixtures/absent.toml"))).is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let mut s = Settings::default();
        s.classifier.window_chars = 0;
        assert!(s.classifier().is_err());
    }
}
