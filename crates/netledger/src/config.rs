//! CLI configuration -- thin wrapper around `netledger_config`.
//!
//! Re-exports the shared types and folds config-file defaults into
//! `GlobalOpts` where no flag was given.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::warn;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

// ── Re-exports from shared crate ────────────────────────────────────

pub use netledger_config::{
    Config, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill `--output` and `--color` from the config when not given.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = parse_enum::<OutputFormat>("output", &cfg.output);
    }
    if global.color.is_none() {
        global.color = parse_enum::<ColorMode>("color", &cfg.color);
    }
}

fn parse_enum<T: ValueEnum>(key: &str, value: &str) -> Option<T> {
    match T::from_str(value, true) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, value, error = %e, "ignoring config value");
            None
        }
    }
}

/// State file location: flag or env > config file > platform default.
pub fn data_file(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global
        .data_file
        .clone()
        .unwrap_or_else(|| cfg.data_file_path())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    #[test]
    fn config_fills_unset_flags_only() {
        let mut cli = Cli::try_parse_from(["netledger", "--color", "never", "stats"]).unwrap();
        let cfg = Config {
            output: "yaml".into(),
            color: "always".into(),
            ..Config::default()
        };
        apply_defaults(&mut cli.global, &cfg);
        assert_eq!(cli.global.format(), &OutputFormat::Yaml);
        assert_eq!(cli.global.color_mode(), &ColorMode::Never);
    }

    #[test]
    fn data_file_flag_wins_over_config() {
        let cli =
            Cli::try_parse_from(["netledger", "--data-file", "/tmp/a.json", "stats"]).unwrap();
        let cfg = Config {
            data_file: Some("/tmp/b.json".into()),
            ..Config::default()
        };
        assert_eq!(data_file(&cli.global, &cfg), PathBuf::from("/tmp/a.json"));
    }

    #[test]
    fn json_compact_from_config_parses() {
        let mut cli = Cli::try_parse_from(["netledger", "stats"]).unwrap();
        let cfg = Config {
            output: "json-compact".into(),
            ..Config::default()
        };
        apply_defaults(&mut cli.global, &cfg);
        assert_eq!(cli.global.format(), &OutputFormat::JsonCompact);
    }
}
