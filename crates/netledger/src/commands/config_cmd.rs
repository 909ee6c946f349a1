//! Config subcommand handlers.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// The effective settings, with defaults resolved.
#[derive(Serialize)]
struct ResolvedConfig {
    config_file: PathBuf,
    data_file: PathBuf,
    backup_dir: PathBuf,
    output: String,
    color: String,
}

impl ResolvedConfig {
    fn new(cfg: &Config, global: &GlobalOpts) -> Self {
        Self {
            config_file: config::config_path(),
            data_file: config::data_file(global, cfg),
            backup_dir: cfg.backup_dir_path(),
            output: cfg.output.clone(),
            color: cfg.color.clone(),
        }
    }
}

fn detail(c: &ResolvedConfig) -> String {
    output::detail_lines(&[
        ("config_file", c.config_file.display().to_string()),
        ("data_file", c.data_file.display().to_string()),
        ("backup_dir", c.backup_dir.display().to_string()),
        ("output", c.output.clone()),
        ("color", c.color.clone()),
    ])
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists (use --force to overwrite)", path.display()),
                });
            }
            config::save_config(&Config::default())?;
            output::notice(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let resolved = ResolvedConfig::new(&cfg, global);
            let out = output::render_single(global.format(), &resolved, detail, |c| {
                c.data_file.display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            cfg.set_value(&key, &value)?;
            config::save_config(&cfg)?;
            output::notice(&format!("Set {key}"), global.quiet);
            Ok(())
        }
    }
}
