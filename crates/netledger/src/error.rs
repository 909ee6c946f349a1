//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use netledger_config::ConfigError;
use netledger_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netledger::not_found),
        help("Run: netledger {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(netledger::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(code(netledger::rejected))]
    Rejected { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netledger::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(netledger::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Files ────────────────────────────────────────────────────────

    #[error("Could not access state file {path}: {reason}")]
    #[diagnostic(
        code(netledger::persistence),
        help("Point --data-file (or data_file in the config) at a writable location.")
    )]
    Persistence { path: String, reason: String },

    #[error("Invalid backup file: {message}")]
    #[diagnostic(
        code(netledger::backup),
        help("Backups are JSON documents written by: netledger backup")
    )]
    Backup { message: String },

    #[error("Import failed: {message}")]
    #[diagnostic(
        code(netledger::import),
        help("The first row must name the Device Name, Location and IP Address columns.")
    )]
    Import { message: String },

    #[error("{count} consistency problem(s) found")]
    #[diagnostic(code(netledger::inconsistent))]
    Inconsistent { count: usize },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(netledger::config),
        help("Inspect the file with: netledger config show")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(netledger::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    #[diagnostic(code(netledger::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(netledger::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Rejected { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn not_found(resource_type: &str, identifier: &str) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: format!("{} list", list_command_for(resource_type)),
        }
    }
}

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type.to_ascii_lowercase().as_str() {
        "vlan" => "vlans",
        "range" | "ip range" => "ranges",
        "ip address" | "address" => "ips",
        "other device" => "others",
        _ => "devices",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Rejected { message },
            CoreError::Conflict { message } => CliError::Conflict { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::not_found(&entity_type, &identifier),
            CoreError::Persistence { path, reason } => CliError::Persistence { path, reason },
            CoreError::Backup { message } => CliError::Backup { message },
            CoreError::Import { message } => CliError::Import { message },
            CoreError::Csv(e) => CliError::Import {
                message: e.to_string(),
            },
            CoreError::Json(e) => CliError::Json(e),
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::Validation {
                    message: "Location is required".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Conflict {
                    message: "VLAN 10 already exists".into(),
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::NotFound {
                    entity_type: "Device".into(),
                    identifier: "d1".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (CoreError::Internal("boom".into()), exit_code::GENERAL),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn not_found_points_at_list_command() {
        let CliError::NotFound { list_command, .. } = CliError::not_found("VLAN", "42") else {
            panic!("expected NotFound");
        };
        assert_eq!(list_command, "vlans list");
    }

    #[test]
    fn core_messages_pass_through_verbatim() {
        let err = CliError::from(CoreError::Conflict {
            message: "A device with this MAC address already exists".into(),
        });
        assert_eq!(err.to_string(), "A device with this MAC address already exists");
    }
}
