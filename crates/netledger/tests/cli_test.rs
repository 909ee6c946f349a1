//! Integration tests for the `netledger` CLI binary.
//!
//! Every test points `--data-file` at a temp directory and the config
//! directories at a nonexistent path, so the user's real inventory and
//! configuration are never touched.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

// ── Helpers ─────────────────────────────────────────────────────────

const NOWHERE: &str = "/tmp/netledger-cli-test-nonexistent";

/// Build a command for the `netledger` binary with env isolation.
fn netledger_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("netledger");
    cmd.env("HOME", NOWHERE)
        .env("XDG_CONFIG_HOME", NOWHERE)
        .env("XDG_DATA_HOME", NOWHERE)
        .env_remove("NETLEDGER_DATA_FILE")
        .env_remove("NETLEDGER_OUTPUT")
        .env_remove("NETLEDGER_COLOR")
        .env_remove("NETLEDGER_BACKUP_DIR")
        .env_remove("RUST_LOG")
        .write_stdin("");
    cmd
}

/// A scratch inventory in its own temp directory.
struct Ledger {
    dir: tempfile::TempDir,
}

impl Ledger {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn state(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = netledger_cmd();
        cmd.arg("--data-file").arg(self.state());
        cmd
    }

    fn run(&self, args: &[&str]) {
        self.cmd().args(args).assert().success();
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).args(["-o", "json"]).output().unwrap();
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// VLAN 10 "Office" with 192.168.1.1-.5 on it.
    fn with_office(self) -> Self {
        self.run(&["vlans", "add", "--tag", "10", "--name", "Office"]);
        self.run(&[
            "ranges", "add", "--name", "Office LAN", "--start", "192.168.1.1", "--end",
            "192.168.1.5", "--vlan", "10",
        ]);
        self
    }
}

fn find_ip<'a>(ips: &'a Value, address: &str) -> &'a Value {
    ips.as_array()
        .unwrap()
        .iter()
        .find(|ip| ip["address"] == address)
        .unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = netledger_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    netledger_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("vlans")
            .and(predicate::str::contains("ranges"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("dashboard"))
            .and(predicate::str::contains("restore")),
    );
}

#[test]
fn test_version_flag() {
    netledger_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netledger"));
}

#[test]
fn test_completions_zsh() {
    netledger_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    let output = netledger_cmd()
        .args(["--output", "xml", "stats"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

// ── Allocation lifecycle ────────────────────────────────────────────

#[test]
fn test_empty_inventory_stats() {
    let ledger = Ledger::new();
    let stats = ledger.json(&["stats"]);
    assert_eq!(stats["devices"], 0);
    assert_eq!(stats["totalIps"], 0);
    assert!(!ledger.state().exists(), "read-only commands must not write");
}

#[test]
fn test_device_binding_lifecycle() {
    let ledger = Ledger::new().with_office();

    ledger.run(&[
        "devices", "add", "--name", "printer-2f", "--location", "Copy room", "--type",
        "printer", "--ip", "192.168.1.3",
    ]);
    let ips = ledger.json(&["ips", "list"]);
    let bound = find_ip(&ips, "192.168.1.3");
    assert_eq!(bound["status"], "assigned");
    let device = ledger.json(&["devices", "get", "printer-2f"]);
    assert_eq!(bound["deviceId"], device["id"]);

    ledger.run(&["--yes", "devices", "delete", "printer-2f"]);
    let ips = ledger.json(&["ips", "list"]);
    let released = find_ip(&ips, "192.168.1.3");
    assert_eq!(released["status"], "available");
    assert!(released["deviceId"].is_null());
    ledger.run(&["check"]);
}

#[test]
fn test_overlapping_range_is_a_conflict() {
    let ledger = Ledger::new().with_office();
    ledger
        .cmd()
        .args(["ranges", "add", "--name", "Overlap", "--cidr", "192.168.1.0/29"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("already exist in other ranges"));

    let ips = ledger.json(&["ips", "list"]);
    assert_eq!(ips.as_array().unwrap().len(), 5);
}

#[test]
fn test_unknown_device_is_not_found() {
    let ledger = Ledger::new();
    ledger
        .cmd()
        .args(["devices", "get", "ghost"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("devices list"));
}

#[test]
fn test_rejected_input_is_a_usage_error() {
    let ledger = Ledger::new().with_office();
    ledger
        .cmd()
        .args(["devices", "add", "--name", "cam", "--location", "", "--ip", "192.168.1.2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Location is required"));
    ledger
        .cmd()
        .args(["ips", "status", "192.168.1.2", "assigned"])
        .assert()
        .code(2);
}

#[test]
fn test_delete_vlan_detaches_references() {
    let ledger = Ledger::new().with_office();
    ledger.run(&[
        "devices", "add", "--name", "ap-1", "--location", "Hall", "--vlan", "10", "--ip",
        "192.168.1.1",
    ]);
    ledger.run(&["-y", "vlans", "delete", "10"]);

    assert!(ledger.json(&["devices", "get", "ap-1"])["vlanId"].is_null());
    assert!(ledger.json(&["ranges", "get", "Office LAN"])["vlanId"].is_null());
    let ips = ledger.json(&["ips", "list"]);
    assert!(ips.as_array().unwrap().iter().all(|ip| ip["vlanId"].is_null()));
}

#[test]
fn test_destructive_commands_need_yes_without_terminal() {
    let ledger = Ledger::new().with_office();
    ledger
        .cmd()
        .arg("clear")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
    assert_eq!(ledger.json(&["ips", "list"]).as_array().unwrap().len(), 5);
}

#[test]
fn test_reassign_and_unassign() {
    let ledger = Ledger::new().with_office();
    ledger.run(&["devices", "add", "--name", "nas", "--location", "Rack", "--ip", "192.168.1.4"]);
    ledger.run(&["ips", "assign", "192.168.1.5", "nas"]);

    let ips = ledger.json(&["ips", "list"]);
    assert_eq!(find_ip(&ips, "192.168.1.4")["status"], "available");
    assert_eq!(find_ip(&ips, "192.168.1.5")["status"], "assigned");
    assert_eq!(ledger.json(&["devices", "get", "nas"])["assignedIp"], "192.168.1.5");

    ledger.run(&["ips", "unassign", "192.168.1.5"]);
    assert!(ledger.json(&["devices", "get", "nas"])["assignedIp"].is_null());
    ledger.run(&["check"]);
}

// ── Import / export / backup ────────────────────────────────────────

#[test]
fn test_import_skips_duplicates() {
    let ledger = Ledger::new().with_office();
    ledger.run(&["devices", "add", "--name", "sw-3", "--location", "Closet"]);
    let csv = ledger.file("devices.csv");
    std::fs::write(
        &csv,
        "Device Name,Location,IP Address\n\
         sw-1,Closet,192.168.1.1\n\
         sw-2,Closet,192.168.1.2\n\
         SW-3,Closet,192.168.1.3\n\
         sw-4,Closet,10.9.9.9\n\
         sw-5,Closet,192.168.1.5\n",
    )
    .unwrap();

    let report = ledger.json(&["import", "devices", csv.to_str().unwrap(), "--vlan", "10"]);
    assert_eq!(report["imported"], 4);
    assert_eq!(report["skipped"], 1);

    let devices = ledger.json(&["devices", "list"]);
    assert_eq!(devices.as_array().unwrap().len(), 5);
    let ips = ledger.json(&["ips", "list"]);
    assert_eq!(find_ip(&ips, "10.9.9.9")["rangeId"], "manual-import");
}

#[test]
fn test_import_dry_run_changes_nothing() {
    let ledger = Ledger::new().with_office();
    let csv = ledger.file("devices.csv");
    std::fs::write(&csv, "name,location,ip\ncam,Lobby,192.168.1.2\n").unwrap();

    let report = ledger.json(&["import", "devices", csv.to_str().unwrap(), "--dry-run"]);
    assert_eq!(report["imported"], 1);
    assert_eq!(report["dryRun"], true);
    assert_eq!(ledger.json(&["devices", "list"]).as_array().unwrap().len(), 0);
}

#[test]
fn test_addresses_accept_leading_zeros() {
    let ledger = Ledger::new();
    ledger.run(&["ips", "add", "010.001.000.001"]);
    let ips = ledger.json(&["ips", "list"]);
    assert_eq!(ips.as_array().unwrap().len(), 1);
    assert_eq!(ips[0]["address"], "10.1.0.1");

    ledger.run(&["devices", "add", "--name", "hmi", "--location", "Line 2", "--ip", "10.1.0.01"]);
    assert_eq!(ledger.json(&["ips", "get", "010.1.0.1"])["status"], "assigned");
    assert_eq!(ledger.json(&["devices", "get", "10.01.0.1"])["name"], "hmi");

    ledger
        .cmd()
        .args(["ips", "add", "10.1.0.256"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a dotted-quad IPv4 address"));
}

#[test]
fn test_others_camera_and_duplicate_display() {
    let ledger = Ledger::new();
    ledger.run(&[
        "others", "add", "--name", "Lobby wall", "--display-ip", "10.8.0.1",
        "--controller-ip", "10.9.0.1", "--camera-ip", "10.7.0.1", "--location", "Lobby",
    ]);
    assert_eq!(ledger.json(&["others", "get", "Lobby wall"])["cameraIp"], "10.7.0.1");

    ledger
        .cmd()
        .args([
            "others", "add", "--name", "Copy", "--display-ip", "10.8.0.1", "--controller-ip",
            "10.9.0.2", "--location", "Hall",
        ])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Display IP 10.8.0.1 already exists"));

    ledger.run(&["others", "update", "Lobby wall", "--no-camera-ip"]);
    assert!(ledger.json(&["others", "get", "Lobby wall"])["cameraIp"].is_null());
}

#[test]
fn test_import_and_export_others() {
    let ledger = Ledger::new();
    ledger.run(&[
        "others", "add", "--name", "Existing", "--display-ip", "10.8.0.1", "--controller-ip",
        "10.9.0.1", "--location", "Lobby",
    ]);
    let csv = ledger.file("others.csv");
    std::fs::write(
        &csv,
        "Name,Display IP,Controller IP,Location,Camera IP\n\
         Wall A,10.8.0.1,10.9.0.1,Atrium,-\n\
         Wall B,10.8.0.2,10.9.0.1,Atrium,10.7.0.2\n\
         Wall C,10.8.0.3,not-an-ip,Atrium,-\n",
    )
    .unwrap();

    let report = ledger.json(&["import", "others", csv.to_str().unwrap()]);
    assert_eq!(report["imported"], 1);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["invalidRows"].as_array().unwrap().len(), 1);
    assert_eq!(ledger.json(&["others", "list"]).as_array().unwrap().len(), 2);

    ledger
        .cmd()
        .args(["export", "others"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("Name,Display IP,Controller IP,Camera IP")
                .and(predicate::str::contains("Wall B,10.8.0.2,10.9.0.1,10.7.0.2,Atrium")),
        );
}

#[test]
fn test_export_devices_csv() {
    let ledger = Ledger::new().with_office();
    ledger.run(&[
        "devices", "add", "--name", "kiosk", "--location", "Lobby, east", "--vlan", "10",
    ]);
    ledger
        .cmd()
        .args(["export", "devices"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("Name,Location,VLAN,IP Address")
                .and(predicate::str::contains("\"Lobby, east\""))
                .and(predicate::str::contains("VLAN 10 - Office")),
        );
}

#[test]
fn test_backup_then_restore() {
    let ledger = Ledger::new().with_office();
    ledger.run(&["devices", "add", "--name", "gw", "--location", "Core", "--ip", "192.168.1.1"]);
    ledger.run(&["ips", "status", "192.168.1.5", "reserved"]);
    let backup = ledger.file("backup.json");
    ledger.run(&["backup", "--out", backup.to_str().unwrap()]);

    ledger.run(&["--yes", "clear"]);
    assert_eq!(ledger.json(&["stats"])["totalIps"], 0);

    let report = ledger.json(&["--yes", "restore", backup.to_str().unwrap()]);
    assert_eq!(report["vlans"], 1);
    assert_eq!(report["devices"], 1);

    let ips = ledger.json(&["ips", "list"]);
    assert_eq!(ips.as_array().unwrap().len(), 5);
    assert_eq!(find_ip(&ips, "192.168.1.1")["status"], "assigned");
    assert_eq!(find_ip(&ips, "192.168.1.5")["status"], "reserved");
    ledger.run(&["check"]);
}

#[test]
fn test_restore_rejects_malformed_backup() {
    let ledger = Ledger::new();
    let bogus = ledger.file("bogus.json");
    std::fs::write(&bogus, r#"{"version": 1, "data": {"devices": []}}"#).unwrap();
    ledger
        .cmd()
        .args(["--yes", "restore", bogus.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid backup file"));
}

// ── Config ──────────────────────────────────────────────────────────

fn config_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = netledger_cmd();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join("config"));
    cmd
}

#[test]
fn test_config_show_without_file() {
    netledger_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    config_cmd(home.path()).args(["config", "init"]).assert().success();
    config_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .code(2);
    config_cmd(home.path())
        .args(["config", "set", "output", "json"])
        .assert()
        .success();
    config_cmd(home.path())
        .args(["config", "set", "output", "xml"])
        .assert()
        .failure();

    let output = config_cmd(home.path())
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["output"], "json");
}
