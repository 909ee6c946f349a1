//! Clap derive structures for the `netledger` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap, clap_complete and netledger-core's address
//! parser so build.rs can include it.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// IPv4 value parser. Unlike `Ipv4Addr::from_str` it accepts leading
/// zeros, so `010.001.000.001` means `10.1.0.1`.
pub fn parse_ip(raw: &str) -> Result<Ipv4Addr, String> {
    netledger_core::addr::parse_ipv4(raw.trim())
        .ok_or_else(|| format!("'{raw}' is not a dotted-quad IPv4 address"))
}

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netledger -- inventory of VLANs, IP ranges, addresses and devices
#[derive(Debug, Parser)]
#[command(
    name = "netledger",
    version,
    about = "Track IP allocations, devices and VLANs from the command line",
    long_about = "Keeps a local inventory of VLANs, IP ranges, the addresses they contain\n\
        and the devices bound to them. Every change is applied atomically and\n\
        written back to a JSON state file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// State file to read and write
    #[arg(long, short = 'f', env = "NETLEDGER_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Output format [default: table, or `output` from the config file]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

impl GlobalOpts {
    pub fn format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }

    pub fn color_mode(&self) -> &ColorMode {
        self.color.as_ref().unwrap_or(&ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Available,
    Assigned,
    Reserved,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage VLANs
    #[command(alias = "vlan")]
    Vlans(VlansArgs),

    /// Manage IP ranges
    #[command(alias = "range")]
    Ranges(RangesArgs),

    /// Manage individual IP addresses
    #[command(alias = "ip")]
    Ips(IpsArgs),

    /// Manage devices and their address bindings
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage auxiliary equipment (displays, controllers)
    #[command(alias = "other")]
    Others(OthersArgs),

    /// Show assigned devices and unbound addresses in one view
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Summary counts
    Stats,

    /// Import devices from a CSV table
    Import(ImportArgs),

    /// Export a table as CSV
    Export(ExportArgs),

    /// Write a JSON backup of the inventory
    Backup(BackupArgs),

    /// Replace the inventory with the contents of a backup
    Restore(RestoreArgs),

    /// Delete all VLANs, ranges, addresses and devices
    Clear,

    /// Verify device and address bindings agree
    Check,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VLANS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VlansArgs {
    #[command(subcommand)]
    pub command: VlansCommand,
}

#[derive(Debug, Subcommand)]
pub enum VlansCommand {
    /// List VLANs
    #[command(alias = "ls")]
    List,

    /// Show one VLAN
    Get {
        /// VLAN tag or ID
        vlan: String,
    },

    /// Create a VLAN
    Add {
        /// Numeric tag (1-4094)
        #[arg(long)]
        tag: u16,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Change a VLAN's tag, name or description
    Update {
        /// VLAN tag or ID
        vlan: String,

        #[arg(long)]
        tag: Option<u16>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a VLAN and detach everything that referenced it
    #[command(alias = "rm")]
    Delete {
        /// VLAN tag or ID
        vlan: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RANGES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RangesArgs {
    #[command(subcommand)]
    pub command: RangesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RangesCommand {
    /// List ranges with address usage
    #[command(alias = "ls")]
    List,

    /// Show one range
    Get {
        /// Range name or ID
        range: String,
    },

    /// Create a range and one available address per host in it
    Add {
        #[arg(long)]
        name: String,

        /// Block in CIDR notation, e.g. 192.168.1.0/24
        #[arg(long, conflicts_with_all = ["start", "end"], required_unless_present = "start")]
        cidr: Option<String>,

        /// First address of the range
        #[arg(long, requires = "end", value_parser = parse_ip)]
        start: Option<Ipv4Addr>,

        /// Last address of the range
        #[arg(long, requires = "start", value_parser = parse_ip)]
        end: Option<Ipv4Addr>,

        /// VLAN tag or ID the addresses belong to
        #[arg(long)]
        vlan: Option<String>,
    },

    /// Delete a range and all of its addresses
    #[command(alias = "rm")]
    Delete {
        /// Range name or ID
        range: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  IP ADDRESSES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IpsArgs {
    #[command(subcommand)]
    pub command: IpsCommand,
}

#[derive(Debug, Subcommand)]
pub enum IpsCommand {
    /// List addresses
    #[command(alias = "ls")]
    List {
        /// Only addresses of this range (name or ID)
        #[arg(long)]
        range: Option<String>,

        #[arg(long)]
        status: Option<StatusArg>,

        /// VLAN tag or ID
        #[arg(long)]
        vlan: Option<String>,
    },

    /// Show one address
    Get {
        /// Dotted-quad address or ID
        ip: String,
    },

    /// Track an address outside any range
    Add {
        #[arg(value_parser = parse_ip)]
        address: Ipv4Addr,

        /// VLAN tag or ID
        #[arg(long)]
        vlan: Option<String>,
    },

    /// Set an address available or reserved
    Status {
        /// Dotted-quad address or ID
        ip: String,

        status: StatusArg,
    },

    /// Bind an address to a device
    Assign {
        /// Dotted-quad address or ID
        ip: String,

        /// Device name, ID or current address
        device: String,
    },

    /// Release an address from its device
    Unassign {
        /// Dotted-quad address or ID
        ip: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List,

    /// Show one device
    Get {
        /// Device name, ID or assigned address
        device: String,
    },

    /// Create a device, optionally bound to an address
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        location: String,

        /// pc, laptop, phone, tablet, server, router, switch, printer,
        /// camera, iot or other
        #[arg(long = "type", default_value = "other")]
        device_type: String,

        /// VLAN tag or ID
        #[arg(long)]
        vlan: Option<String>,

        #[arg(long)]
        mac: Option<String>,

        /// Address to bind; must already exist in a range
        #[arg(long, value_parser = parse_ip)]
        ip: Option<Ipv4Addr>,

        /// Upstream switch address
        #[arg(long, value_parser = parse_ip)]
        switch_ip: Option<Ipv4Addr>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Change a device; omitted fields stay as they are
    Update(DeviceUpdateArgs),

    /// Delete a device and release its address
    #[command(alias = "rm")]
    Delete {
        /// Device name, ID or assigned address
        device: String,
    },
}

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceUpdateArgs {
    /// Device name, ID or assigned address
    pub device: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long = "type")]
    pub device_type: Option<String>,

    /// VLAN tag or ID
    #[arg(long, conflicts_with = "no_vlan")]
    pub vlan: Option<String>,

    /// Detach from its VLAN
    #[arg(long)]
    pub no_vlan: bool,

    #[arg(long, conflicts_with = "no_mac")]
    pub mac: Option<String>,

    /// Remove the MAC address
    #[arg(long)]
    pub no_mac: bool,

    /// Move the binding to this address
    #[arg(long, conflicts_with = "no_ip", value_parser = parse_ip)]
    pub ip: Option<Ipv4Addr>,

    /// Release the bound address
    #[arg(long)]
    pub no_ip: bool,

    #[arg(long, conflicts_with = "no_switch_ip", value_parser = parse_ip)]
    pub switch_ip: Option<Ipv4Addr>,

    #[arg(long)]
    pub no_switch_ip: bool,

    #[arg(long)]
    pub notes: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OTHER DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OthersArgs {
    #[command(subcommand)]
    pub command: OthersCommand,
}

#[derive(Debug, Subcommand)]
pub enum OthersCommand {
    /// List auxiliary equipment
    #[command(alias = "ls")]
    List,

    /// Show one entry
    Get {
        /// Name or ID
        other: String,
    },

    /// Add an entry
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, value_parser = parse_ip)]
        display_ip: Ipv4Addr,

        #[arg(long, value_parser = parse_ip)]
        controller_ip: Ipv4Addr,

        /// Camera paired with the display, if any
        #[arg(long, value_parser = parse_ip)]
        camera_ip: Option<Ipv4Addr>,

        #[arg(long)]
        location: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Change an entry
    Update {
        /// Name or ID
        other: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = parse_ip)]
        display_ip: Option<Ipv4Addr>,

        #[arg(long, value_parser = parse_ip)]
        controller_ip: Option<Ipv4Addr>,

        #[arg(long, conflicts_with = "no_camera_ip", value_parser = parse_ip)]
        camera_ip: Option<Ipv4Addr>,

        /// Remove the camera address
        #[arg(long)]
        no_camera_ip: bool,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Name or ID
        other: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DASHBOARD / IMPORT / EXPORT / BACKUP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Dashboard filters, shared with `export dashboard`.
#[derive(Debug, Clone, Args)]
pub struct DashboardFilterArgs {
    /// Match address, switch address, device name or location
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long)]
    pub status: Option<StatusArg>,

    /// VLAN tag or ID
    #[arg(long)]
    pub vlan: Option<String>,

    #[arg(long, value_enum, default_value = "ip")]
    pub sort: SortArg,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Ip,
    Device,
    Location,
    Vlan,
    Status,
    AssignedAt,
    SwitchIp,
    CreatedAt,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub filter: DashboardFilterArgs,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(subcommand)]
    pub table: ImportTable,

    /// Report what would happen without changing anything
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum ImportTable {
    /// Devices from a CSV with device name, location and IP columns
    Devices {
        file: PathBuf,

        /// VLAN tag or ID for every imported device
        #[arg(long)]
        vlan: Option<String>,
    },
    /// Auxiliary equipment from a CSV with Name, Display IP, Controller IP,
    /// Location and optional Camera IP columns
    Others { file: PathBuf },
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub table: ExportTable,

    /// Write to this file instead of stdout
    #[arg(long, short = 'O', global = true)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ExportTable {
    /// Every device
    Devices,
    /// Every tracked address
    Ips,
    /// Every VLAN
    Vlans,
    /// The auxiliary equipment catalog
    Others,
    /// The (filtered) dashboard
    Dashboard(DashboardFilterArgs),
}

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Output file [default: netledger-backup-<date>.json in backup_dir]
    #[arg(long, short = 'O')]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Backup file written by `netledger backup`
    pub file: PathBuf,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// data_file, backup_dir, output or color
        key: String,

        /// Value to set (empty clears a path)
        value: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
