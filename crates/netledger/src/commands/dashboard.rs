//! Dashboard: assigned devices followed by unbound addresses.

use netledger_core::view::{self, DashboardFilter, DashboardRow, SortDirection, SortField};
use netledger_core::{Inventory, InventoryStore};
use tabled::Tabled;

use crate::cli::{DashboardFilterArgs, GlobalOpts, SortArg};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Switch")]
    switch: String,
    #[tabled(rename = "Assigned")]
    assigned: String,
}

fn row(r: &DashboardRow, color: bool) -> Row {
    Row {
        ip: r.ip_address.to_string(),
        device: r.device_name.clone(),
        location: r.location.clone(),
        vlan: r.vlan_label().unwrap_or_else(|| "-".into()),
        status: output::status_cell(r.status, color),
        switch: util::or_dash(r.switch_ip),
        assigned: util::maybe_when(r.assigned_at),
    }
}

fn sort_field(arg: SortArg) -> SortField {
    match arg {
        SortArg::Ip => SortField::Ip,
        SortArg::Device => SortField::Device,
        SortArg::Location => SortField::Location,
        SortArg::Vlan => SortField::Vlan,
        SortArg::Status => SortField::Status,
        SortArg::AssignedAt => SortField::AssignedAt,
        SortArg::SwitchIp => SortField::SwitchIp,
        SortArg::CreatedAt => SortField::CreatedAt,
    }
}

/// Build the filtered, sorted dashboard from CLI flags.
pub fn rows(inv: &Inventory, args: &DashboardFilterArgs) -> Result<Vec<DashboardRow>, CliError> {
    let filter = DashboardFilter {
        search: args.search.clone(),
        status: args.status.map(util::status),
        vlan: util::resolve_vlan_id(inv, args.vlan.as_deref())?,
    };
    let direction = if args.desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    Ok(view::dashboard(inv, &filter, sort_field(args.sort), direction))
}

pub fn handle(
    store: &InventoryStore,
    args: &DashboardFilterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snap = store.snapshot();
    let data = rows(&snap, args)?;
    let color = output::should_color(global.color_mode());
    let out = output::render_list(
        global.format(),
        &data,
        |r| row(r, color),
        |r| r.ip_address.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
