//! IP address command handlers.

use netledger_core::{Inventory, InventoryStore, IpAddress, RangeRef};
use tabled::Tabled;

use crate::cli::{GlobalOpts, IpsArgs, IpsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn range_name(inv: &Inventory, range: &RangeRef) -> String {
    match range {
        RangeRef::Range(id) => inv
            .ip_range(id)
            .map_or_else(|| id.to_string(), |r| r.name.clone()),
        RangeRef::Manual => "Manual".into(),
        RangeRef::ManualImport => "Manual (import)".into(),
    }
}

fn device_name(inv: &Inventory, ip: &IpAddress) -> String {
    util::or_dash(
        ip.device_id
            .as_ref()
            .and_then(|id| inv.device(id))
            .map(|d| &d.name),
    )
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct IpRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Assigned")]
    assigned: String,
}

fn row(inv: &Inventory, ip: &IpAddress, color: bool) -> IpRow {
    IpRow {
        address: ip.address.to_string(),
        status: output::status_cell(ip.status, color),
        device: device_name(inv, ip),
        range: range_name(inv, &ip.range_id),
        vlan: util::vlan_label(inv, ip.vlan_id.as_ref()),
        assigned: util::maybe_when(ip.assigned_at),
    }
}

fn detail(inv: &Inventory, ip: &IpAddress) -> String {
    output::detail_lines(&[
        ("ID", ip.id.to_string()),
        ("Address", ip.address.to_string()),
        ("Status", ip.status.to_string()),
        ("Device", device_name(inv, ip)),
        ("Range", range_name(inv, &ip.range_id)),
        ("VLAN", util::vlan_label(inv, ip.vlan_id.as_ref())),
        ("Assigned", util::maybe_when(ip.assigned_at)),
        ("Created", util::when(ip.created_at)),
        ("Updated", util::when(ip.updated_at)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(store: &InventoryStore, args: IpsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        IpsCommand::List {
            range,
            status,
            vlan,
        } => {
            let snap = store.snapshot();
            let range_id = range
                .as_deref()
                .map(|r| util::resolve_range(&snap, r).map(|r| r.id.clone()))
                .transpose()?;
            let vlan_id = util::resolve_vlan_id(&snap, vlan.as_deref())?;
            let status = status.map(util::status);

            let ips: Vec<&IpAddress> = snap
                .ip_addresses()
                .filter(|ip| range_id.is_none() || ip.range_id.range_id() == range_id.as_ref())
                .filter(|ip| status.is_none_or(|s| ip.status == s))
                .filter(|ip| vlan_id.is_none() || ip.vlan_id == vlan_id)
                .collect();

            let color = output::should_color(global.color_mode());
            let out = output::render_list(
                global.format(),
                &ips,
                |ip| row(&snap, ip, color),
                |ip| ip.address.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IpsCommand::Get { ip } => {
            let snap = store.snapshot();
            let found = util::resolve_ip(&snap, &ip)?;
            let out = output::render_single(
                global.format(),
                found,
                |ip| detail(&snap, ip),
                |ip| ip.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IpsCommand::Add { address, vlan } => {
            let vlan_id = util::resolve_vlan_id(&store.snapshot(), vlan.as_deref())?;
            let manual = store.add_manual_ip(address, vlan_id)?;
            let message = if manual.created {
                format!("Now tracking {address}")
            } else {
                format!("{address} is already tracked")
            };
            output::notice(&message, global.quiet);
            Ok(())
        }

        IpsCommand::Status { ip, status } => {
            let id = util::resolve_ip(&store.snapshot(), &ip)?.id.clone();
            let updated = store.update_ip_status(&id, util::status(status))?;
            output::notice(
                &format!("{} is now {}", updated.address, updated.status),
                global.quiet,
            );
            Ok(())
        }

        IpsCommand::Assign { ip, device } => {
            let (ip_id, device_id, device_name) = {
                let snap = store.snapshot();
                let found = util::resolve_device(&snap, &device)?;
                (
                    util::resolve_ip(&snap, &ip)?.id.clone(),
                    found.id.clone(),
                    found.name.clone(),
                )
            };
            let bound = store.assign_ip_to_device(&ip_id, &device_id)?;
            output::notice(
                &format!("Assigned {} to {device_name}", bound.address),
                global.quiet,
            );
            Ok(())
        }

        IpsCommand::Unassign { ip } => {
            let (id, address) = {
                let snap = store.snapshot();
                let found = util::resolve_ip(&snap, &ip)?;
                (found.id.clone(), found.address)
            };
            let message = if store.unassign_ip(&id)? {
                format!("Released {address}")
            } else {
                format!("{address} was not assigned")
            };
            output::notice(&message, global.quiet);
            Ok(())
        }
    }
}
