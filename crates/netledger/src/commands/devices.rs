//! Device command handlers.

use netledger_core::{Device, DeviceUpdate, Inventory, InventoryStore, NewDevice};
use tabled::Tabled;

use crate::cli::{DeviceUpdateArgs, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Switch")]
    switch: String,
}

fn row(inv: &Inventory, d: &Device) -> DeviceRow {
    DeviceRow {
        name: d.name.clone(),
        dtype: d.device_type.label().into(),
        location: d.location.clone(),
        ip: util::or_dash(d.assigned_ip),
        vlan: util::vlan_label(inv, d.vlan_id.as_ref()),
        mac: util::or_dash(d.mac_address.as_ref()),
        switch: util::or_dash(d.switch_ip),
    }
}

fn detail(inv: &Inventory, d: &Device) -> String {
    let mut pairs = vec![
        ("ID", d.id.to_string()),
        ("Name", d.name.clone()),
        ("Type", d.device_type.label().to_owned()),
        ("Location", d.location.clone()),
        ("IP", util::or_dash(d.assigned_ip)),
        ("VLAN", util::vlan_label(inv, d.vlan_id.as_ref())),
        ("MAC", util::or_dash(d.mac_address.as_ref())),
        ("Switch IP", util::or_dash(d.switch_ip)),
        ("Assigned", util::maybe_when(d.assigned_at)),
        ("Created", util::when(d.created_at)),
        ("Updated", util::when(d.updated_at)),
    ];
    if !d.notes.is_empty() {
        pairs.push(("Notes", d.notes.clone()));
    }
    output::detail_lines(&pairs)
}

/// Translate update flags into the tri-state update request.
fn update_request(inv: &Inventory, args: DeviceUpdateArgs) -> Result<DeviceUpdate, CliError> {
    let vlan_id = if args.no_vlan {
        Some(None)
    } else {
        util::resolve_vlan_id(inv, args.vlan.as_deref())?.map(Some)
    };
    Ok(DeviceUpdate {
        name: args.name,
        device_type: args
            .device_type
            .as_deref()
            .map(util::device_type)
            .transpose()?,
        location: args.location,
        vlan_id,
        mac_address: if args.no_mac {
            Some(None)
        } else {
            args.mac.map(Some)
        },
        assigned_ip: if args.no_ip {
            Some(None)
        } else {
            args.ip.map(Some)
        },
        switch_ip: if args.no_switch_ip {
            Some(None)
        } else {
            args.switch_ip.map(Some)
        },
        notes: args.notes,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(
    store: &InventoryStore,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let snap = store.snapshot();
            let devices: Vec<&Device> = snap.devices().collect();
            let out = output::render_list(
                global.format(),
                &devices,
                |d| row(&snap, d),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let snap = store.snapshot();
            let found = util::resolve_device(&snap, &device)?;
            let out = output::render_single(
                global.format(),
                found,
                |d| detail(&snap, d),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Add {
            name,
            location,
            device_type,
            vlan,
            mac,
            ip,
            switch_ip,
            notes,
        } => {
            let vlan_id = util::resolve_vlan_id(&store.snapshot(), vlan.as_deref())?;
            let created = store.add_device(NewDevice {
                name,
                device_type: util::device_type(&device_type)?,
                location,
                vlan_id,
                mac_address: mac,
                assigned_ip: ip,
                switch_ip,
                notes,
            })?;
            let message = match created.assigned_ip {
                Some(ip) => format!("Created device '{}' on {ip}", created.name),
                None => format!("Created device '{}'", created.name),
            };
            output::notice(&message, global.quiet);
            Ok(())
        }

        DevicesCommand::Update(update) => {
            let (id, request) = {
                let snap = store.snapshot();
                let id = util::resolve_device(&snap, &update.device)?.id.clone();
                (id, update_request(&snap, update)?)
            };
            let updated = store.update_device(&id, request)?;
            output::notice(&format!("Updated device '{}'", updated.name), global.quiet);
            Ok(())
        }

        DevicesCommand::Delete { device } => {
            let (id, name) = {
                let snap = store.snapshot();
                let found = util::resolve_device(&snap, &device)?;
                (found.id.clone(), found.name.clone())
            };
            if !util::confirm(&format!("Delete device '{name}'?"), "devices delete", global.yes)? {
                return Ok(());
            }
            let removed = store
                .delete_device(&id)
                .ok_or_else(|| CliError::not_found("Device", &device))?;
            let message = match removed.assigned_ip {
                Some(ip) => format!("Deleted device '{name}'; {ip} is available again"),
                None => format!("Deleted device '{name}'"),
            };
            output::notice(&message, global.quiet);
            Ok(())
        }
    }
}
