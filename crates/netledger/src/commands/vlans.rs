//! VLAN command handlers.

use netledger_core::{InventoryStore, NewVlan, Vlan, VlanUpdate};
use tabled::Tabled;

use crate::cli::{GlobalOpts, VlansArgs, VlansCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "Tag")]
    tag: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Vlan> for VlanRow {
    fn from(v: &Vlan) -> Self {
        Self {
            tag: v.vlan_id,
            name: v.name.clone(),
            description: v.description.clone(),
            created: util::when(v.created_at),
        }
    }
}

fn detail(v: &Vlan) -> String {
    output::detail_lines(&[
        ("ID", v.id.to_string()),
        ("Tag", v.vlan_id.to_string()),
        ("Name", v.name.clone()),
        ("Description", v.description.clone()),
        ("Created", util::when(v.created_at)),
        ("Updated", util::when(v.updated_at)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &InventoryStore, args: VlansArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        VlansCommand::List => {
            let snap = store.snapshot();
            let vlans: Vec<&Vlan> = snap.vlans().collect();
            let out = output::render_list(
                global.format(),
                &vlans,
                |v| VlanRow::from(*v),
                |v| v.vlan_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VlansCommand::Get { vlan } => {
            let snap = store.snapshot();
            let found = util::resolve_vlan(&snap, &vlan)?;
            let out = output::render_single(global.format(), found, detail, |v| v.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VlansCommand::Add {
            tag,
            name,
            description,
        } => {
            let created = store.add_vlan(NewVlan {
                vlan_id: tag,
                name,
                description,
            })?;
            output::notice(&format!("Created {}", created.label()), global.quiet);
            Ok(())
        }

        VlansCommand::Update {
            vlan,
            tag,
            name,
            description,
        } => {
            let id = util::resolve_vlan(&store.snapshot(), &vlan)?.id.clone();
            let updated = store.update_vlan(
                &id,
                VlanUpdate {
                    vlan_id: tag,
                    name,
                    description,
                },
            )?;
            output::notice(&format!("Updated {}", updated.label()), global.quiet);
            Ok(())
        }

        VlansCommand::Delete { vlan } => {
            let (id, label) = {
                let snap = store.snapshot();
                let found = util::resolve_vlan(&snap, &vlan)?;
                (found.id.clone(), found.label())
            };
            if !util::confirm(&format!("Delete {label}?"), "vlans delete", global.yes)? {
                return Ok(());
            }
            let removal = store
                .delete_vlan(&id)
                .ok_or_else(|| CliError::not_found("VLAN", &vlan))?;
            output::notice(
                &format!(
                    "Deleted {label}; detached {} device(s), {} address(es), {} range(s)",
                    removal.devices, removal.ip_addresses, removal.ip_ranges
                ),
                global.quiet,
            );
            Ok(())
        }
    }
}
