//! Auxiliary equipment command handlers.

use netledger_core::{InventoryStore, NewOtherDevice, OtherDevice, OtherDeviceUpdate};
use tabled::Tabled;

use crate::cli::{GlobalOpts, OthersArgs, OthersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct OtherRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display IP")]
    display_ip: String,
    #[tabled(rename = "Controller IP")]
    controller_ip: String,
    #[tabled(rename = "Camera IP")]
    camera_ip: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&OtherDevice> for OtherRow {
    fn from(o: &OtherDevice) -> Self {
        Self {
            name: o.name.clone(),
            display_ip: o.display_ip.to_string(),
            controller_ip: o.controller_ip.to_string(),
            camera_ip: util::or_dash(o.camera_ip),
            location: o.location.clone(),
            notes: o.notes.clone(),
        }
    }
}

fn detail(o: &OtherDevice) -> String {
    output::detail_lines(&[
        ("ID", o.id.to_string()),
        ("Name", o.name.clone()),
        ("Display IP", o.display_ip.to_string()),
        ("Controller IP", o.controller_ip.to_string()),
        ("Camera IP", util::or_dash(o.camera_ip)),
        ("Location", o.location.clone()),
        ("Notes", o.notes.clone()),
        ("Created", util::when(o.created_at)),
        ("Updated", util::when(o.updated_at)),
    ])
}

pub fn handle(store: &InventoryStore, args: OthersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        OthersCommand::List => {
            let snap = store.snapshot();
            let others: Vec<&OtherDevice> = snap.other_devices().collect();
            let out = output::render_list(
                global.format(),
                &others,
                |o| OtherRow::from(*o),
                |o| o.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OthersCommand::Get { other } => {
            let snap = store.snapshot();
            let found = util::resolve_other(&snap, &other)?;
            let out = output::render_single(global.format(), found, detail, |o| o.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OthersCommand::Add {
            name,
            display_ip,
            controller_ip,
            camera_ip,
            location,
            notes,
        } => {
            let created = store.add_other_device(NewOtherDevice {
                name,
                display_ip,
                controller_ip,
                camera_ip,
                location,
                notes,
            })?;
            output::notice(&format!("Added '{}'", created.name), global.quiet);
            Ok(())
        }

        OthersCommand::Update {
            other,
            name,
            display_ip,
            controller_ip,
            camera_ip,
            no_camera_ip,
            location,
            notes,
        } => {
            let id = util::resolve_other(&store.snapshot(), &other)?.id.clone();
            let camera_ip = if no_camera_ip {
                Some(None)
            } else {
                camera_ip.map(Some)
            };
            let updated = store.update_other_device(
                &id,
                OtherDeviceUpdate {
                    name,
                    display_ip,
                    controller_ip,
                    camera_ip,
                    location,
                    notes,
                },
            )?;
            output::notice(&format!("Updated '{}'", updated.name), global.quiet);
            Ok(())
        }

        OthersCommand::Delete { other } => {
            let (id, name) = {
                let snap = store.snapshot();
                let found = util::resolve_other(&snap, &other)?;
                (found.id.clone(), found.name.clone())
            };
            if !util::confirm(&format!("Delete '{name}'?"), "others delete", global.yes)? {
                return Ok(());
            }
            store
                .delete_other_device(&id)
                .ok_or_else(|| CliError::not_found("Other device", &other))?;
            output::notice(&format!("Deleted '{name}'"), global.quiet);
            Ok(())
        }
    }
}
