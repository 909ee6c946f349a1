//! IP range command handlers.

use netledger_core::addr::{self, MAX_RANGE_ADDRESSES};
use netledger_core::view::RangeUsage;
use netledger_core::{Inventory, InventoryStore, IpRange, NewIpRange, RangeBounds};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, RangesArgs, RangesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// A range together with its address usage.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeView<'a> {
    #[serde(flatten)]
    range: &'a IpRange,
    usage: RangeUsage,
    #[serde(skip)]
    vlan: String,
}

impl<'a> RangeView<'a> {
    fn new(inv: &Inventory, range: &'a IpRange) -> Self {
        Self {
            range,
            usage: RangeUsage::of(inv, range),
            vlan: util::vlan_label(inv, range.vlan_id.as_ref()),
        }
    }
}

/// Stored CIDR, or the `~`-prefixed approximation for start/end ranges.
fn cidr_display(range: &IpRange) -> String {
    match &range.cidr {
        Some(cidr) => cidr.clone(),
        None => addr::calculate_cidr(range.start_ip, range.end_ip)
            .map_or_else(|| "-".into(), |c| format!("~{c}")),
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RangeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "CIDR")]
    cidr: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Available")]
    available: usize,
    #[tabled(rename = "Assigned")]
    assigned: usize,
    #[tabled(rename = "Reserved")]
    reserved: usize,
}

impl From<&RangeView<'_>> for RangeRow {
    fn from(v: &RangeView<'_>) -> Self {
        Self {
            name: v.range.name.clone(),
            start: v.range.start_ip.to_string(),
            end: v.range.end_ip.to_string(),
            cidr: cidr_display(v.range),
            vlan: v.vlan.clone(),
            total: v.usage.total,
            available: v.usage.available,
            assigned: v.usage.assigned,
            reserved: v.usage.reserved,
        }
    }
}

fn detail(v: &RangeView<'_>) -> String {
    output::detail_lines(&[
        ("ID", v.range.id.to_string()),
        ("Name", v.range.name.clone()),
        ("Start", v.range.start_ip.to_string()),
        ("End", v.range.end_ip.to_string()),
        ("CIDR", cidr_display(v.range)),
        ("VLAN", v.vlan.clone()),
        (
            "Addresses",
            format!(
                "{} total, {} available, {} assigned, {} reserved",
                v.usage.total, v.usage.available, v.usage.assigned, v.usage.reserved
            ),
        ),
        ("Created", util::when(v.range.created_at)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    store: &InventoryStore,
    args: RangesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RangesCommand::List => {
            let snap = store.snapshot();
            let views: Vec<RangeView<'_>> =
                snap.ip_ranges().map(|r| RangeView::new(&snap, r)).collect();
            let out = output::render_list(
                global.format(),
                &views,
                |v| RangeRow::from(v),
                |v| v.range.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RangesCommand::Get { range } => {
            let snap = store.snapshot();
            let view = RangeView::new(&snap, util::resolve_range(&snap, &range)?);
            let out = output::render_single(global.format(), &view, detail, |v| {
                v.range.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RangesCommand::Add {
            name,
            cidr,
            start,
            end,
            vlan,
        } => {
            let bounds = match (cidr, start, end) {
                (Some(cidr), _, _) => RangeBounds::Cidr(cidr),
                (None, Some(start), Some(end)) => RangeBounds::StartEnd { start, end },
                _ => {
                    return Err(CliError::Validation {
                        field: "range".into(),
                        reason: "give either --cidr or both --start and --end".into(),
                    });
                }
            };
            let vlan_id = util::resolve_vlan_id(&store.snapshot(), vlan.as_deref())?;
            let created = store.add_ip_range(NewIpRange {
                name,
                bounds,
                vlan_id,
            })?;
            output::notice(
                &format!(
                    "Created range '{}' with {} address(es)",
                    created.range.name, created.count
                ),
                global.quiet,
            );
            if created.truncated {
                output::notice(
                    &format!(
                        "warning: range spans {} addresses; only the first {MAX_RANGE_ADDRESSES} were generated",
                        created.requested
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        RangesCommand::Delete { range } => {
            let (id, name, count) = {
                let snap = store.snapshot();
                let found = util::resolve_range(&snap, &range)?;
                (
                    found.id.clone(),
                    found.name.clone(),
                    snap.ips_by_range(&found.id).count(),
                )
            };
            if !util::confirm(
                &format!("Delete range '{name}' and its {count} address(es)?"),
                "ranges delete",
                global.yes,
            )? {
                return Ok(());
            }
            let removal = store
                .delete_ip_range(&id)
                .ok_or_else(|| CliError::not_found("IP range", &range))?;
            output::notice(
                &format!(
                    "Deleted range '{name}': {} address(es) removed, {} device(s) unbound",
                    removal.removed_addresses, removal.unbound_devices
                ),
                global.quiet,
            );
            Ok(())
        }
    }
}
