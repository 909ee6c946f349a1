//! CSV import and export.

use std::fs::File;
use std::io::BufReader;

use netledger_core::export as csv_export;
use netledger_core::import::ParsedRow;
use netledger_core::{ImportReport, InventoryStore, ParsedTable, parse_others_table, parse_table};
use serde::Serialize;

use crate::cli::{ExportArgs, ExportTable, GlobalOpts, ImportArgs, ImportTable};
use crate::error::CliError;
use crate::output;

use super::{dashboard, util};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportOutcome<'a, T> {
    dry_run: bool,
    #[serde(flatten)]
    report: ImportReport,
    invalid_rows: Vec<&'a ParsedRow<T>>,
}

fn summary<T>(outcome: &ImportOutcome<'_, T>) -> String {
    let verb = if outcome.dry_run { "Would import" } else { "Imported" };
    let mut lines = vec![format!(
        "{verb} {} record(s), skipped {}, {} invalid row(s)",
        outcome.report.imported,
        outcome.report.skipped,
        outcome.invalid_rows.len()
    )];
    lines.extend(outcome.report.errors.iter().map(|e| format!("  {e}")));
    lines.extend(outcome.invalid_rows.iter().map(|r| {
        format!(
            "  line {}: {}",
            r.line,
            r.error.as_deref().unwrap_or_default()
        )
    }));
    lines.join("\n")
}

pub fn import(store: &InventoryStore, args: &ImportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match &args.table {
        ImportTable::Devices { file, vlan } => {
            let table = parse_table(BufReader::new(File::open(file)?))?;
            let vlan_id = util::resolve_vlan_id(&store.snapshot(), vlan.as_deref())?;
            let rows = table.valid_rows();

            let report = if args.dry_run {
                let mut staged = (*store.snapshot()).clone();
                staged.bulk_import_devices(rows, vlan_id)?
            } else {
                store.bulk_import_devices(rows, vlan_id)?
            };
            print_outcome(&table, report, args.dry_run, global)
        }

        ImportTable::Others { file } => {
            let table = parse_others_table(BufReader::new(File::open(file)?))?;
            let rows = table.valid_rows();

            let report = if args.dry_run {
                let mut staged = (*store.snapshot()).clone();
                staged.bulk_import_other_devices(rows)
            } else {
                store.bulk_import_other_devices(rows)?
            };
            print_outcome(&table, report, args.dry_run, global)
        }
    }
}

fn print_outcome<T: Clone + Serialize>(
    table: &ParsedTable<T>,
    report: ImportReport,
    dry_run: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = ImportOutcome {
        dry_run,
        report,
        invalid_rows: table.invalid_rows().collect(),
    };
    let out = output::render_single(global.format(), &outcome, summary, |o| {
        o.report.imported.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn export(store: &InventoryStore, args: ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = store.snapshot();
    let csv = match &args.table {
        ExportTable::Devices => csv_export::devices_csv(&snap)?,
        ExportTable::Ips => csv_export::ip_addresses_csv(&snap)?,
        ExportTable::Vlans => csv_export::vlans_csv(&snap)?,
        ExportTable::Others => csv_export::other_devices_csv(&snap)?,
        ExportTable::Dashboard(filter) => csv_export::dashboard_csv(&dashboard::rows(&snap, filter)?)?,
    };

    match args.out {
        Some(path) => {
            std::fs::write(&path, csv)?;
            output::notice(&format!("Wrote {}", path.display()), global.quiet);
        }
        None => print!("{csv}"),
    }
    Ok(())
}
