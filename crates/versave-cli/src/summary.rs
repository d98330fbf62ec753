use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use versave_core::{BackupEntry, RotationReport, SaveReport, VersionSet};

pub fn print_save(report: &SaveReport) {
    let outcome = &report.outcome;
    if outcome.bootstrapped {
        println!("Created project: {}", project_root(&outcome.path).display());
    }
    println!("Saved: {}", outcome.path.display());
    if let Some(previous) = &outcome.previous
        && previous != &outcome.path
    {
        println!("Previous: {}", previous.display());
    }
    if let Some(rotation) = &report.rotation {
        print_rotation(rotation);
    }
}

pub fn print_rotation(report: &RotationReport) {
    if report.moved_count() > 0 {
        println!("Moved {} backup(s)", report.moved_count());
    }
    for failure in &report.failures {
        eprintln!(
            "warning: backup {} not moved: {}",
            failure.path.display(),
            failure.reason
        );
    }
}

pub fn print_versions(set: &VersionSet) {
    println!("Project: {}", set.project);
    println!("Folder: {}", set.directory.display());
    if set.is_empty() {
        println!("No versions found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Version"),
        header_cell("File"),
        header_cell("Size"),
        header_cell("Modified"),
        header_cell(""),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for entry in set {
        let marker = if entry.is_current {
            Cell::new("current")
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else if entry.implicit {
            dim_cell("unversioned")
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(entry.version()).fg(Color::Blue),
            Cell::new(&entry.file_name),
            Cell::new(entry.size),
            dim_cell(entry.modified.format("%Y-%m-%d %H:%M:%S")),
            marker,
        ]);
    }
    println!("{table}");
}

pub fn print_backups(backups: &[BackupEntry]) {
    if backups.is_empty() {
        println!("No backups found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Slot"),
        header_cell("File"),
        header_cell("Size"),
        header_cell("Modified"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for backup in backups {
        table.add_row(vec![
            Cell::new(backup.slot).fg(Color::Blue),
            Cell::new(&backup.file_name),
            Cell::new(backup.size),
            dim_cell(backup.modified.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    println!("{table}");
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

fn project_root(path: &Path) -> &Path {
    path.parent().unwrap_or(path)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
