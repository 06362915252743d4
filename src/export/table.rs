//! Console table output.
//!
//! Rows are listed least-used first. Usage and total size are coloured by
//! severity, followed by the top removal candidates and the space held by
//! unused dependencies.

use super::{ExportData, Exporter, LOW_USAGE_THRESHOLD};
use crate::size::format_size;
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;
const MIN_NAME_WIDTH: usize = 15;

/// Total sizes above this are shown in red.
const LARGE_FOOTPRINT: u64 = 10 * 1024 * 1024;
/// Total sizes above this are shown in yellow.
const MEDIUM_FOOTPRINT: u64 = 1024 * 1024;

/// Coloured console table exporter.
pub struct TableExporter;

fn usage_cell(usage: usize) -> ColoredString {
    let text = format!("{:<8}", usage);
    if usage == 0 {
        text.red()
    } else if usage < LOW_USAGE_THRESHOLD {
        text.yellow()
    } else {
        text.green()
    }
}

fn total_size_cell(total: u64) -> ColoredString {
    let text = format!("{:<16}", format_size(total));
    if total > LARGE_FOOTPRINT {
        text.red()
    } else if total > MEDIUM_FOOTPRINT {
        text.yellow()
    } else {
        text.green()
    }
}

impl Exporter for TableExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        if data.rows.is_empty() {
            writeln!(writer, "{}", "No dependencies found to analyze.".yellow())?;
            return Ok(());
        }

        let rule = "─".repeat(RULE_WIDTH);
        let name_width = data
            .rows
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(MIN_NAME_WIDTH)
            + 2;

        writeln!(writer)?;
        writeln!(writer, "{}", "Dependency Usage Analysis:".bold())?;
        writeln!(writer, "{}", rule)?;
        writeln!(
            writer,
            "{}",
            format!(
                "{:<name_width$}{:<8}{:<14}{:<16}{}",
                "Package", "Usage", "Direct Size", "Removable Size", "Exclusive Deps"
            )
            .dimmed()
        )?;
        writeln!(writer, "{}", rule)?;

        for row in data.by_usage() {
            writeln!(
                writer,
                "{}{}{:<14}{}{}",
                format!("{:<name_width$}", row.name).cyan(),
                usage_cell(row.usage),
                format_size(row.direct_size),
                total_size_cell(row.total_size),
                format!("{} deps", row.exclusive_deps).dimmed()
            )?;
        }

        writeln!(writer, "{}", rule)?;

        let candidates = data.removal_candidates();
        if !candidates.is_empty() {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}",
                "Top removal candidates (least used, most space):".bold()
            )?;
            for (index, row) in candidates.iter().enumerate() {
                writeln!(
                    writer,
                    "{}{}: {}, could save {}",
                    format!("{}. ", index + 1).yellow(),
                    row.name.cyan(),
                    format!("{} imports", row.usage).red(),
                    format_size(row.total_size).green()
                )?;
            }
        }

        let unused = data.unused_total();
        if unused > 0 {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}{} could be freed",
                "Unused dependencies: ".bold(),
                format_size(unused).red()
            )?;
        }

        Ok(())
    }
}
