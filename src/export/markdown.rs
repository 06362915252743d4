//! Markdown export implementation.
//!
//! Exports footprint analysis results in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use crate::size::format_size;
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        // Title
        writeln!(writer, "# Dependency Footprint Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Project:** {}", data.project_name)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Direct Dependencies | {} |", data.rows.len())?;
        writeln!(
            writer,
            "| Unused Dependencies | {} |",
            data.rows.iter().filter(|r| r.is_unused()).count()
        )?;
        writeln!(
            writer,
            "| Attributed Footprint | {} |",
            format_size(data.total_footprint())
        )?;
        writeln!(
            writer,
            "| Freed By Removing Unused | {} |",
            format_size(data.unused_total())
        )?;
        writeln!(writer)?;

        if data.rows.is_empty() {
            writeln!(writer, "No dependencies found to analyze.")?;
            return Ok(());
        }

        // Per-dependency table
        writeln!(writer, "## Dependencies")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "| Package | Usage | Direct Size | Removable Size | Exclusive Deps |"
        )?;
        writeln!(
            writer,
            "|---------|-------|-------------|----------------|----------------|"
        )?;
        for row in data.by_usage() {
            writeln!(
                writer,
                "| {} | {} | {} | {} | {} |",
                row.name,
                row.usage,
                format_size(row.direct_size),
                format_size(row.total_size),
                row.exclusive_deps
            )?;
        }
        writeln!(writer)?;

        let candidates = data.removal_candidates();
        if !candidates.is_empty() {
            writeln!(writer, "## Removal Candidates")?;
            writeln!(writer)?;
            for (index, row) in candidates.iter().enumerate() {
                writeln!(
                    writer,
                    "{}. **{}**: {} imports, could save {}",
                    index + 1,
                    row.name,
                    row.usage,
                    format_size(row.total_size)
                )?;
            }
            writeln!(writer)?;
        }

        // Exclusive transitive dependencies, only for roots that have any
        let with_exclusive: Vec<_> = data
            .rows
            .iter()
            .filter(|r| !r.exclusive_dependency_names.is_empty())
            .collect();
        if !with_exclusive.is_empty() {
            writeln!(writer, "## Exclusive Dependencies")?;
            writeln!(writer)?;
            for row in with_exclusive {
                writeln!(
                    writer,
                    "- **{}**: {}",
                    row.name,
                    row.exclusive_dependency_names.join(", ")
                )?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by dep-hunter*")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_data;

    fn render(data: &ExportData) -> String {
        let mut output = Vec::new();
        MarkdownExporter.export(data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export() {
        let output = render(&sample_data());

        assert!(output.contains("# Dependency Footprint Report"));
        assert!(output.contains("**Project:** sample-app"));
        assert!(output.contains("| Direct Dependencies | 4 |"));
        assert!(output.contains("| Unused Dependencies | 2 |"));
        assert!(output.contains("| moment | 0 |"));
        assert!(output.contains("1. **moment**: 0 imports, could save 4.29 MB"));
        assert!(output.contains("- **react**: react-helper"));
    }

    #[test]
    fn test_markdown_rows_sorted_by_usage() {
        let output = render(&sample_data());
        let moment = output.find("| moment |").unwrap();
        let react = output.find("| react |").unwrap();
        assert!(moment < react);
    }

    #[test]
    fn test_markdown_empty() {
        let output = render(&ExportData::new("empty", vec![]));
        assert!(output.contains("No dependencies found to analyze."));
        assert!(!output.contains("## Removal Candidates"));
    }
}
