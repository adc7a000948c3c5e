use crate::model::{HostResult, ScanResults, TlsVersion};
use crate::util::single_line;
use colored::Colorize;
use std::io::Write;

const GAP: &str = "  ";

pub(super) fn write_table<W: Write>(
    writer: &mut W,
    results: &ScanResults,
    color: bool,
) -> anyhow::Result<()> {
    let header: Vec<String> = std::iter::once("Host")
        .chain(TlsVersion::ALL.iter().map(|v| v.label()))
        .chain(std::iter::once("Error"))
        .map(String::from)
        .collect();
    let rows: Vec<Vec<String>> = results.hosts.iter().map(row).collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(writer, &header, &widths, |_, cell| {
        if color {
            cell.bright_green().bold().to_string()
        } else {
            cell.to_string()
        }
    })?;
    for row in &rows {
        write_row(writer, row, &widths, |idx, cell| {
            if color && idx == 0 {
                cell.bright_yellow().bold().to_string()
            } else {
                cell.to_string()
            }
        })?;
    }
    Ok(())
}

fn row(result: &HostResult) -> Vec<String> {
    let mut cells = Vec::with_capacity(6);
    cells.push(result.host.clone());
    cells.extend(
        TlsVersion::ALL
            .iter()
            .map(|v| result.support(*v).symbol().to_string()),
    );
    cells.push(
        result
            .error
            .as_deref()
            .map(single_line)
            .unwrap_or_else(|| "-".to_string()),
    );
    cells
}

fn write_row<W, F>(writer: &mut W, cells: &[String], widths: &[usize], style: F) -> anyhow::Result<()>
where
    W: Write,
    F: Fn(usize, &str) -> String,
{
    let last = cells.len().saturating_sub(1);
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (cell, &width))| {
            // Pad before styling so escape codes don't skew the columns.
            if idx == last {
                style(idx, cell)
            } else {
                style(idx, &format!("{cell:<width$}"))
            }
        })
        .collect::<Vec<_>>()
        .join(GAP);
    writeln!(writer, "{line}")?;
    Ok(())
}
