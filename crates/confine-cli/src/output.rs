//! Plain-text rendering for CLI output.

use std::fmt::Write;

use confine_core::mount::MountEntryList;
use confine_core::seccomp::AllowList;

const MOUNT_HEADERS: [&str; 6] = ["SOURCE", "TARGET", "TYPE", "OPTIONS", "DUMP", "PASS"];

/// Renders a mount list as an aligned table with a header row.
#[must_use]
pub fn mount_table(list: &MountEntryList) -> String {
    let rows: Vec<[String; 6]> = list
        .iter()
        .map(|e| {
            [
                e.source.clone(),
                e.target.clone(),
                e.fs_type.clone(),
                e.options.clone(),
                e.dump_frequency.to_string(),
                e.fsck_pass.to_string(),
            ]
        })
        .collect();

    let mut widths = MOUNT_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &MOUNT_HEADERS, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            out.push_str(cell.as_ref());
        } else {
            let _ = write!(out, "{:<width$}  ", cell.as_ref());
        }
    }
    out.push('\n');
}

/// Renders an allow-list as one syscall per line, marking `@unrestricted`.
#[must_use]
pub fn allowlist_summary(list: &AllowList) -> String {
    let mut out = String::new();
    for entry in &list.entries {
        let _ = writeln!(out, "{:>4}  {}", entry.line, entry.name);
    }
    let _ = writeln!(out, "{} syscall(s) allowed", list.entries.len());
    if list.unrestricted {
        out.push_str("profile is unrestricted: no filter will be installed\n");
    }
    out
}
