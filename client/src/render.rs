// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::board::BoardState;
use crate::palette::{assignee_color, hex_to_rgb, priority_color};

use comfy_table::{Cell, ContentArrangement, Table, modifiers, presets};
use common::{Task, TaskStats, TaskStatus};
use yansi::Paint;

/// Paints `text` with a `#rrggbb` color, or leaves it plain if the hex is bad.
fn tint(text: &str, hex: &str) -> String {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => text.rgb(r, g, b).to_string(),
        None => text.to_string(),
    }
}

/// One card: title, assignee, due date and priority.
fn card(task: &Task) -> String {
    format!(
        "{} {}\n{}\nDue: {}\n{}",
        format!("#{}", task.id).dim(),
        task.title.bold(),
        tint(&format!("@{}", task.assigned_to), assignee_color(&task.assigned_to)),
        task.due_date.format("%Y-%m-%d"),
        tint(task.priority.as_str(), priority_color(task.priority)),
    )
}

pub fn stats_line(stats: &TaskStats) -> String {
    format!(
        "Total Tasks: {}  |  In Progress: {}  |  Completed: {}",
        stats.total.bold(),
        stats.in_progress.bold(),
        stats.done.bold()
    )
}

/// The board as three columns, one card per cell.
pub fn board_table(state: &BoardState) -> Table {
    let columns: Vec<Vec<&Task>> = TaskStatus::ALL.iter().map(|s| state.column(*s)).collect();

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            TaskStatus::ALL
                .iter()
                .zip(&columns)
                .map(|(status, tasks)| Cell::new(format!("{} ({})", status.title(), tasks.len()))),
        );

    let depth = columns.iter().map(Vec::len).max().unwrap_or(0);
    for row in 0..depth {
        table.add_row(
            columns
                .iter()
                .map(|tasks| tasks.get(row).map(|t| card(t)).unwrap_or_default()),
        );
    }
    table
}

/// Renders the whole screen: stats, board, and the pending error if any.
pub fn render_board(state: &BoardState) -> String {
    let mut out = stats_line(&state.stats());
    out.push('\n');
    if state.tasks.is_empty() && state.error.is_none() {
        out.push_str("No tasks yet.\n");
    }
    out.push_str(&board_table(state).to_string());
    if let Some(error) = &state.error {
        out.push('\n');
        out.push_str(&format!("{} {}", "Error:".red().bold(), error));
    }
    out
}
