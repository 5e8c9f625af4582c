// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::Priority;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::collections::HashMap;

// A palette of 20 distinct colors, handed out to assignees in order.
const ASSIGNEE_PALETTE: [&str; 20] = [
    "#1f77b4", // Muted blue
    "#ff7f0e", // Orange
    "#2ca02c", // Green
    "#d62728", // Red
    "#9467bd", // Purple
    "#8c564b", // Brown
    "#e377c2", // Pink
    "#7f7f7f", // Grey
    "#bcbd22", // Olive
    "#17becf", // Cyan
    "#aec7e8", // Light blue
    "#ffbb78", // Light orange
    "#98df8a", // Light green
    "#ff9896", // Light red
    "#c5b0d5", // Light purple
    "#c49c94", // Light brown
    "#f7b6d2", // Light pink
    "#c7c7c7", // Light grey
    "#dbdb8d", // Light olive
    "#9edae5", // Light cyan
];

/// Gives each assignee label a stable color for the lifetime of the process.
#[derive(Debug, Default)]
pub struct AssigneeColorMap {
    colors: HashMap<String, &'static str>,
    next_color_index: usize,
}

impl AssigneeColorMap {
    /// Returns the color already assigned to `name`, or assigns the next one,
    /// wrapping around the palette.
    pub fn color_for(&mut self, name: &str) -> &'static str {
        if let Some(color) = self.colors.get(name).copied() {
            return color;
        }

        let color = ASSIGNEE_PALETTE[self.next_color_index];
        self.colors.insert(name.to_string(), color);
        self.next_color_index = (self.next_color_index + 1) % ASSIGNEE_PALETTE.len();
        color
    }
}

lazy_static! {
    // Global, lazily initialized, thread-safe assignee color map.
    static ref ASSIGNEE_COLORS: RwLock<AssigneeColorMap> = RwLock::new(AssigneeColorMap::default());
}

/// Color of an assignee label on the board.
pub fn assignee_color(name: &str) -> &'static str {
    if let Some(color) = ASSIGNEE_COLORS.read().colors.get(name).copied() {
        return color;
    }
    ASSIGNEE_COLORS.write().color_for(name)
}

/// Card color per priority: red for high, blue for medium, green for low.
pub fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "#f87171",
        Priority::Medium => "#60a5fa",
        Priority::Low => "#4ade80",
    }
}

/// Parses `#rrggbb`.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
