//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};

/// Creates a key-value info table (two columns: key and value).
pub fn info_table<K: AsRef<str>, V: AsRef<str>>(entries: &[(K, V)]) -> Table {
    let mut table = Table::new();

    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key.as_ref())
        } else {
            Cell::new(key.as_ref()).fg(Color::DarkGrey)
        };
        table.add_row(vec![key_cell, Cell::new(value.as_ref())]);
    }

    table
}

/// Prints a key-value info table.
pub fn print_info_table<K: AsRef<str>, V: AsRef<str>>(entries: &[(K, V)]) {
    let table = info_table(entries);
    println!("{table}");
}
