//! Text output for a selection
//!
//! ```text
//! /* 1. orders(customer_id,created_at): size=240 KB, benefit=45.00 */
//! /* Total size = 240 KB */
//! ```
//!
//! and, separately, one `CREATE INDEX` statement per chosen index.

use std::fmt::Write;

use super::selection::Selection;

/// One comment line per chosen index, then the total size
pub fn render_summary(selection: &Selection) -> String {
    let mut out = String::new();
    for (i, r) in selection.chosen.iter().enumerate() {
        let _ = writeln!(
            out,
            "/* {}. {}({}): size={} KB, benefit={:.2} */",
            i + 1,
            r.table,
            r.column_names.join(","),
            r.size_kb,
            r.benefit
        );
    }
    let _ = writeln!(out, "/* Total size = {} KB */", selection.total_size_kb);
    out
}

/// `CREATE INDEX idx_<table>_<n> ON <table> (<cols>);` per chosen index
pub fn render_statements(selection: &Selection) -> String {
    let mut out = String::new();
    for (i, r) in selection.chosen.iter().enumerate() {
        let _ = writeln!(
            out,
            "CREATE INDEX idx_{}_{} ON {} ({});",
            r.table,
            i + 1,
            r.table,
            r.column_names.join(", ")
        );
    }
    out
}
