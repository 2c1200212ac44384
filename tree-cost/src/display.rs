use std::fmt::Write;

use solana_sdk::native_token::LAMPORTS_PER_SOL;

use crate::cost_table::CostRow;

const DASHBOARD_HTML: &str = include_str!("../static/dashboard.html");

pub const COLUMN_HEADERS: [&str; 10] = [
    "Max Depth",
    "Max Buffer Size",
    "Canopy Depth",
    "Required Space",
    "Storage Cost (SOL)",
    "Storage Cost (USD)",
    "Cost per 1,000 NFTs (SOL)",
    "Cost per 10,000 NFTs (SOL)",
    "Cost per 1,000 NFTs (USD)",
    "Cost per 10,000 NFTs (USD)",
];

/// Formatted cells of one table row.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub max_depth: String,
    pub max_buffer_size: String,
    pub canopy_depth: String,
    pub required_space: String,
    pub storage_cost_sol: String,
    pub storage_cost_usd: String,
    pub cost_per_1k_sol: String,
    pub cost_per_10k_sol: String,
    pub cost_per_1k_usd: String,
    pub cost_per_10k_usd: String,
}

impl DisplayRow {
    pub fn new(row: &CostRow, sol_price: f64) -> Self {
        let storage_cost_sol = row.storage_cost as f64 / LAMPORTS_PER_SOL as f64;
        let leaves = 2f64.powi(row.max_depth as i32);
        let per_1k_sol = storage_cost_sol * 1_000.0 / leaves;
        let per_10k_sol = storage_cost_sol * 10_000.0 / leaves;

        Self {
            max_depth: row.max_depth.to_string(),
            max_buffer_size: row.max_buffer_size.to_string(),
            canopy_depth: row.canopy_depth.to_string(),
            required_space: format_bytes(row.required_space),
            storage_cost_sol: format!("{:.4}", storage_cost_sol),
            storage_cost_usd: format!("${}", format_price(storage_cost_sol * sol_price)),
            cost_per_1k_sol: format_small_number(per_1k_sol),
            cost_per_10k_sol: format_small_number(per_10k_sol),
            cost_per_1k_usd: format!("${}", format_price(per_1k_sol * sol_price)),
            cost_per_10k_usd: format!("${}", format_price(per_10k_sol * sol_price)),
        }
    }

    pub fn cells(&self) -> [&str; 10] {
        [
            &self.max_depth,
            &self.max_buffer_size,
            &self.canopy_depth,
            &self.required_space,
            &self.storage_cost_sol,
            &self.storage_cost_usd,
            &self.cost_per_1k_sol,
            &self.cost_per_10k_sol,
            &self.cost_per_1k_usd,
            &self.cost_per_10k_usd,
        ]
    }
}

pub fn format_small_number(num: f64) -> String {
    if num < 1e-4 {
        "< 0.0001".to_string()
    } else {
        format!("{:.4}", num)
    }
}

/// Rounds to the nearest cent, or falls back to [`format_small_number`] for
/// amounts below one cent.
pub fn format_price(num: f64) -> String {
    if num >= 0.01 {
        format!("{:.2}", (num * 100.0).round() / 100.0)
    } else {
        format_small_number(num)
    }
}

pub fn format_bytes(bytes: usize) -> String {
    const SIZES: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Byte".to_string();
    }
    let bytes = bytes as f64;
    let i = ((bytes.ln() / 1024f64.ln()).floor() as usize).min(SIZES.len() - 1);
    format!("{} {}", (bytes / 1024f64.powi(i as i32)).round(), SIZES[i])
}

pub fn render_html(rows: &[CostRow], sol_price: f64) -> String {
    let mut body = String::new();
    for row in rows {
        let display = DisplayRow::new(row, sol_price);
        body.push_str("        <tr>");
        for cell in display.cells() {
            let _ = write!(body, "<td>{}</td>", escape_html(cell));
        }
        body.push_str("</tr>\n");
    }
    DASHBOARD_HTML
        .replace("{{SOL_PRICE}}", &format!("{:.2}", sol_price))
        .replace("{{ROWS}}", &body)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Plain text rendering of the table, one line per row, columns padded to
/// their widest cell.
pub fn render_text_table(rows: &[CostRow], sol_price: f64) -> String {
    let display_rows: Vec<DisplayRow> = rows
        .iter()
        .map(|row| DisplayRow::new(row, sol_price))
        .collect();

    let mut widths = COLUMN_HEADERS.map(str::len);
    for row in &display_rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "Current SOL Price: ${:.2}", sol_price);
    write_line(&mut out, &COLUMN_HEADERS, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let separator: Vec<&str> = separator.iter().map(String::as_str).collect();
    write_line(&mut out, &separator, &widths);
    for row in &display_rows {
        write_line(&mut out, &row.cells(), &widths);
    }
    out
}

fn write_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = width))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | "));
}
