//! Everything the CLI writes: `--output` rendering and page footers on
//! stdout, plus notices and spinners on stderr.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use ridedesk_core::{Notice, NoticeLevel};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Color a status word by meaning: green for good, yellow for waiting,
/// red for bad. Unknown words pass through.
pub fn status(word: &str, color: bool) -> String {
    if !color {
        return word.to_owned();
    }
    match word.to_ascii_lowercase().as_str() {
        "approved" | "active" | "completed" | "paid" | "online" | "read" => {
            word.green().to_string()
        }
        "pending" | "ongoing" | "accepted" | "unread" => word.yellow().to_string(),
        "rejected" | "inactive" | "expired" | "cancelled" | "failed" => word.red().to_string(),
        _ => word.to_owned(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Rows for `table`, one `id_fn` per line for `plain`, the wire models
/// themselves for the structured formats.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
        structured => serialize(structured, data),
    }
}

/// Like [`render_list`], with a hand-laid `detail_fn` view for `table`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Plain => id_fn(data),
        structured => serialize(structured, data),
    }
}

/// JSON or YAML. A value that will not serialize becomes an error line
/// rather than a panic.
fn serialize<T: serde::Serialize + ?Sized>(format: OutputFormat, data: &T) -> String {
    let rendered = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
        _ => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
    };
    rendered.unwrap_or_else(|e| format!("error: cannot serialize output: {e}"))
}

/// "page 2 of 7 (134 total)" footer, table mode only.
pub fn page_footer(page: u32, total_pages: u32, total: u64) -> String {
    format!("page {page} of {} ({total} total)", total_pages.max(1))
}

/// Page footer under a table; structured formats carry no footer.
pub fn print_page_footer(global: &GlobalOpts, page: u32, total_pages: u32, total: u64) {
    if global.output == OutputFormat::Table {
        print_output(&page_footer(page, total_pages, total), global.quiet);
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a console notice to stderr.
pub fn print_notice(notice: &Notice, global: &GlobalOpts) {
    if global.quiet && notice.level == NoticeLevel::Success {
        return;
    }
    let color = should_color(global.color);
    let line = match (notice.level, color) {
        (NoticeLevel::Success, true) => format!("{} {}", "✓".green(), notice.message),
        (NoticeLevel::Error, true) => format!("{} {}", "✗".red(), notice.message.red()),
        (NoticeLevel::Success, false) => format!("✓ {}", notice.message),
        (NoticeLevel::Error, false) => format!("✗ {}", notice.message),
    };
    eprintln!("{line}");
}

// ── Progress ─────────────────────────────────────────────────────────

/// Spinner on stderr while a query loads. Hidden when stderr is not a
/// terminal or output is quiet.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

// ── Cells ──────────────────────────────────────────────────────────

/// Format a money amount.
pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Short human timestamp, `-` when absent.
pub fn when(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
