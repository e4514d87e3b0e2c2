//! Dashboard statistics handler.

use std::fmt::Write;

use tabled::Tabled;

use ridedesk_core::Console;
use ridedesk_core::models::{DashboardStats, MonthlyStat};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Rides")]
    rides: u64,
    #[tabled(rename = "Revenue")]
    revenue: String,
}

impl From<&MonthlyStat> for MonthRow {
    fn from(m: &MonthlyStat) -> Self {
        Self {
            month: format!("{:04}-{:02}", m.month.year, m.month.month),
            rides: m.rides,
            revenue: output::money(m.revenue),
        }
    }
}

fn detail(stats: &DashboardStats) -> String {
    let o = &stats.overview;
    let mut out = String::new();
    let _ = writeln!(out, "Users:           {}", o.total_users);
    let _ = writeln!(out, "Drivers:         {}", o.total_drivers);
    let _ = writeln!(out, "Pending drivers: {}", o.pending_drivers);
    let _ = writeln!(out, "Rides:           {}", o.total_rides);
    let _ = writeln!(out, "Active rides:    {}", o.active_rides);
    let _ = writeln!(out, "Revenue:         {}", output::money(o.total_revenue));
    let _ = writeln!(out, "Pending reports: {}", o.pending_reports);

    if !stats.monthly_stats.is_empty() {
        let _ = writeln!(out);
        out.push_str(&output::render_list(
            OutputFormat::Table,
            &stats.monthly_stats,
            |x| MonthRow::from(x),
            |_| String::new(),
        ));
    }
    out
}

pub async fn handle(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let mut observer = console.dashboard_stats();
    let stats = util::load(&mut observer, "dashboard", global).await?;

    let out = output::render_single(global.output, &*stats, detail, |s| {
        s.overview.total_rides.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
