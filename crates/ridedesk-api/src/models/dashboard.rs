use serde::{Deserialize, Serialize};

/// Headline counters on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Overview {
    pub total_users: u64,
    pub total_drivers: u64,
    pub total_rides: u64,
    pub total_revenue: f64,
    pub active_rides: u64,
    pub pending_drivers: u64,
    pub pending_reports: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

/// Ride count and revenue for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyStat {
    #[serde(rename = "_id")]
    pub month: MonthKey,
    #[serde(default)]
    pub rides: u64,
    #[serde(default)]
    pub revenue: f64,
}

/// `GET /api/admin/dashboard/stats` payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub overview: Overview,
    #[serde(default)]
    pub monthly_stats: Vec<MonthlyStat>,
}
