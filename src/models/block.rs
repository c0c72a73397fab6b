use serde::Serialize;

/// Outcome of one delivery block the bot attempted, pushed by the
/// external bot process via POST /api/bot/log.
#[derive(Clone, Debug, Serialize)]
pub struct DeliveryBlockLog {
    pub id: u64,
    pub user_id: u32,
    pub block_id: String,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub payout: f64,
    /// "accepted", "skipped", "missed", ...
    pub result: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug)]
pub struct NewDeliveryBlockLog {
    pub user_id: u32,
    pub block_id: String,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub payout: f64,
    pub result: String,
    pub timestamp: i64,
}

/// Simple aggregation over a user's block logs for the dashboard.
#[derive(Clone, Debug, Serialize)]
pub struct DashboardStats {
    pub accepted_today: usize,
    pub total_accepted: usize,
    pub total_payout: f64,
    pub avg_payout: f64,
}
