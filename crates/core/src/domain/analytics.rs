// Analytics Domain Model

use super::token::TokenStatus;

/// Tokens created in one UTC hour of the day (0..=23)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyBookings {
    pub hour: u32,
    pub bookings: i64,
}

/// Tokens issued by one department
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCount {
    pub service: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: TokenStatus,
    pub count: i64,
}

/// Aggregates behind the admin charts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalyticsReport {
    pub peak_hours: Vec<HourlyBookings>,
    pub service_stats: Vec<ServiceCount>,
    pub token_status: Vec<StatusCount>,
}
