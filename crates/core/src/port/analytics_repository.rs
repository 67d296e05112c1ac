// Analytics Repository Port (Interface)

use crate::domain::{HourlyBookings, ServiceCount, StatusCount};
use crate::error::Result;
use async_trait::async_trait;

/// Aggregation queries over the full token history
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Tokens created per UTC hour; hours without bookings are omitted
    async fn bookings_by_hour(&self) -> Result<Vec<HourlyBookings>>;

    /// Tokens issued per department name
    async fn tokens_by_department(&self) -> Result<Vec<ServiceCount>>;

    /// Tokens per status; statuses without tokens are omitted
    async fn tokens_by_status(&self) -> Result<Vec<StatusCount>>;
}
