// Analytics Service - aggregates for the admin charts

use crate::domain::{AnalyticsReport, StatusCount, TokenStatus};
use crate::error::Result;
use crate::port::AnalyticsRepository;
use std::sync::Arc;

pub struct AnalyticsService {
    analytics: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(analytics: Arc<dyn AnalyticsRepository>) -> Self {
        Self { analytics }
    }

    /// Peak hours ascending by hour, services by descending count (ties by
    /// name), and one entry per token status including zeros
    pub async fn report(&self) -> Result<AnalyticsReport> {
        let mut peak_hours = self.analytics.bookings_by_hour().await?;
        peak_hours.sort_by_key(|h| h.hour);

        let mut service_stats = self.analytics.tokens_by_department().await?;
        service_stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.service.cmp(&b.service)));

        let counted = self.analytics.tokens_by_status().await?;
        let token_status = TokenStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: counted
                    .iter()
                    .filter(|c| c.status == *status)
                    .map(|c| c.count)
                    .sum(),
            })
            .collect();

        Ok(AnalyticsReport {
            peak_hours,
            service_stats,
            token_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HourlyBookings, ServiceCount};
    use async_trait::async_trait;

    struct FixedAnalytics;

    #[async_trait]
    impl AnalyticsRepository for FixedAnalytics {
        async fn bookings_by_hour(&self) -> Result<Vec<HourlyBookings>> {
            Ok(vec![
                HourlyBookings { hour: 14, bookings: 2 },
                HourlyBookings { hour: 9, bookings: 5 },
            ])
        }

        async fn tokens_by_department(&self) -> Result<Vec<ServiceCount>> {
            Ok(vec![
                ServiceCount { service: "Billing".to_string(), count: 1 },
                ServiceCount { service: "OPD".to_string(), count: 6 },
            ])
        }

        async fn tokens_by_status(&self) -> Result<Vec<StatusCount>> {
            Ok(vec![StatusCount { status: TokenStatus::Served, count: 3 }])
        }
    }

    #[tokio::test]
    async fn test_report_orders_and_fills_statuses() {
        let report = AnalyticsService::new(Arc::new(FixedAnalytics)).report().await.unwrap();

        let hours: Vec<u32> = report.peak_hours.iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![9, 14]);
        assert_eq!(report.service_stats[0].service, "OPD");

        assert_eq!(report.token_status.len(), 3);
        assert_eq!(report.token_status[0], StatusCount { status: TokenStatus::Waiting, count: 0 });
        assert_eq!(report.token_status[1], StatusCount { status: TokenStatus::Served, count: 3 });
    }
}
