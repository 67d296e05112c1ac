//! HTTP Request/Response Types
//!
//! Wire shapes only; conversions from domain types live here too.

use chrono::{DateTime, SecondsFormat, Utc};
use queueless_core::application::JoinedToken;
use queueless_core::domain::{
    AnalyticsReport, AuthGrant, Center, Department, DepartmentId, FeedbackId, Role, Token,
    TokenHistoryEntry, TokenNumber, TokenStatus,
};
use serde::{Deserialize, Serialize};

/// Epoch milliseconds as an RFC 3339 UTC timestamp
pub fn rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDto {
    pub id: DepartmentId,
    pub name: String,
    pub max_slots: i64,
    pub avg_service_time: i64,
}

impl From<Department> for DepartmentDto {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            name: d.name,
            max_slots: d.max_slots,
            avg_service_time: d.avg_service_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CenterDto {
    pub id: i64,
    pub name: String,
    pub departments: Vec<DepartmentDto>,
}

impl From<Center> for CenterDto {
    fn from(c: Center) -> Self {
        Self {
            id: c.id,
            name: c.name,
            departments: c.departments.into_iter().map(DepartmentDto::from).collect(),
        }
    }
}

/// POST /queue/join
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
    pub department_id: DepartmentId,
    #[serde(default)]
    pub priority: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub token_number: TokenNumber,
    /// Minutes
    pub estimated_wait_time: i64,
    pub department_id: DepartmentId,
    pub priority: bool,
}

impl From<JoinedToken> for JoinResponse {
    fn from(joined: JoinedToken) -> Self {
        Self {
            token_number: joined.token.token_number,
            estimated_wait_time: joined.estimated_wait_minutes,
            department_id: joined.token.department_id,
            priority: joined.token.priority,
        }
    }
}

/// One entry of GET /queue/list/{deptId}
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    pub token_number: TokenNumber,
    pub priority: bool,
    pub status: TokenStatus,
    pub created_at: String,
}

impl From<Token> for QueueEntry {
    fn from(t: Token) -> Self {
        Self {
            id: t.id,
            token_number: t.token_number,
            priority: t.priority,
            status: t.status,
            created_at: rfc3339(t.created_at),
        }
    }
}

/// `?departmentId=` on serve/miss
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentHint {
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub token_number: TokenNumber,
    pub center_name: String,
    pub department_name: String,
    pub slot_time: String,
    pub status: TokenStatus,
}

impl From<TokenHistoryEntry> for HistoryEntry {
    fn from(e: TokenHistoryEntry) -> Self {
        Self {
            id: e.id,
            token_number: e.token_number,
            center_name: e.center_name,
            department_name: e.department_name,
            slot_time: rfc3339(e.slot_time),
            status: e.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: FeedbackId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
}

impl From<AuthGrant> for AuthResponse {
    fn from(grant: AuthGrant) -> Self {
        Self {
            token: grant.token,
            role: grant.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeakHour {
    /// "HH:00" (UTC)
    pub hour: String,
    pub bookings: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStat {
    pub service: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusStat {
    pub status: TokenStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub peak_hours: Vec<PeakHour>,
    pub service_stats: Vec<ServiceStat>,
    pub token_status: Vec<StatusStat>,
}

impl From<AnalyticsReport> for AnalyticsResponse {
    fn from(report: AnalyticsReport) -> Self {
        Self {
            peak_hours: report
                .peak_hours
                .into_iter()
                .map(|h| PeakHour {
                    hour: format!("{:02}:00", h.hour),
                    bookings: h.bookings,
                })
                .collect(),
            service_stats: report
                .service_stats
                .into_iter()
                .map(|s| ServiceStat {
                    service: s.service,
                    count: s.count,
                })
                .collect(),
            token_status: report
                .token_status
                .into_iter()
                .map(|s| StatusStat {
                    status: s.status,
                    count: s.count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
