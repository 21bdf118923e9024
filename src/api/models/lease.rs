use super::enums::LeaseStatus;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lease {
    pub id: i64,
    pub property_id: i64,
    pub tenant_id: i64,
    pub landlord_id: i64,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lease_duration_months: i32,
    pub status: LeaseStatus,
    pub pet_deposit: Option<f64>,
    pub utilities_included: bool,
    pub parking_included: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl Lease {
    /// Active status and `today` within the lease dates (inclusive).
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.status == LeaseStatus::Active && self.start_date <= today && today <= self.end_date
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        if self.is_active(today) {
            (self.end_date - today).num_days()
        } else {
            0
        }
    }
}

/// Whole calendar months between two dates, counting a partial final month
/// only once its day of month has been reached. The last day of a short month
/// counts as reaching any later day.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let month_end = end.succ_opt().is_none_or(|next| next.month() != end.month());
    if end.day() < start.day() && !month_end {
        months -= 1;
    }
    months.max(0)
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaseRequest {
    pub property_id: Option<i64>,
    pub tenant_id: Option<i64>,
    pub monthly_rent: Option<f64>,
    pub security_deposit: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub pet_deposit: Option<f64>,
    #[serde(default)]
    pub utilities_included: bool,
    #[serde(default)]
    pub parking_included: bool,
}

#[derive(Debug, Clone)]
pub struct NewLease {
    pub property_id: i64,
    pub tenant_id: i64,
    pub landlord_id: i64,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lease_duration_months: i32,
    pub pet_deposit: Option<f64>,
    pub utilities_included: bool,
    pub parking_included: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaseStatusUpdate {
    pub status: Option<String>,
}
