use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::pricing::RentalType;

/// Booking request lifecycle: pending is initial, accepted/rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RentalRequest {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    pub car_id: Option<Uuid>,
    pub car_name: Option<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_days: i32,
    pub rental_type: String,
    pub total_price: String,
    pub message: Option<String>,
    pub status: String,
    pub urgent: bool,
    pub user_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RentalRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending.as_str()
    }

    pub fn is_accepted(&self) -> bool {
        self.status == RequestStatus::Accepted.as_str()
    }

    /// An accepted request whose [date_from, date_to] contains `today`,
    /// inclusive on both ends.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.is_accepted() && self.date_from <= today && today <= self.date_to
    }
}

/// Public booking submission. Required fields are Options so a single pass can
/// report every missing name at once instead of failing on the first.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequestBody {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub contact: Option<String>,
    pub car_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub total_days: Option<i32>,
    pub rental_type: Option<RentalType>,
    pub total_price: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub urgent: bool,
    pub user_ref: Option<String>,
}

/// A submission with every required field present.
#[derive(Debug)]
pub struct NewRequest {
    pub name: String,
    pub contact: String,
    pub car_id: Uuid,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_days: i32,
    pub rental_type: RentalType,
    pub total_price: String,
    pub message: Option<String>,
    pub urgent: bool,
    pub user_ref: Option<String>,
}

impl CreateRequestBody {
    /// Err carries the names of every missing required field.
    pub fn into_new(self) -> std::result::Result<NewRequest, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.contact.is_none() {
            missing.push("contact");
        }
        if self.car_id.is_none() {
            missing.push("car_id");
        }
        if self.date_from.is_none() {
            missing.push("date_from");
        }
        if self.date_to.is_none() {
            missing.push("date_to");
        }
        if self.total_days.is_none() {
            missing.push("total_days");
        }
        if self.rental_type.is_none() {
            missing.push("rental_type");
        }
        if self.total_price.is_none() {
            missing.push("total_price");
        }
        match (
            self.name,
            self.contact,
            self.car_id,
            self.date_from,
            self.date_to,
            self.total_days,
            self.rental_type,
            self.total_price,
        ) {
            (
                Some(name),
                Some(contact),
                Some(car_id),
                Some(date_from),
                Some(date_to),
                Some(total_days),
                Some(rental_type),
                Some(total_price),
            ) => Ok(NewRequest {
                name,
                contact,
                car_id,
                date_from,
                date_to,
                total_days,
                rental_type,
                total_price,
                message: self.message,
                urgent: self.urgent,
                user_ref: self.user_ref,
            }),
            _ => Err(missing),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestListParams {
    /// Filter by status (pending, accepted, rejected)
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestListResponse {
    pub requests: Vec<RentalRequest>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_all_reported_at_once() {
        let body = CreateRequestBody {
            name: Some("Guest".to_string()),
            contact: None,
            car_id: None,
            date_from: Some("2024-07-01".parse().unwrap()),
            date_to: Some("2024-07-05".parse().unwrap()),
            total_days: Some(4),
            rental_type: None,
            total_price: None,
            message: None,
            urgent: false,
            user_ref: None,
        };
        let missing = body.into_new().unwrap_err();
        assert_eq!(missing, vec!["contact", "car_id", "rental_type", "total_price"]);
    }

    #[test]
    fn active_window_is_inclusive_on_both_ends() {
        let request = RentalRequest {
            id: Uuid::new_v4(),
            name: "Guest".to_string(),
            contact: "+971".to_string(),
            car_id: None,
            car_name: None,
            date_from: "2024-07-01".parse().unwrap(),
            date_to: "2024-07-05".parse().unwrap(),
            total_days: 4,
            rental_type: "daily".to_string(),
            total_price: "2000".to_string(),
            message: None,
            status: "accepted".to_string(),
            urgent: false,
            user_ref: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(request.is_active_on("2024-07-01".parse().unwrap()));
        assert!(request.is_active_on("2024-07-05".parse().unwrap()));
        assert!(!request.is_active_on("2024-07-06".parse().unwrap()));

        let mut rejected = request.clone();
        rejected.status = "rejected".to_string();
        assert!(!rejected.is_active_on("2024-07-03".parse().unwrap()));
    }
}
