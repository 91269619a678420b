use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

use crate::directory::Directory;
use crate::sessions::ViewSessionStore;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn Directory>,
    pub views: ViewSessionStore,
    pub view_ttl_minutes: i64,
}

/* -------------------------
   Domain records
--------------------------*/

/// One row of the appointment collection as the external store supplies it.
/// The portal only reads these and, on a confirmed cancellation, rewrites
/// `status` in its local copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub doctor_name: String,
    pub reason: Option<String>,
    pub appointment_date: NaiveDate,
    /// Wall-clock display string, passed through untouched (e.g. "10:30 AM").
    pub appointment_time: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    /// Status text we do not recognize, or none at all. Kept rather than
    /// rejected; such rows render in the upcoming list.
    #[default]
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Self::Scheduled,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Completed and cancelled appointments belong to history.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        };
        write!(f, "{label}")
    }
}

/// Identity resolved by the external auth collaborator. Read-only here.
#[derive(Debug, Clone, Serialize)]
pub struct PortalUser {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, FromRow)]
pub struct AppointmentScheduleRow {
    pub appointment_id: Uuid,
    pub doctor_name: String,
    pub appointment_reason: Option<String>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub appointment_status: Option<String>,
}

impl AppointmentScheduleRow {
    pub fn into_appointment(self) -> Appointment {
        Appointment {
            appointment_id: self.appointment_id,
            doctor_name: self.doctor_name,
            reason: self.appointment_reason,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            status: self
                .appointment_status
                .as_deref()
                .map(AppointmentStatus::from_label)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_label() {
        assert_eq!(AppointmentStatus::from_label("scheduled"), AppointmentStatus::Scheduled);
        assert_eq!(AppointmentStatus::from_label(" Completed "), AppointmentStatus::Completed);
        assert_eq!(AppointmentStatus::from_label("CANCELLED"), AppointmentStatus::Cancelled);
        assert_eq!(AppointmentStatus::from_label("no-show"), AppointmentStatus::Unknown);
        assert_eq!(AppointmentStatus::from_label(""), AppointmentStatus::Unknown);
    }

    #[test]
    fn test_row_without_status_maps_to_unknown() {
        let row = AppointmentScheduleRow {
            appointment_id: Uuid::from_u128(1),
            doctor_name: "Dr. Adams".to_string(),
            appointment_reason: None,
            appointment_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            appointment_time: "10:30 AM".to_string(),
            appointment_status: None,
        };

        assert_eq!(row.into_appointment().status, AppointmentStatus::Unknown);
    }

    #[test]
    fn test_status_display_is_capitalized() {
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "Cancelled");
        assert_eq!(AppointmentStatus::Completed.to_string(), "Completed");
    }
}
