// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub email: String,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Appointment time as shown to the patient in notifications.
    pub fn display_time(&self) -> String {
        self.scheduled_at.format("%B %e, %Y at %H:%M").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    /// Confirmed and cancelled are terminal; nothing leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Confirmed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Store shape of an `appointments` document. The patient name travels in
/// the legacy `title` field and the scheduled time in `date`; both get
/// proper names on this side of the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub email: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

impl From<AppointmentDocument> for Appointment {
    fn from(doc: AppointmentDocument) -> Self {
        Self {
            id: doc.id,
            patient_name: doc.title,
            email: doc.email,
            scheduled_at: doc.date,
            notes: doc.notes,
            status: doc.status,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_name: String,
    pub email: String,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: AppointmentStatus,
}

/// Result of a status transition. Persistence and notification are not
/// transactional: `notified == false` with an error means the status
/// change stands but the patient has not heard about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub appointment: Appointment,
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_error: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Appointments can only transition to confirmed or cancelled, not {0}")]
    InvalidTargetStatus(AppointmentStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
