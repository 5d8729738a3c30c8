// libs/appointment-cell/src/services/lifecycle.rs
use serde_json::json;
use tracing::{debug, info, warn};

use notification_cell::models::NotificationRequest;
use notification_cell::services::mailer::MailerClient;
use shared_config::AppConfig;
use shared_database::appwrite::AppwriteClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, TransitionOutcome};
use crate::services::appointment::{parse_document, APPOINTMENT_COLLECTION};

pub struct AppointmentLifecycleService {
    store: AppwriteClient,
    config: AppConfig,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: AppwriteClient::new(config),
            config: config.clone(),
        }
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        if current_status.is_terminal() {
            return vec![];
        }

        vec![AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
    }

    /// Validate that a status transition is allowed.
    pub fn validate_transition(
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if *new_status == AppointmentStatus::Pending {
            return Err(AppointmentError::InvalidTargetStatus(new_status.clone()));
        }

        if !Self::valid_transitions(current_status).contains(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition(current_status.clone()));
        }

        Ok(())
    }

    /// Move a pending appointment to its terminal status, then notify the
    /// patient. The two effects are not transactional: a failed
    /// notification leaves the persisted status in place and is reported
    /// in the outcome instead of rolling anything back.
    pub async fn transition(
        &self,
        appointment_id: &str,
        new_status: AppointmentStatus,
    ) -> Result<TransitionOutcome, AppointmentError> {
        debug!("Transitioning appointment {} to {}", appointment_id, new_status);

        let document = self
            .store
            .get_document(APPOINTMENT_COLLECTION, appointment_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::NotFound)?;
        let appointment = parse_document(document)?;

        Self::validate_transition(&appointment.status, &new_status)?;

        let updated_document = self
            .store
            .update_document(
                APPOINTMENT_COLLECTION,
                appointment_id,
                json!({ "status": new_status.to_string() }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
        let updated = parse_document(updated_document)?;

        info!("Appointment {} is now {}", appointment_id, updated.status);

        let notification_error = match self.notify(&updated).await {
            Ok(()) => None,
            Err(e) => {
                warn!("Notification failed for appointment {}: {}", appointment_id, e);
                Some(e.to_string())
            }
        };

        Ok(TransitionOutcome {
            notified: notification_error.is_none(),
            notification_error,
            appointment: updated,
        })
    }

    async fn notify(&self, appointment: &Appointment) -> Result<(), notification_cell::models::NotificationError> {
        let mailer = MailerClient::new(&self.config)?;

        mailer
            .send(&NotificationRequest {
                email: appointment.email.clone(),
                patient_name: appointment.patient_name.clone(),
                date: appointment.display_time(),
                status: appointment.status.to_string(),
                notes: appointment.notes.clone(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_reach_both_terminal_states() {
        let next = AppointmentLifecycleService::valid_transitions(&AppointmentStatus::Pending);
        assert_eq!(next, vec![AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]);

        assert!(AppointmentLifecycleService::validate_transition(
            &AppointmentStatus::Pending,
            &AppointmentStatus::Confirmed
        )
        .is_ok());
        assert!(AppointmentLifecycleService::validate_transition(
            &AppointmentStatus::Pending,
            &AppointmentStatus::Cancelled
        )
        .is_ok());
    }

    #[test]
    fn terminal_states_allow_nothing() {
        assert!(AppointmentLifecycleService::valid_transitions(&AppointmentStatus::Confirmed).is_empty());
        assert!(AppointmentLifecycleService::valid_transitions(&AppointmentStatus::Cancelled).is_empty());

        // Re-confirming a confirmed appointment is an invalid-state error.
        let err = AppointmentLifecycleService::validate_transition(
            &AppointmentStatus::Confirmed,
            &AppointmentStatus::Confirmed,
        )
        .unwrap_err();
        assert!(matches!(err, AppointmentError::InvalidStatusTransition(AppointmentStatus::Confirmed)));

        let err = AppointmentLifecycleService::validate_transition(
            &AppointmentStatus::Cancelled,
            &AppointmentStatus::Confirmed,
        )
        .unwrap_err();
        assert!(matches!(err, AppointmentError::InvalidStatusTransition(AppointmentStatus::Cancelled)));
    }

    #[test]
    fn pending_is_not_a_transition_target() {
        let err = AppointmentLifecycleService::validate_transition(
            &AppointmentStatus::Pending,
            &AppointmentStatus::Pending,
        )
        .unwrap_err();
        assert!(matches!(err, AppointmentError::InvalidTargetStatus(AppointmentStatus::Pending)));
    }
}
