// libs/appointment-cell/src/services/appointment.rs
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::appwrite::{queries, AppwriteClient};

use crate::models::{
    Appointment, AppointmentDocument, AppointmentError, AppointmentStatus,
    CreateAppointmentRequest,
};

pub const APPOINTMENT_COLLECTION: &str = "appointments";

pub struct AppointmentService {
    store: AppwriteClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: AppwriteClient::new(config),
        }
    }

    /// Create a booking request. New appointments always start pending;
    /// only an explicit transition moves them on.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Creating appointment for: {}", request.email);

        Self::validate_request(&request)?;

        let data = json!({
            "title": request.patient_name,
            "email": request.email,
            "date": request.scheduled_at.to_rfc3339(),
            "notes": request.notes,
            "status": AppointmentStatus::Pending.to_string(),
        });

        let document = self
            .store
            .create_document(APPOINTMENT_COLLECTION, data)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment = parse_document(document)?;
        debug!("Appointment created with ID: {}", appointment.id);

        Ok(appointment)
    }

    /// List appointments ordered by scheduled time, optionally filtered by
    /// status (the dashboard's Pending / Confirmed / All tabs).
    pub async fn list_appointments(
        &self,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments (status filter: {:?})", status);

        let mut query_list = vec![queries::order_asc("date")];
        if let Some(status) = status {
            query_list.push(queries::equal("status", &status.to_string()));
        }

        let documents = self
            .store
            .list_documents(APPOINTMENT_COLLECTION, &query_list)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        documents.into_iter().map(parse_document).collect()
    }

    pub async fn get_appointment(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        let document = self
            .store
            .get_document(APPOINTMENT_COLLECTION, appointment_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::NotFound)?;

        parse_document(document)
    }

    pub async fn delete_appointment(&self, appointment_id: &str) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        self.store
            .get_document(APPOINTMENT_COLLECTION, appointment_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::NotFound)?;

        self.store
            .delete_document(APPOINTMENT_COLLECTION, appointment_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    fn validate_request(request: &CreateAppointmentRequest) -> Result<(), AppointmentError> {
        if request.patient_name.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Patient name must not be empty".to_string(),
            ));
        }

        let email = request.email.trim();
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        };
        if !valid_email {
            return Err(AppointmentError::ValidationError(format!(
                "Invalid email address: {}",
                request.email
            )));
        }

        Ok(())
    }
}

pub(crate) fn parse_document(document: Value) -> Result<Appointment, AppointmentError> {
    let record: AppointmentDocument = serde_json::from_value(document)
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

    Ok(record.into())
}
