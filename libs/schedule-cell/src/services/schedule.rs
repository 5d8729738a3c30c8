// libs/schedule-cell/src/services/schedule.rs
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::appwrite::{queries, AppwriteClient};

use crate::models::{
    CreateScheduleRequest, DayAvailability, OverlapReport, ScheduleDocument, ScheduleError,
    ScheduleRange, WeeklyTemplate, DEFAULT_PRIORITY,
};
use crate::services::resolver;

pub const SCHEDULE_COLLECTION: &str = "clinic_schedules";

pub struct ScheduleService {
    store: AppwriteClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: AppwriteClient::new(config),
        }
    }

    /// List all schedule ranges, highest priority first (the order the
    /// dashboard displays them in).
    pub async fn list_schedules(&self) -> Result<Vec<ScheduleRange>, ScheduleError> {
        debug!("Fetching schedule ranges");

        let documents = self
            .store
            .list_documents(SCHEDULE_COLLECTION, &[queries::order_desc("priority")])
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;

        documents.into_iter().map(Self::parse_document).collect()
    }

    pub async fn get_schedule(&self, schedule_id: &str) -> Result<ScheduleRange, ScheduleError> {
        let document = self
            .store
            .get_document(SCHEDULE_COLLECTION, schedule_id)
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?
            .ok_or(ScheduleError::NotFound)?;

        Self::parse_document(document)
    }

    /// Create a schedule range. Validation happens before the write; a
    /// rejected range never reaches the store.
    pub async fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleRange, ScheduleError> {
        debug!("Creating schedule range: {}", request.name);

        let priority = request.priority.unwrap_or(DEFAULT_PRIORITY);
        resolver::validate_range(
            &request.name,
            request.start_date,
            request.end_date,
            &request.template,
            priority,
        )?;

        let document = self
            .store
            .create_document(SCHEDULE_COLLECTION, Self::to_document_data(&request, priority)?)
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;

        let schedule = Self::parse_document(document)?;
        debug!("Schedule range created with ID: {}", schedule.id);

        Ok(schedule)
    }

    /// Replace an existing range wholesale. There are no partial patches:
    /// the dashboard always submits the full range.
    pub async fn replace_schedule(
        &self,
        schedule_id: &str,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleRange, ScheduleError> {
        debug!("Replacing schedule range: {}", schedule_id);

        let priority = request.priority.unwrap_or(DEFAULT_PRIORITY);
        resolver::validate_range(
            &request.name,
            request.start_date,
            request.end_date,
            &request.template,
            priority,
        )?;

        self.store
            .get_document(SCHEDULE_COLLECTION, schedule_id)
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?
            .ok_or(ScheduleError::NotFound)?;

        let document = self
            .store
            .update_document(
                SCHEDULE_COLLECTION,
                schedule_id,
                Self::to_document_data(&request, priority)?,
            )
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;

        Self::parse_document(document)
    }

    pub async fn delete_schedule(&self, schedule_id: &str) -> Result<(), ScheduleError> {
        debug!("Deleting schedule range: {}", schedule_id);

        self.store
            .get_document(SCHEDULE_COLLECTION, schedule_id)
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?
            .ok_or(ScheduleError::NotFound)?;

        self.store
            .delete_document(SCHEDULE_COLLECTION, schedule_id)
            .await
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))
    }

    /// Resolve availability for a single date against the stored ranges
    /// and the clinic's standing hours.
    pub async fn resolve_date(&self, date: NaiveDate) -> Result<DayAvailability, ScheduleError> {
        let ranges = self.list_schedules().await?;
        Ok(resolver::resolve(date, &ranges, &WeeklyTemplate::clinic_default()))
    }

    /// Resolve the seven days starting at `start`.
    pub async fn resolve_week(&self, start: NaiveDate) -> Result<Vec<DayAvailability>, ScheduleError> {
        let ranges = self.list_schedules().await?;
        Ok(resolver::resolve_span(start, 7, &ranges, &WeeklyTemplate::clinic_default()))
    }

    pub async fn check_overlaps(&self) -> Result<Vec<OverlapReport>, ScheduleError> {
        let ranges = self.list_schedules().await?;
        Ok(resolver::find_overlaps(&ranges))
    }

    // Private helpers

    fn parse_document(document: Value) -> Result<ScheduleRange, ScheduleError> {
        let record: ScheduleDocument = serde_json::from_value(document)
            .map_err(|e| ScheduleError::DatabaseError(e.to_string()))?;

        ScheduleRange::try_from(record)
    }

    fn to_document_data(
        request: &CreateScheduleRequest,
        priority: i32,
    ) -> Result<Value, ScheduleError> {
        let config = serde_json::to_string(&request.template)
            .map_err(|e| ScheduleError::CorruptConfig(e.to_string()))?;

        Ok(json!({
            "name": request.name,
            "startDate": to_store_datetime(request.start_date),
            "endDate": to_store_datetime(request.end_date),
            "config": config,
            "priority": priority,
        }))
    }
}

/// Calendar dates are stored as midnight-UTC datetimes; reads truncate
/// back to the date.
fn to_store_datetime(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .to_rfc3339()
}
