// libs/schedule-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

// ==============================================================================
// WEEKLY TEMPLATE
// ==============================================================================

/// Opening hours for a single weekday. Closed days keep their last
/// configured times so the dashboard can re-open them without re-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub active: bool,
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
}

impl DayHours {
    pub fn open_between(open: NaiveTime, close: NaiveTime) -> Self {
        Self { active: true, open, close }
    }

    pub fn closed() -> Self {
        Self {
            active: false,
            open: NaiveTime::MIN,
            close: NaiveTime::MIN,
        }
    }
}

/// One entry per weekday, serialized with capitalized day names to match
/// the stored `config` blobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTemplate {
    #[serde(rename = "Monday")]
    pub monday: DayHours,
    #[serde(rename = "Tuesday")]
    pub tuesday: DayHours,
    #[serde(rename = "Wednesday")]
    pub wednesday: DayHours,
    #[serde(rename = "Thursday")]
    pub thursday: DayHours,
    #[serde(rename = "Friday")]
    pub friday: DayHours,
    #[serde(rename = "Saturday")]
    pub saturday: DayHours,
    #[serde(rename = "Sunday")]
    pub sunday: DayHours,
}

impl WeeklyTemplate {
    pub fn day(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn entries(&self) -> [(&'static str, &DayHours); 7] {
        [
            ("Monday", &self.monday),
            ("Tuesday", &self.tuesday),
            ("Wednesday", &self.wednesday),
            ("Thursday", &self.thursday),
            ("Friday", &self.friday),
            ("Saturday", &self.saturday),
            ("Sunday", &self.sunday),
        ]
    }

    /// The clinic's standing hours: weekdays 09:00-17:00, Saturday
    /// mornings, closed on Sunday.
    pub fn clinic_default() -> Self {
        let weekday = DayHours::open_between(hm(9, 0), hm(17, 0));
        Self {
            monday: weekday,
            tuesday: weekday,
            wednesday: weekday,
            thursday: weekday,
            friday: weekday,
            saturday: DayHours::open_between(hm(9, 0), hm(12, 0)),
            sunday: DayHours::closed(),
        }
    }

    pub fn all_closed() -> Self {
        let closed = DayHours::closed();
        Self {
            monday: closed,
            tuesday: closed,
            wednesday: closed,
            thursday: closed,
            friday: closed,
            saturday: closed,
            sunday: closed,
        }
    }
}

impl Default for WeeklyTemplate {
    fn default() -> Self {
        Self::clinic_default()
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid wall-clock time")
}

// ==============================================================================
// SCHEDULE RANGES
// ==============================================================================

pub const DEFAULT_PRIORITY: i32 = 10;

/// A dated override of the weekly template. Spans are inclusive calendar
/// dates; overlapping spans are allowed and resolved by priority at read
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRange {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub template: WeeklyTemplate,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

impl ScheduleRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Store shape of a `clinic_schedules` document. The weekly template
/// travels as a JSON-encoded string in `config` and only becomes typed
/// here, at the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    pub name: String,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<Utc>,
    pub config: String,
    pub priority: i32,
}

impl TryFrom<ScheduleDocument> for ScheduleRange {
    type Error = ScheduleError;

    fn try_from(doc: ScheduleDocument) -> Result<Self, Self::Error> {
        let template: WeeklyTemplate = serde_json::from_str(&doc.config)
            .map_err(|e| ScheduleError::CorruptConfig(e.to_string()))?;

        Ok(Self {
            id: doc.id,
            name: doc.name,
            start_date: doc.start_date.date_naive(),
            end_date: doc.end_date.date_naive(),
            template,
            priority: doc.priority,
            created_at: doc.created_at,
        })
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub template: WeeklyTemplate,
    pub priority: Option<i32>,
}

/// Resolved availability for a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub is_open: bool,
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub open: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub close: Option<NaiveTime>,
    pub source: String,
}

/// A pair of ranges whose date spans intersect. Surfaced to the dashboard
/// as a warning; never rejected on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapReport {
    pub first_id: String,
    pub first_name: String,
    pub second_id: String,
    pub second_name: String,
    pub overlap_start: NaiveDate,
    pub overlap_end: NaiveDate,
    pub same_priority: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum ScheduleError {
    #[error("Schedule range not found")]
    NotFound,

    #[error("End date must not be before start date")]
    InvalidDateRange,

    #[error("{day}: opening time must be before closing time")]
    InvalidHours { day: String },

    #[error("Priority must not be negative")]
    NegativePriority,

    #[error("Schedule name must not be empty")]
    EmptyName,

    #[error("Stored weekly configuration is corrupt: {0}")]
    CorruptConfig(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

// ==============================================================================
// SERDE HELPERS ("HH:MM" wall-clock times)
// ==============================================================================

pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        value
            .map(|s| NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
