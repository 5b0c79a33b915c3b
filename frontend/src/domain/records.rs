//! Hospital records exchanged with the REST backend.
//!
//! Read models decode leniently: ids may be strings or integers, optional
//! columns may be missing, and dates may carry a time part. Create and update
//! payloads are the `*Draft` structs, which serialise only the fields set.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use pagination::Searchable;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identity::{Identity, RecordId, Username};
use super::role::Role;

/// Collections exposed by the REST backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// `/users`
    Users,
    /// `/doctors`
    Doctors,
    /// `/patients`
    Patients,
    /// `/appointments`
    Appointments,
    /// `/medical-records`
    MedicalRecords,
    /// `/departments`
    Departments,
    /// `/schedules`
    Schedules,
}

impl Resource {
    /// Every collection.
    pub const ALL: [Self; 7] = [
        Self::Users,
        Self::Doctors,
        Self::Patients,
        Self::Appointments,
        Self::MedicalRecords,
        Self::Departments,
        Self::Schedules,
    ];

    /// Collection name as used in URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Doctors => "doctors",
            Self::Patients => "patients",
            Self::Appointments => "appointments",
            Self::MedicalRecords => "medical-records",
            Self::Departments => "departments",
            Self::Schedules => "schedules",
        }
    }

    /// Collection path relative to the API base.
    #[must_use]
    pub fn path(self) -> String {
        format!("/{}", self.as_str())
    }

    /// Path of one record.
    #[must_use]
    pub fn item_path(self, id: &RecordId) -> String {
        format!("/{}/{id}", self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown collection name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource '{value}'")]
pub struct ResourceParseError {
    value: String,
}

impl FromStr for Resource {
    type Err = ResourceParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ResourceParseError {
                value: value.to_owned(),
            })
    }
}

/// Record type served from one [`Resource`] collection.
pub trait ResourceRecord: DeserializeOwned + Searchable + Send + 'static {
    /// Collection holding this record type.
    const RESOURCE: Resource;
    /// Create and update payload.
    type Draft: Serialize + Send + Sync;

    /// Backend id.
    fn id(&self) -> &RecordId;
}

/// `{data, message?, status}` envelope used by some backend responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Payload.
    pub data: T,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP status echoed in the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

mod lenient_date {
    //! `YYYY-MM-DD` dates that may arrive with a time part or blank.
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn parse(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
        let day = raw.trim().split(['T', ' ']).next().unwrap_or_default();
        if day.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(day, "%Y-%m-%d").map(Some)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map_or(Ok(None), |raw| parse(&raw).map_err(serde::de::Error::custom))
    }

    #[expect(
        clippy::ref_option,
        reason = "serde's serialize_with passes a reference to the field"
    )]
    pub(super) fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(day) => serializer.collect_str(&day.format("%Y-%m-%d")),
            None => serializer.serialize_none(),
        }
    }
}

fn present<'a>(fields: &[Option<&'a str>]) -> Vec<&'a str> {
    fields.iter().flatten().copied().collect()
}

/// Account row from `/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend id.
    pub id: RecordId,
    /// Login name.
    pub username: String,
    /// Contact address.
    #[serde(default)]
    pub email: Option<String>,
    /// Account role.
    pub role: Role,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Doctor profile for doctor accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,
    /// Patient profile for patient accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
}

impl User {
    /// `first last`, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts = present(&[self.first_name.as_deref(), self.last_name.as_deref()]);
        let full = parts
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    /// Session identity for this account, if the username is usable.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        Username::new(self.username.clone())
            .ok()
            .map(|username| Identity::new(self.id.clone(), username, self.role))
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = present(&[
            Some(self.username.as_str()),
            self.email.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        ]);
        fields.push(self.role.as_str());
        fields
    }
}

/// Payload for creating or editing a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserDraft {
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Account role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ResourceRecord for User {
    const RESOURCE: Resource = Resource::Users;
    type Draft = UserDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Doctor profile from `/doctors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    /// Backend id.
    pub id: RecordId,
    /// Owning user account.
    #[serde(default)]
    pub user_id: Option<RecordId>,
    /// Department the doctor belongs to.
    #[serde(default)]
    pub department_id: Option<RecordId>,
    /// Clinical specialisation.
    #[serde(default)]
    pub specialization: Option<String>,
    /// Qualifications.
    #[serde(default)]
    pub qualification: Option<String>,
    /// Years in practice.
    #[serde(default)]
    pub experience_years: Option<u32>,
}

impl Searchable for Doctor {
    fn search_fields(&self) -> Vec<&str> {
        present(&[self.specialization.as_deref(), self.qualification.as_deref()])
    }
}

/// Payload for creating or editing a doctor profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DoctorDraft {
    /// Owning user account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
    /// Department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<RecordId>,
    /// Clinical specialisation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    /// Qualifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    /// Years in practice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
}

impl ResourceRecord for Doctor {
    const RESOURCE: Resource = Resource::Doctors;
    type Draft = DoctorDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Patient profile from `/patients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Backend id.
    pub id: RecordId,
    /// Owning user account.
    #[serde(default)]
    pub user_id: Option<RecordId>,
    /// Date of birth.
    #[serde(default, alias = "birth_date", with = "lenient_date")]
    pub date_of_birth: Option<NaiveDate>,
    /// ABO/Rh blood group.
    #[serde(default)]
    pub blood_group: Option<String>,
    /// Gender as recorded.
    #[serde(default)]
    pub gender: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
}

impl Searchable for Patient {
    fn search_fields(&self) -> Vec<&str> {
        present(&[
            self.blood_group.as_deref(),
            self.gender.as_deref(),
            self.phone.as_deref(),
            self.address.as_deref(),
        ])
    }
}

/// Payload for creating or editing a patient profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientDraft {
    /// Owning user account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
    /// Date of birth.
    #[serde(skip_serializing_if = "Option::is_none", with = "lenient_date")]
    pub date_of_birth: Option<NaiveDate>,
    /// Blood group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    /// Gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ResourceRecord for Patient {
    const RESOURCE: Resource = Resource::Patients;
    type Draft = PatientDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Lifecycle of an appointment.
///
/// Canonical spelling is lowercase; capitalised spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Booked and not yet attended.
    #[serde(alias = "Scheduled")]
    Scheduled,
    /// Attended.
    #[serde(alias = "Completed")]
    Completed,
    /// Called off.
    #[serde(alias = "Cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    /// Canonical lowercase spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Appointment from `/appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Backend id.
    pub id: RecordId,
    /// Patient attending.
    #[serde(default)]
    pub patient_id: Option<RecordId>,
    /// Doctor seen.
    #[serde(default)]
    pub doctor_id: Option<RecordId>,
    /// Schedule slot booked.
    #[serde(default)]
    pub schedule_id: Option<RecordId>,
    /// Current status.
    pub status: AppointmentStatus,
    /// Appointment date or timestamp as sent by the backend.
    #[serde(default, alias = "appointment_date")]
    pub date: Option<String>,
}

impl Searchable for Appointment {
    fn search_fields(&self) -> Vec<&str> {
        present(&[Some(self.status.as_str()), self.date.as_deref()])
    }
}

/// Payload for booking or editing an appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentDraft {
    /// Patient attending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<RecordId>,
    /// Doctor seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<RecordId>,
    /// Schedule slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<RecordId>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    /// Appointment date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ResourceRecord for Appointment {
    const RESOURCE: Resource = Resource::Appointments;
    type Draft = AppointmentDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// A patient's appointments split around the current time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedAppointments {
    /// Appointments still to come.
    #[serde(default)]
    pub upcoming: Vec<Appointment>,
    /// Appointments already past.
    #[serde(default)]
    pub past: Vec<Appointment>,
}

/// Consultation record from `/medical-records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    /// Backend id.
    pub id: RecordId,
    /// Patient concerned.
    #[serde(default)]
    pub patient_id: Option<RecordId>,
    /// Author.
    #[serde(default)]
    pub doctor_id: Option<RecordId>,
    /// Consultation this record documents.
    #[serde(default)]
    pub appointment_id: Option<RecordId>,
    /// Diagnosis.
    #[serde(default)]
    pub diagnosis: Option<String>,
    /// Prescription.
    #[serde(default)]
    pub prescription: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Date of the consultation.
    #[serde(default, alias = "visit_date", with = "lenient_date")]
    pub record_date: Option<NaiveDate>,
}

impl Searchable for MedicalRecord {
    fn search_fields(&self) -> Vec<&str> {
        present(&[
            self.diagnosis.as_deref(),
            self.prescription.as_deref(),
            self.notes.as_deref(),
        ])
    }
}

/// Payload for writing or amending a medical record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MedicalRecordDraft {
    /// Patient concerned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<RecordId>,
    /// Author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<RecordId>,
    /// Consultation documented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<RecordId>,
    /// Diagnosis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    /// Prescription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    /// Notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Consultation date.
    #[serde(skip_serializing_if = "Option::is_none", with = "lenient_date")]
    pub record_date: Option<NaiveDate>,
}

impl ResourceRecord for MedicalRecord {
    const RESOURCE: Resource = Resource::MedicalRecords;
    type Draft = MedicalRecordDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Hospital department from `/departments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Backend id.
    pub id: RecordId,
    /// Department name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Searchable for Department {
    fn search_fields(&self) -> Vec<&str> {
        present(&[Some(self.name.as_str()), self.description.as_deref()])
    }
}

/// Payload for creating or renaming a department.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepartmentDraft {
    /// Department name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResourceRecord for Department {
    const RESOURCE: Resource = Resource::Departments;
    type Draft = DepartmentDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Bookable slot from `/schedules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Backend id.
    pub id: RecordId,
    /// Doctor offering the slot.
    #[serde(default)]
    pub doctor_id: Option<RecordId>,
    /// Day label or date.
    #[serde(default)]
    pub day: Option<String>,
    /// Slot start, `HH:MM`.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Slot end, `HH:MM`.
    #[serde(default)]
    pub end_time: Option<String>,
    /// Whether the slot can still be booked.
    #[serde(default)]
    pub is_available: bool,
}

impl Searchable for Schedule {
    fn search_fields(&self) -> Vec<&str> {
        present(&[
            self.day.as_deref(),
            self.start_time.as_deref(),
            self.end_time.as_deref(),
        ])
    }
}

/// Payload for creating or editing a schedule slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleDraft {
    /// Doctor offering the slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<RecordId>,
    /// Day label or date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    /// Slot start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Slot end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Bookable flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl ResourceRecord for Schedule {
    const RESOURCE: Resource = Resource::Schedules;
    type Draft = ScheduleDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Weekly availability window of a doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Backend id.
    pub id: RecordId,
    /// Doctor concerned.
    #[serde(default)]
    pub doctor_id: Option<RecordId>,
    /// Day of week, 0 for Sunday.
    pub day_of_week: u8,
    /// Window start, `HH:MM`.
    pub start_time: String,
    /// Window end, `HH:MM`.
    pub end_time: String,
    /// Whether the window is open for booking.
    #[serde(default)]
    pub is_available: bool,
}

/// Payload for adding or editing an availability window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityDraft {
    /// Day of week, 0 for Sunday.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    /// Window start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Window end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Open flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}
