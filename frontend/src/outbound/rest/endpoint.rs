//! CRUD access to one backend collection, plus the nested endpoints that do
//! not follow the collection pattern.

use std::marker::PhantomData;

use pagination::{PageRequest, Paginated, filter_by_query, paginate};
use serde::Serialize;

use crate::domain::RecordId;
use crate::domain::ports::ApiError;
use crate::domain::records::{
    Availability, AvailabilityDraft, MedicalRecord, ResourceRecord, SortedAppointments, User,
};

use super::client::RestClient;
use super::dto::ListBody;

#[derive(Debug, Serialize)]
struct PageQuery<'a> {
    page: usize,
    per_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

/// Typed view of one collection such as `/departments`.
#[derive(Debug, Clone)]
pub struct ResourceEndpoint<T> {
    client: RestClient,
    record: PhantomData<fn() -> T>,
}

impl<T: ResourceRecord> ResourceEndpoint<T> {
    /// Endpoint for `T`'s collection.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self {
            client,
            record: PhantomData,
        }
    }

    /// Every record in the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.client.get_list(&T::RESOURCE.path(), &()).await
    }

    /// One page of the collection, optionally narrowed by `search`.
    ///
    /// A paginated response is returned as sent. Unpaginated responses are
    /// searched and sliced locally so callers always get the requested page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn list_page(
        &self,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<T>, ApiError> {
        let search = search.map(str::trim).filter(|query| !query.is_empty());
        let query = PageQuery {
            page: request.page(),
            per_page: request.per_page(),
            search,
        };
        let body: ListBody<T> = self.client.fetch_list(&T::RESOURCE.path(), &query).await?;
        Ok(match (body, search) {
            (ListBody::Paginated(page), _) => page,
            (unpaginated, Some(needle)) => {
                paginate(filter_by_query(unpaginated.into_vec(), needle), request)
            }
            (unpaginated, None) => unpaginated.into_page(request),
        })
    }

    /// One record by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the id is unknown, or another
    /// [`ApiError`] for transport, status or decode failures.
    pub async fn get(&self, id: &RecordId) -> Result<T, ApiError> {
        self.client.get(&T::RESOURCE.item_path(id)).await
    }

    /// Create a record and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn create(&self, draft: &T::Draft) -> Result<T, ApiError> {
        self.client.post(&T::RESOURCE.path(), draft).await
    }

    /// Update a record and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn update(&self, id: &RecordId, draft: &T::Draft) -> Result<T, ApiError> {
        self.client.put(&T::RESOURCE.item_path(id), draft).await
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport or status failures.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.client.delete(&T::RESOURCE.item_path(id)).await
    }
}

impl RestClient {
    /// Typed endpoint for `T`'s collection.
    #[must_use]
    pub fn resource<T: ResourceRecord>(&self) -> ResourceEndpoint<T> {
        ResourceEndpoint::new(self.clone())
    }

    /// `GET /users/profile`: the account behind the current token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get("/users/profile").await
    }

    /// `GET /doctors/{id}/availabilities`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn availabilities(&self, doctor: &RecordId) -> Result<Vec<Availability>, ApiError> {
        self.get_list(&format!("/doctors/{doctor}/availabilities"), &())
            .await
    }

    /// `POST /doctors/{id}/availabilities`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn create_availability(
        &self,
        doctor: &RecordId,
        draft: &AvailabilityDraft,
    ) -> Result<Availability, ApiError> {
        self.post(&format!("/doctors/{doctor}/availabilities"), draft)
            .await
    }

    /// `PUT /doctors/{id}/availabilities/{availability}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn update_availability(
        &self,
        doctor: &RecordId,
        availability: &RecordId,
        draft: &AvailabilityDraft,
    ) -> Result<Availability, ApiError> {
        self.put(
            &format!("/doctors/{doctor}/availabilities/{availability}"),
            draft,
        )
        .await
    }

    /// `DELETE /doctors/{id}/availabilities/{availability}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport or status failures.
    pub async fn delete_availability(
        &self,
        doctor: &RecordId,
        availability: &RecordId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/doctors/{doctor}/availabilities/{availability}"))
            .await
    }

    /// `GET /patients/{id}/appointments/sorted`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn patient_appointments(
        &self,
        patient: &RecordId,
    ) -> Result<SortedAppointments, ApiError> {
        self.get(&format!("/patients/{patient}/appointments/sorted"))
            .await
    }

    /// `GET /appointments/doctor/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn doctor_appointments(
        &self,
        doctor: &RecordId,
    ) -> Result<SortedAppointments, ApiError> {
        self.get(&format!("/appointments/doctor/{doctor}")).await
    }

    /// `GET /medical-records/patient/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn patient_records(
        &self,
        patient: &RecordId,
    ) -> Result<Vec<MedicalRecord>, ApiError> {
        self.get_list(&format!("/medical-records/patient/{patient}"), &())
            .await
    }

    /// `GET /doctors/{id}/medical-records`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport, status or decode failures.
    pub async fn doctor_records(&self, doctor: &RecordId) -> Result<Vec<MedicalRecord>, ApiError> {
        self.get_list(&format!("/doctors/{doctor}/medical-records"), &())
            .await
    }
}
