//! Application context.
//!
//! [`Frontend`] bundles the session store, the route guard and the outbound
//! adapters, and runs the login, registration, logout and navigation flows.
//! Every view-facing failure is a [`DomainError`] whose inline message can be
//! shown next to the form or list that caused it.

use std::sync::Arc;

use pagination::{PageRequest, Paginated};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{FrontendSettings, SettingsError};
use crate::domain::drugs::{DrugLabel, DrugProduct};
use crate::domain::navigation::{MenuItem, menu_for};
use crate::domain::ports::{
    AuthGateway, DrugInformationSource, SessionStorage, SessionStorageError,
};
use crate::domain::records::ResourceRecord;
use crate::domain::routing::{
    DRUGS_PATH, Guard, LOGIN_PATH, Navigation, RedirectReason, RouteDescriptor, RoutingError,
    collection_view_path,
};
use crate::domain::{
    AuthGrant, DomainError, DomainResult, Identity, LoginCredentials, Registration, Role,
    SessionStore,
};
use crate::outbound::openfda::OpenFdaHttpSource;
use crate::outbound::rest::{HttpAuthGateway, RestClient};
use crate::outbound::storage::FileSessionStorage;

/// Startup failures.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// A setting could not be used.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The session state directory could not be opened.
    #[error(transparent)]
    Storage(#[from] SessionStorageError),
    /// An HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl From<RoutingError> for DomainError {
    fn from(value: RoutingError) -> Self {
        Self::internal(value.to_string())
    }
}

/// Self-registration form as typed by the user.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationForm<'a> {
    /// Desired login name.
    pub username: &'a str,
    /// Desired password.
    pub password: &'a str,
    /// Contact address.
    pub email: &'a str,
    /// Requested role.
    pub role: Role,
    /// Optional given name.
    pub first_name: Option<&'a str>,
    /// Optional family name.
    pub last_name: Option<&'a str>,
}

/// The running frontend.
#[derive(Clone)]
pub struct Frontend {
    session: SessionStore,
    guard: Guard,
    rest: RestClient,
    auth: Arc<dyn AuthGateway>,
    drugs: Arc<dyn DrugInformationSource>,
}

impl std::fmt::Debug for Frontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontend")
            .field("session", &self.session)
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}

impl Frontend {
    /// Rehydrate the session from the state directory and build the HTTP
    /// adapters from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError`] when a setting is unusable, the state
    /// directory cannot be opened or an HTTP client cannot be built.
    pub fn start(settings: &FrontendSettings) -> Result<Self, FrontendError> {
        let api_base = settings.api_base_url()?;
        let drug_base = settings.drug_api_base_url()?;
        let timeout = settings.request_timeout();
        let state_dir = settings.state_dir();

        let storage: Arc<dyn SessionStorage> = Arc::new(FileSessionStorage::open(&state_dir)?);
        let session = SessionStore::rehydrate(storage);
        let rest = RestClient::new(&api_base, timeout, session.clone())?;
        let auth = Arc::new(HttpAuthGateway::new(rest.clone()));
        let drugs = Arc::new(OpenFdaHttpSource::new(
            &drug_base,
            settings.drug_api_key().map(str::to_owned),
            timeout,
        )?);

        info!(
            api = %api_base,
            state_dir = %state_dir,
            authenticated = session.is_authenticated(),
            "frontend started"
        );
        Ok(Self::new(session, rest, auth, drugs))
    }

    /// Assemble a context from already built parts.
    #[must_use]
    pub fn new(
        session: SessionStore,
        rest: RestClient,
        auth: Arc<dyn AuthGateway>,
        drugs: Arc<dyn DrugInformationSource>,
    ) -> Self {
        Self {
            session,
            guard: Guard::default(),
            rest,
            auth,
            drugs,
        }
    }

    /// Session store shared with the adapters.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Route guard.
    #[must_use]
    pub const fn guard(&self) -> &Guard {
        &self.guard
    }

    /// REST client.
    #[must_use]
    pub const fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Current identity, if logged in.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    /// Sidebar for the current identity; empty when logged out.
    #[must_use]
    pub fn menu(&self) -> Vec<MenuItem> {
        self.identity()
            .map(|identity| menu_for(identity.role()))
            .unwrap_or_default()
    }

    /// Log in and land on the role home.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] with an inline message when the form is
    /// incomplete or the backend rejects the credentials.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<RouteDescriptor> {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|err| DomainError::invalid_request(err.to_string()))?;
        let grant = self.auth.login(&credentials).await?;
        self.begin_session(grant)
    }

    /// Create an account, log in as it and land on its role home.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] with an inline message when the form is
    /// invalid or the backend rejects the registration.
    pub async fn register(&self, form: RegistrationForm<'_>) -> DomainResult<RouteDescriptor> {
        let registration = LoginCredentials::try_from_parts(form.username, form.password)
            .and_then(|credentials| Registration::try_new(credentials, form.email, form.role))
            .map_err(|err| DomainError::invalid_request(err.to_string()))?
            .with_names(form.first_name, form.last_name);
        let grant = self.auth.register(&registration).await?;
        self.begin_session(grant)
    }

    fn begin_session(&self, grant: AuthGrant) -> DomainResult<RouteDescriptor> {
        let AuthGrant { token, identity } = grant;
        let home = identity.role().home_path();
        if let Err(error) = self.session.login(token, identity) {
            // The in-memory session is live; only the next start is affected.
            warn!(%error, "session will not survive a restart");
        }
        self.navigate(home)
    }

    /// End the session and land on the login view.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] only if the route table cannot render the
    /// login view.
    pub fn logout(&self) -> DomainResult<RouteDescriptor> {
        if let Err(error) = self.session.logout() {
            warn!(%error, "stale session entries may remain on disk");
        }
        self.navigate(LOGIN_PATH)
    }

    /// Follow the guard from `path` to the view that renders.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when redirects do not settle.
    pub fn navigate(&self, path: &str) -> DomainResult<RouteDescriptor> {
        let identity = self.session.identity();
        Ok(*self.guard.resolve(path, identity.as_ref())?)
    }

    /// Fail unless the current session may open the view at `path`.
    fn authorize(&self, path: &str) -> DomainResult<()> {
        match self.guard.navigate(path, &self.session) {
            Navigation::Render(_) => Ok(()),
            Navigation::Redirect {
                reason: RedirectReason::Unauthenticated,
                ..
            } => Err(DomainError::unauthorized(format!("log in to open {path}"))),
            Navigation::Redirect {
                reason: RedirectReason::Forbidden,
                ..
            } => Err(DomainError::forbidden(format!("your role cannot open {path}"))),
            Navigation::Redirect { to, reason } => Err(DomainError::internal(format!(
                "{path} redirected to {to} ({reason})"
            ))),
        }
    }

    /// One page of a collection, optionally narrowed by `search`.
    ///
    /// The session must be allowed to open the view that lists the
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when the session may not open that view, or
    /// for backend failures.
    pub async fn list_page<T: ResourceRecord>(
        &self,
        request: PageRequest,
        search: Option<&str>,
    ) -> DomainResult<Paginated<T>> {
        self.authorize(collection_view_path(T::RESOURCE))?;
        Ok(self
            .rest
            .resource::<T>()
            .list_page(request, search)
            .await?)
    }

    /// Drug products matching `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when the session may not open the drug
    /// view, for a blank name or for drug API failures.
    pub async fn search_drugs(&self, name: &str, limit: u32) -> DomainResult<Vec<DrugProduct>> {
        self.authorize(DRUGS_PATH)?;
        Ok(self.drugs.search_by_name(name, limit).await?)
    }

    /// Label for one product code.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] `NotFound` when no label is published, or
    /// another [`DomainError`] when the session may not open the drug view
    /// or the drug API fails.
    pub async fn drug_details(&self, ndc: &str) -> DomainResult<DrugLabel> {
        self.authorize(DRUGS_PATH)?;
        self.drugs
            .details(ndc)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("no label published for {ndc}")))
    }

    /// Labels whose interaction sections mention every name.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when the session may not open the drug
    /// view, for an empty name list or for drug API failures.
    pub async fn drug_interactions(&self, names: &[String]) -> DomainResult<Vec<DrugLabel>> {
        self.authorize(DRUGS_PATH)?;
        Ok(self.drugs.interactions(names).await?)
    }

    /// Labels for brand `name` listing adverse reactions.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when the session may not open the drug
    /// view, for a blank name or for drug API failures.
    pub async fn drug_adverse_effects(&self, name: &str) -> DomainResult<Vec<DrugLabel>> {
        self.authorize(DRUGS_PATH)?;
        Ok(self.drugs.adverse_effects(name).await?)
    }
}
