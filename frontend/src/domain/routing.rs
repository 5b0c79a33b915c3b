//! Route authorisation guard.
//!
//! Every navigation passes through [`Guard::navigate`], which decides from
//! the route table and the session store whether the destination renders or
//! the caller is sent elsewhere. The decision is evaluated once per
//! navigation; a later login or logout does not re-check a view that already
//! rendered.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::identity::Identity;
use super::records::Resource;
use super::role::Role;
use super::session::SessionStore;

/// Path of the login view; the destination for unauthenticated callers.
pub const LOGIN_PATH: &str = "/login";

/// Path of the registration view.
pub const REGISTER_PATH: &str = "/register";

/// Application root; resolves to the caller's role home.
pub const ROOT_PATH: &str = "/";

/// Path of the drug information view.
pub const DRUGS_PATH: &str = "/drugs";

/// Redirects followed by [`Guard::resolve`] before giving up.
pub const MAX_REDIRECT_HOPS: usize = 4;

/// Every destination the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Credential form.
    Login,
    /// Account creation form.
    Register,
    /// Administrator landing page.
    AdminDashboard,
    /// Department list and editor.
    DepartmentManagement,
    /// User account list and editor.
    UserManagement,
    /// Doctor landing page.
    DoctorDashboard,
    /// Doctor's own profile.
    DoctorProfile,
    /// Doctor's weekly availability.
    DoctorAvailability,
    /// Medical records written by the doctor.
    MedicalRecords,
    /// Patient landing page.
    PatientDashboard,
    /// Patient's own profile.
    PatientProfile,
    /// Appointment booking form.
    BookAppointment,
    /// Appointment list for the current user.
    Appointments,
    /// Profile of the current user, whatever the role.
    Profile,
    /// Public drug information lookup.
    DrugSearch,
}

/// Who may render a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Rendered without any session check.
    Public,
    /// Requires a session; a non-empty role set also restricts the role.
    Protected(&'static [Role]),
}

impl RouteAccess {
    /// Any authenticated role.
    pub const AUTHENTICATED: Self = Self::Protected(&[]);

    /// Whether `role` satisfies the role restriction, ignoring the session
    /// check.
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        match self {
            Self::Public => true,
            Self::Protected(roles) => roles.is_empty() || roles.contains(&role),
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Normalised path.
    pub path: &'static str,
    /// View rendered at the path.
    pub view: View,
    /// Access rule.
    pub access: RouteAccess,
}

impl RouteDescriptor {
    /// Describe a route.
    #[must_use]
    pub const fn new(path: &'static str, view: View, access: RouteAccess) -> Self {
        Self { path, view, access }
    }
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const DOCTOR_ONLY: &[Role] = &[Role::Doctor];
const PATIENT_ONLY: &[Role] = &[Role::Patient];
const CLINICAL: &[Role] = &[Role::Admin, Role::Doctor];

const STANDARD_ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor::new(LOGIN_PATH, View::Login, RouteAccess::Public),
    RouteDescriptor::new(REGISTER_PATH, View::Register, RouteAccess::Public),
    RouteDescriptor::new("/admin", View::AdminDashboard, RouteAccess::Protected(ADMIN_ONLY)),
    RouteDescriptor::new(
        "/admin/departments",
        View::DepartmentManagement,
        RouteAccess::Protected(ADMIN_ONLY),
    ),
    RouteDescriptor::new("/admin/users", View::UserManagement, RouteAccess::Protected(ADMIN_ONLY)),
    RouteDescriptor::new("/doctor", View::DoctorDashboard, RouteAccess::Protected(DOCTOR_ONLY)),
    RouteDescriptor::new(
        "/doctor/profile",
        View::DoctorProfile,
        RouteAccess::Protected(DOCTOR_ONLY),
    ),
    RouteDescriptor::new(
        "/doctor/availability",
        View::DoctorAvailability,
        RouteAccess::Protected(DOCTOR_ONLY),
    ),
    RouteDescriptor::new(
        "/doctor/medical-records",
        View::MedicalRecords,
        RouteAccess::Protected(DOCTOR_ONLY),
    ),
    RouteDescriptor::new("/patient", View::PatientDashboard, RouteAccess::Protected(PATIENT_ONLY)),
    RouteDescriptor::new(
        "/patient/profile",
        View::PatientProfile,
        RouteAccess::Protected(PATIENT_ONLY),
    ),
    RouteDescriptor::new(
        "/patient/book-appointment",
        View::BookAppointment,
        RouteAccess::Protected(PATIENT_ONLY),
    ),
    RouteDescriptor::new("/appointments", View::Appointments, RouteAccess::AUTHENTICATED),
    RouteDescriptor::new("/profile", View::Profile, RouteAccess::AUTHENTICATED),
    RouteDescriptor::new(DRUGS_PATH, View::DrugSearch, RouteAccess::Protected(CLINICAL)),
];

/// View through which `resource` is listed.
///
/// Doctors, patients and schedules are read while booking or reviewing
/// appointments, so they follow the shared appointments route.
#[must_use]
pub const fn collection_view_path(resource: Resource) -> &'static str {
    match resource {
        Resource::Users => "/admin/users",
        Resource::Departments => "/admin/departments",
        Resource::MedicalRecords => "/doctor/medical-records",
        Resource::Appointments | Resource::Doctors | Resource::Patients | Resource::Schedules => {
            "/appointments"
        }
    }
}

/// Errors raised while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    /// A path was not already in normalised form.
    #[error("route path '{path}' is not normalised (expected '{expected}')")]
    NotNormalised {
        /// Path as declared.
        path: &'static str,
        /// Normalised spelling.
        expected: String,
    },
    /// The root path is reserved for role-home resolution.
    #[error("route table must not declare the root path")]
    RootDeclared,
    /// Two routes share a path.
    #[error("route path '{path}' declared twice")]
    Duplicate {
        /// Repeated path.
        path: &'static str,
    },
    /// A role's home path has no route that admits that role.
    #[error("no route at '{path}' renders for role {role}")]
    MissingHome {
        /// Role without a home.
        role: Role,
        /// Expected home path.
        path: &'static str,
    },
}

/// Immutable lookup from normalised path to route.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<&'static str, RouteDescriptor>,
}

impl RouteTable {
    /// Validate and index a set of routes.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError`] when a path is not normalised, repeats,
    /// claims the root, or a role's home path is missing or excludes that
    /// role.
    pub fn new(routes: &[RouteDescriptor]) -> Result<Self, RouteTableError> {
        let mut indexed = HashMap::with_capacity(routes.len());
        for route in routes {
            let expected = normalize_path(route.path);
            if expected == ROOT_PATH {
                return Err(RouteTableError::RootDeclared);
            }
            if expected != route.path {
                return Err(RouteTableError::NotNormalised {
                    path: route.path,
                    expected,
                });
            }
            if indexed.insert(route.path, *route).is_some() {
                return Err(RouteTableError::Duplicate { path: route.path });
            }
        }
        for role in Role::ALL {
            let path = role.home_path();
            let renders = indexed
                .get(path)
                .is_some_and(|route: &RouteDescriptor| route.access.admits(role));
            if !renders {
                return Err(RouteTableError::MissingHome { role, path });
            }
        }
        Ok(Self { routes: indexed })
    }

    /// The application's route table.
    #[must_use]
    pub fn standard() -> Self {
        let routes = STANDARD_ROUTES
            .iter()
            .map(|route| (route.path, *route))
            .collect();
        Self { routes }
    }

    /// Route at an already normalised path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&RouteDescriptor> {
        self.routes.get(path)
    }

    /// Every route, sorted by path.
    #[must_use]
    pub fn routes(&self) -> Vec<&RouteDescriptor> {
        let mut routes: Vec<_> = self.routes.values().collect();
        routes.sort_by_key(|route| route.path);
        routes
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Canonical spelling of a navigation target.
///
/// Drops any query string or fragment, collapses repeated slashes and
/// removes a trailing slash. An empty input is the root.
///
/// # Examples
/// ```
/// use frontend::domain::routing::normalize_path;
///
/// assert_eq!(normalize_path("//admin/users/?tab=2"), "/admin/users");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let path = raw
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
    if segments.is_empty() {
        return ROOT_PATH.to_owned();
    }
    format!("/{}", segments.join("/"))
}

/// Why the guard refused to render the requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// No session; sent to the login view.
    Unauthenticated,
    /// Session role not allowed; sent to the role home.
    Forbidden,
    /// No route matched; sent to the root.
    UnknownPath,
    /// The root was requested; sent to the role home.
    Root,
}

impl RedirectReason {
    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::UnknownPath => "unknown_path",
            Self::Root => "root",
        }
    }
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation<'a> {
    /// Render the route.
    Render(&'a RouteDescriptor),
    /// Navigate to `to` instead.
    Redirect {
        /// Redirect target.
        to: String,
        /// Why the requested path did not render.
        reason: RedirectReason,
    },
}

/// Failure to settle on a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Redirects did not converge within [`MAX_REDIRECT_HOPS`].
    #[error("redirects from '{path}' did not settle after {hops} hops")]
    RedirectLoop {
        /// Originally requested path.
        path: String,
        /// Hops followed.
        hops: usize,
    },
}

/// Route authorisation guard over a route table.
#[derive(Debug, Clone, Default)]
pub struct Guard {
    table: RouteTable,
}

impl Guard {
    /// Guard the given table.
    #[must_use]
    pub const fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Guarded route table.
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide whether `path` renders for the current session.
    ///
    /// Reads the store once; it never mutates it.
    #[must_use]
    pub fn navigate(&self, path: &str, session: &SessionStore) -> Navigation<'_> {
        self.navigate_as(path, session.identity().as_ref())
    }

    /// Decide whether `path` renders for `identity`.
    ///
    /// # Examples
    /// ```
    /// use frontend::domain::routing::{Guard, Navigation, RedirectReason};
    ///
    /// let guard = Guard::default();
    /// assert_eq!(
    ///     guard.navigate_as("/admin/users", None),
    ///     Navigation::Redirect { to: "/login".into(), reason: RedirectReason::Unauthenticated }
    /// );
    /// ```
    #[must_use]
    pub fn navigate_as(&self, path: &str, identity: Option<&Identity>) -> Navigation<'_> {
        let normalised = normalize_path(path);
        let route = self.table.get(&normalised);

        if let Some(route) = route.filter(|route| route.access == RouteAccess::Public) {
            return Navigation::Render(route);
        }
        let Some(identity) = identity else {
            return redirect(&normalised, LOGIN_PATH, RedirectReason::Unauthenticated);
        };
        let role = identity.role();
        if normalised == ROOT_PATH {
            return redirect(&normalised, role.home_path(), RedirectReason::Root);
        }
        match route {
            None => redirect(&normalised, ROOT_PATH, RedirectReason::UnknownPath),
            Some(route) if route.access.admits(role) => Navigation::Render(route),
            Some(_) => redirect(&normalised, role.home_path(), RedirectReason::Forbidden),
        }
    }

    /// Follow redirects from `path` until a route renders.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::RedirectLoop`] when no route renders within
    /// [`MAX_REDIRECT_HOPS`] redirects.
    pub fn resolve(
        &self,
        path: &str,
        identity: Option<&Identity>,
    ) -> Result<&RouteDescriptor, RoutingError> {
        let mut current = path.to_owned();
        for _ in 0..=MAX_REDIRECT_HOPS {
            match self.navigate_as(&current, identity) {
                Navigation::Render(route) => return Ok(route),
                Navigation::Redirect { to, .. } => current = to,
            }
        }
        Err(RoutingError::RedirectLoop {
            path: path.to_owned(),
            hops: MAX_REDIRECT_HOPS,
        })
    }
}

fn redirect(from: &str, to: &str, reason: RedirectReason) -> Navigation<'static> {
    debug!(from, to, reason = reason.as_str(), "navigation redirected");
    Navigation::Redirect {
        to: to.to_owned(),
        reason,
    }
}
