//! REST adapter tests against an in-process backend.
//!
//! An actix-web app bound to an ephemeral port stands in for the hospital
//! API so the reqwest adapters are exercised end to end: bearer headers,
//! envelope unwrapping, pagination shapes and status mapping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::{Server, ServerHandle};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use frontend::domain::ports::{ApiError, AuthGateway, InMemorySessionStorage};
use frontend::domain::records::{Availability, AvailabilityDraft, Department};
use frontend::domain::{LoginCredentials, RecordId, Role, SessionStore};
use frontend::outbound::rest::{HttpAuthGateway, RestClient};
use pagination::PageRequest;
use reqwest::Url;
use rstest::rstest;
use serde_json::{Value, json};

const TOKEN: &str = "tok-admin-1";

#[derive(Default)]
struct Seen {
    authorization: Mutex<Vec<Option<String>>>,
}

impl Seen {
    fn record(&self, req: &HttpRequest) {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        self.authorization
            .lock()
            .expect("seen lock")
            .push(header);
    }

    fn last(&self) -> Option<String> {
        self.authorization
            .lock()
            .expect("seen lock")
            .last()
            .cloned()
            .flatten()
    }
}

fn departments() -> Value {
    json!([
        {"id": 1, "name": "Cardiology", "description": "Heart care"},
        {"id": 2, "name": "Neurology", "description": null},
        {"id": "3", "name": "Oncology"}
    ])
}

fn authorised(req: &HttpRequest) -> bool {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

async fn login(body: web::Json<Value>) -> HttpResponse {
    if body.get("password").and_then(Value::as_str) == Some("secret") {
        HttpResponse::Ok().json(json!({
            "data": {
                "token": TOKEN,
                "user": {"id": 1, "username": "admin", "role": "Admin", "email": "a@h.test"}
            },
            "message": "Login successful"
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({"message": "Invalid credentials"}))
    }
}

async fn list_departments(
    req: HttpRequest,
    seen: web::Data<Seen>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    seen.record(&req);
    if !authorised(&req) {
        return HttpResponse::Unauthorized().json(json!({"error": "missing token"}));
    }
    // Searches come back unfiltered, as from a backend that ignores them.
    if query.contains_key("search") || !query.contains_key("page") {
        return HttpResponse::Ok().json(departments());
    }
    HttpResponse::Ok().json(json!({
        "data": [{"id": 3, "name": "Oncology"}],
        "total": 3,
        "page": 2,
        "per_page": 2,
        "total_pages": 2
    }))
}

async fn get_department(req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    if !authorised(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    match path.as_str() {
        "1" => HttpResponse::Ok().json(json!({
            "data": {"id": 1, "name": "Cardiology"},
            "status": 200
        })),
        _ => HttpResponse::NotFound().json(json!({"message": "Department not found"})),
    }
}

async fn delete_department(req: HttpRequest) -> HttpResponse {
    if authorised(&req) {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::Forbidden().body("nope")
    }
}

async fn list_availabilities(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "data": [{
            "id": 11,
            "doctor_id": path.into_inner(),
            "day_of_week": 1,
            "start_time": "09:00",
            "end_time": "12:00",
            "is_available": true
        }]
    }))
}

async fn create_availability(
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut created = body.into_inner();
    if let Some(object) = created.as_object_mut() {
        object.insert("id".to_owned(), json!(12));
        object.insert("doctor_id".to_owned(), json!(path.into_inner()));
    }
    HttpResponse::Created().json(created)
}

async fn failing_profile() -> HttpResponse {
    HttpResponse::InternalServerError().body("<html>  upstream\n exploded </html>")
}

fn start_backend(seen: web::Data<Seen>) -> (Url, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(move || {
        App::new().app_data(seen.clone()).service(
            web::scope("/api")
                .route("/auth/login", web::post().to(login))
                .route("/departments", web::get().to(list_departments))
                .route("/departments/{id}", web::get().to(get_department))
                .route("/departments/{id}", web::delete().to(delete_department))
                .route(
                    "/doctors/{id}/availabilities",
                    web::get().to(list_availabilities),
                )
                .route(
                    "/doctors/{id}/availabilities",
                    web::post().to(create_availability),
                )
                .route("/users/profile", web::get().to(failing_profile)),
        )
    })
    .workers(1)
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let base = Url::parse(&format!("http://{addr}/api")).expect("base url");
    (base, server)
}

struct Harness {
    seen: web::Data<Seen>,
    session: SessionStore,
    client: RestClient,
    handle: ServerHandle,
}

impl Harness {
    fn start() -> Self {
        let seen = web::Data::new(Seen::default());
        let (base, server) = start_backend(seen.clone());
        let handle = server.handle();
        actix_web::rt::spawn(server);
        let session = SessionStore::rehydrate(Arc::new(InMemorySessionStorage::default()));
        let client =
            RestClient::new(&base, Duration::from_secs(5), session.clone()).expect("client");
        Self {
            seen,
            session,
            client,
            handle,
        }
    }

    async fn log_in(&self) {
        let gateway = HttpAuthGateway::new(self.client.clone());
        let credentials = LoginCredentials::try_from_parts("admin", "secret").expect("creds");
        let grant = gateway.login(&credentials).await.expect("login succeeds");
        self.session
            .login(grant.token, grant.identity)
            .expect("session persists");
    }

    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

#[rstest]
#[actix_rt::test]
async fn login_unwraps_the_enveloped_grant() {
    let harness = Harness::start();
    harness.log_in().await;

    let identity = harness.session.identity().expect("identity stored");
    assert_eq!(identity.username().as_ref(), "admin");
    assert_eq!(identity.role(), Role::Admin);
    assert_eq!(identity.id().as_ref(), "1");
    assert_eq!(
        harness.session.token().map(|token| token.expose().to_owned()),
        Some(TOKEN.to_owned())
    );
    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn rejected_login_carries_the_server_message() {
    let harness = Harness::start();
    let gateway = HttpAuthGateway::new(harness.client.clone());
    let credentials = LoginCredentials::try_from_parts("admin", "wrong").expect("creds");

    let err = gateway.login(&credentials).await.expect_err("login rejected");
    assert_eq!(err, ApiError::unauthorized("Invalid credentials"));
    assert!(!harness.session.is_authenticated());
    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn requests_carry_the_session_bearer_token() {
    let harness = Harness::start();
    let endpoint = harness.client.resource::<Department>();

    let err = endpoint.list().await.expect_err("anonymous list rejected");
    assert_eq!(err, ApiError::unauthorized("missing token"));
    assert_eq!(harness.seen.last(), None);

    harness.log_in().await;
    let rows = endpoint.list().await.expect("list succeeds");
    assert_eq!(rows.len(), 3);
    assert_eq!(harness.seen.last(), Some(format!("Bearer {TOKEN}")));
    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn paginated_responses_are_returned_as_sent() {
    let harness = Harness::start();
    harness.log_in().await;

    let request = PageRequest::new(2, 2).expect("page request");
    let page = harness
        .client
        .resource::<Department>()
        .list_page(request, None)
        .await
        .expect("page");
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.display_range().to_string(), "Showing 3-3 of 3 items");
    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn unfiltered_responses_are_searched_locally() {
    let harness = Harness::start();
    harness.log_in().await;

    let page = harness
        .client
        .resource::<Department>()
        .list_page(PageRequest::default(), Some("  HEART "))
        .await
        .expect("page");
    assert_eq!(page.total, 1);
    assert_eq!(
        page.data.first().map(|row| row.name.as_str()),
        Some("Cardiology")
    );
    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn single_records_and_missing_ids_map_cleanly() {
    let harness = Harness::start();
    harness.log_in().await;
    let endpoint = harness.client.resource::<Department>();

    let found = endpoint
        .get(&RecordId::new("1").expect("id"))
        .await
        .expect("department");
    assert_eq!(found.name, "Cardiology");

    let err = endpoint
        .get(&RecordId::new("99").expect("id"))
        .await
        .expect_err("missing");
    assert_eq!(err, ApiError::not_found("Department not found"));

    endpoint
        .delete(&RecordId::new("2").expect("id"))
        .await
        .expect("delete succeeds with an empty body");
    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn availability_windows_round_the_nested_endpoint() {
    let harness = Harness::start();
    harness.log_in().await;
    let doctor = RecordId::new("5").expect("id");

    let windows: Vec<Availability> = harness
        .client
        .availabilities(&doctor)
        .await
        .expect("availabilities");
    assert_eq!(windows.len(), 1);
    assert_eq!(
        windows.first().and_then(|w| w.doctor_id.clone()),
        Some(doctor.clone())
    );

    let draft = AvailabilityDraft {
        day_of_week: Some(3),
        start_time: Some("14:00".to_owned()),
        end_time: Some("17:00".to_owned()),
        is_available: Some(true),
    };
    let created = harness
        .client
        .create_availability(&doctor, &draft)
        .await
        .expect("created");
    assert_eq!(created.id.as_ref(), "12");
    assert_eq!(created.day_of_week, 3);
    assert_eq!(created.start_time, "14:00");
    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn server_errors_without_json_use_a_compact_preview() {
    let harness = Harness::start();
    harness.log_in().await;

    let err = harness.client.profile().await.expect_err("profile fails");
    assert_eq!(
        err,
        ApiError::backend("status 500: <html> upstream exploded </html>")
    );
    harness.stop().await;
}
