//! An in-process stand-in for the marketplace backend.

use std::sync::Mutex;

use actix_web::web::{self, Data, Json, Path};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use tracing_actix_web::TracingLogger;

pub const PREVIEW_PDF: &[u8] = b"%PDF-1.4 contract preview";

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub idempotency_key: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct Recorder {
    pub requests: Vec<RecordedRequest>,
}

pub type Recorded = Data<Mutex<Recorder>>;

impl Recorder {
    fn record(&mut self, req: &HttpRequest, body: Value) {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(String::from)
        };
        self.requests.push(RecordedRequest {
            path: req.path().to_string(),
            authorization: header("authorization"),
            idempotency_key: header("idempotency-key"),
            body,
        });
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests.iter().map(|r| r.path.clone()).collect()
    }
}

fn applicant(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "influencerId": format!("inf-{}", id),
        "name": name,
        "category": "travel",
        "followers": "10k-50k",
        "createdAt": "2024-03-01T10:00:00Z",
        "isAssigned": true
    })
}

async fn list_applicants(req: HttpRequest, body: Json<Value>, recorded: Recorded) -> HttpResponse {
    recorded.lock().unwrap().record(&req, body.0.clone());

    HttpResponse::Ok().json(json!({
        "data": [applicant("a1", "Dana Reyes"), applicant("a2", "Eli Moss")],
        "pagination": {
            "total": 24,
            "page": body["page"],
            "limit": body["limit"],
            "totalPages": 3
        }
    }))
}

async fn get_campaign(
    req: HttpRequest,
    params: Path<String>,
    recorded: Recorded,
) -> HttpResponse {
    recorded.lock().unwrap().record(&req, Value::Null);

    let campaign_id = params.into_inner();
    if campaign_id == "missing" {
        return HttpResponse::NotFound().json(json!({ "message": "Campaign not found" }));
    }

    HttpResponse::Ok().json(json!({
        "id": campaign_id,
        "name": "Summer Launch",
        "brandId": "b1",
        "createdAt": "2024-02-01T09:00:00Z"
    }))
}

async fn preview_contract(
    req: HttpRequest,
    body: Json<Value>,
    recorded: Recorded,
) -> HttpResponse {
    recorded.lock().unwrap().record(&req, body.0);

    HttpResponse::Ok()
        .content_type("application/pdf")
        .body(PREVIEW_PDF)
}

async fn send_contract(req: HttpRequest, body: Json<Value>, recorded: Recorded) -> HttpResponse {
    recorded.lock().unwrap().record(&req, body.0.clone());

    HttpResponse::Ok().json(json!({
        "id": "k1",
        "campaignId": body["campaignId"],
        "applicantId": body["applicantId"],
        "status": "sent",
        "createdAt": "2024-05-17T12:00:00Z"
    }))
}

async fn create_milestone(
    req: HttpRequest,
    body: Json<Value>,
    recorded: Recorded,
) -> HttpResponse {
    recorded.lock().unwrap().record(&req, body.0.clone());

    if !body["amount"].is_number() {
        return HttpResponse::UnprocessableEntity()
            .json(json!({ "message": "amount must be numeric" }));
    }

    HttpResponse::Ok().json(json!({
        "id": "m1",
        "campaignId": body["campaignId"],
        "applicantId": body["applicantId"],
        "title": body["title"],
        "amount": body["amount"],
        "description": body["description"],
        "createdAt": "2024-05-17T12:00:00Z"
    }))
}

/// Starts the backend on an ephemeral port and returns its base url.
pub fn start_backend() -> (String, Recorded) {
    let recorded: Recorded = Data::new(Mutex::new(Recorder::default()));
    let data = recorded.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(TracingLogger::default())
            .route("/campaign/applicants", web::post().to(list_applicants))
            .route("/campaign/{campaign_id}", web::get().to(get_campaign))
            .route("/contract/preview", web::post().to(preview_contract))
            .route("/contract/send", web::post().to(send_contract))
            .route("/milestone/create", web::post().to(create_milestone))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    (format!("http://{}", addr), recorded)
}
