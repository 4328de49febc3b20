use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, ResponseError};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::RosterError;
use crate::model::{Attendance, NewParticipant, ParticipantPatch, Role};
use crate::roster::{GenerateOptions, Roster};
use crate::schedule::{CentralChoice, ServiceTime};

impl ResponseError for RosterError {
    fn status_code(&self) -> StatusCode {
        match self {
            RosterError::NotFound { .. } => StatusCode::NOT_FOUND,
            RosterError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({"success": false, "error": self.to_string()}))
    }
}

type ApiResult = Result<HttpResponse, RosterError>;

/// Runs store work on actix's blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, RosterError>
where
    F: FnOnce() -> Result<T, RosterError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| RosterError::Storage(format!("blocking task failed: {}", e)))?
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub start_date: Option<String>,
    pub weekly_count: Option<usize>,
    pub central_mass_mode: Option<String>,
    pub central_mass_time: Option<String>,
}

/// Validates a generate request and turns it into run options
pub fn validate_generate(req: &GenerateRequest) -> Result<GenerateOptions, String> {
    let start = match req.start_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            // Accept full ISO timestamps by keeping the date part
            let date_part = raw.split_once('T').map_or(raw, |(date, _)| date);
            Some(
                NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid startDate: {}", raw))?,
            )
        }
    };

    if req.weekly_count == Some(0) {
        return Err("weeklyCount must be at least 1".to_string());
    }

    let random = match req.central_mass_mode.as_deref() {
        Some("random") => true,
        None | Some("manual") => false,
        Some(other) => return Err(format!("Invalid centralMassMode: {}", other)),
    };

    let time = match req.central_mass_time.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<ServiceTime>().map_err(|e| e.to_string())?),
    };

    Ok(GenerateOptions {
        start,
        per_mass: req.weekly_count,
        central: CentralChoice::from_request(random, time),
    })
}

async fn generate(req: web::Json<GenerateRequest>, roster: web::Data<Roster>) -> ApiResult {
    let options = validate_generate(&req).map_err(RosterError::Validation)?;
    let report = blocking(move || roster.generate(&options, &mut rand::thread_rng())).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": report.count,
        "startDate": report.start,
        "endDate": report.end,
        "warnings": report.warnings(),
    })))
}

async fn get_schedule(roster: web::Data<Roster>) -> ApiResult {
    let records = blocking(move || roster.assignments()).await?;
    Ok(HttpResponse::Ok().json(records))
}

async fn list_users(roster: web::Data<Roster>) -> ApiResult {
    let users = blocking(move || roster.participants()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub limitations: Option<Vec<String>>,
}

async fn create_user(req: web::Json<CreateUserRequest>, roster: web::Data<Roster>) -> ApiResult {
    let req = req.into_inner();
    let (name, role) = match (req.name, req.role) {
        (Some(name), Some(role)) if !name.trim().is_empty() && !role.trim().is_empty() => (name, role),
        _ => {
            return Err(RosterError::Validation(
                "Name and Role are required".to_string(),
            ))
        }
    };
    let role = role.parse::<Role>().map_err(RosterError::Validation)?;

    let new = NewParticipant {
        name,
        role,
        is_active: req.is_active != Some(false),
        limitations: req.limitations.unwrap_or_default(),
    };
    let participant = blocking(move || roster.add_participant(new)).await?;
    Ok(HttpResponse::Created().json(participant))
}

async fn update_user(
    id: web::Path<String>,
    patch: web::Json<ParticipantPatch>,
    roster: web::Data<Roster>,
) -> ApiResult {
    let id = id.into_inner();
    let patch = patch.into_inner();
    blocking(move || roster.update_participant(&id, &patch)).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub id: Option<String>,
    pub status: Option<String>,
}

async fn update_attendance(
    req: web::Json<AttendanceRequest>,
    roster: web::Data<Roster>,
) -> ApiResult {
    let req = req.into_inner();
    let (id, status) = match (req.id, req.status) {
        (Some(id), Some(status)) if !id.is_empty() && !status.is_empty() => (id, status),
        _ => return Err(RosterError::Validation("Missing id or status".to_string())),
    };
    let status = status.parse::<Attendance>().map_err(RosterError::Validation)?;

    blocking(move || roster.set_attendance(&id, status)).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn setup(roster: web::Data<Roster>) -> ApiResult {
    blocking(move || roster.initialize()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Database initialized successfully!"
    })))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    RosterError::Validation(format!("Invalid request body: {}", err)).into()
}

/// Registers the API routes; shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/api/generate", web::post().to(generate))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/users", web::get().to(list_users))
        .route("/api/users", web::post().to(create_user))
        .route("/api/users/{id}", web::patch().to(update_user))
        .route("/api/attendance", web::patch().to(update_attendance))
        .route("/api/setup", web::post().to(setup));
}

pub async fn start_server(bind_address: &str, port: u16, roster: Roster) -> std::io::Result<()> {
    let roster = web::Data::new(roster);
    info!(bind_address, port, "starting web server");

    HttpServer::new(move || {
        App::new()
            .app_data(roster.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((bind_address, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_means_random_next_week() {
        let options = validate_generate(&GenerateRequest::default()).unwrap();
        assert_eq!(options.start, None);
        assert_eq!(options.central, CentralChoice::Random);
        assert_eq!(options.per_mass, None);
    }

    #[test]
    fn manual_mode_needs_a_time_to_stick() {
        let req = GenerateRequest {
            central_mass_mode: Some("manual".into()),
            central_mass_time: Some("12:00".into()),
            start_date: Some("2025-12-22T00:00:00.000Z".into()),
            weekly_count: Some(2),
        };
        let options = validate_generate(&req).unwrap();
        assert_eq!(options.central, CentralChoice::Manual("12:00".parse().unwrap()));
        assert_eq!(options.start, NaiveDate::from_ymd_opt(2025, 12, 22));

        let no_time = GenerateRequest {
            central_mass_mode: Some("manual".into()),
            ..Default::default()
        };
        assert_eq!(validate_generate(&no_time).unwrap().central, CentralChoice::Random);
    }

    #[test]
    fn time_without_mode_is_manual() {
        let req = GenerateRequest {
            central_mass_time: Some("12:00".into()),
            ..Default::default()
        };
        assert_eq!(
            validate_generate(&req).unwrap().central,
            CentralChoice::Manual("12:00".parse().unwrap())
        );

        let random = GenerateRequest {
            central_mass_mode: Some("random".into()),
            central_mass_time: Some("12:00".into()),
            ..Default::default()
        };
        assert_eq!(validate_generate(&random).unwrap().central, CentralChoice::Random);
    }

    #[test]
    fn rejects_bad_fields() {
        let bad_mode = GenerateRequest {
            central_mass_mode: Some("sometimes".into()),
            ..Default::default()
        };
        assert!(validate_generate(&bad_mode).is_err());

        let bad_date = GenerateRequest {
            start_date: Some("next monday".into()),
            ..Default::default()
        };
        assert!(validate_generate(&bad_date).is_err());

        let trailing = GenerateRequest {
            start_date: Some("2025-12-22garbage".into()),
            ..Default::default()
        };
        assert!(validate_generate(&trailing).is_err());

        let zero = GenerateRequest {
            weekly_count: Some(0),
            ..Default::default()
        };
        assert!(validate_generate(&zero).is_err());
    }
}
