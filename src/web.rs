use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use std::sync::Mutex;

use crate::seating::{generate_seating, ScheduleResult, SeatingError, SeatingRequest};

/// In-memory storage for the last generated seating. Callers serialize
/// scheduling per event themselves; this mutex only guards the slot.
pub struct AppState {
    pub seating: Mutex<Option<ScheduleResult>>,
}

// Seating generation endpoint. Validation problems come back as 400;
// a scheduling dead end is a 500. Soft solver failures are handled inside
// the pipeline and never surface here.
async fn post_seating(
    req: web::Json<SeatingRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    match generate_seating(&req) {
        Ok(result) => {
            *state.seating.lock().unwrap() = Some(result.clone());
            Ok(HttpResponse::Ok().json(result))
        }
        Err(err @ SeatingError::Validation(_)) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": err.to_string()}))),
        Err(err @ SeatingError::Infeasible(_)) => Ok(HttpResponse::InternalServerError()
            .json(serde_json::json!({"success": false, "error": err.to_string()}))),
    }
}

// Last generated seating endpoint.
async fn get_seating(state: web::Data<AppState>) -> Result<HttpResponse> {
    let seating = state.seating.lock().unwrap();
    if let Some(ref result) = *seating {
        Ok(HttpResponse::Ok().json(result))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No seating generated yet"})))
    }
}

pub async fn start_server(port: u16) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        seating: Mutex::new(None),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .route("/api/seating", web::post().to(post_seating))
            .route("/api/seating", web::get().to(get_seating))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
