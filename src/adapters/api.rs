use std::sync::Arc;

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::app::services::{DashboardService, ServiceError};
use crate::domain::daily::{AllocationError, DailyRecord};
use crate::domain::formatting::RecentOutage;
use crate::domain::summary::SummaryStatistics;

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<DashboardService>,
    pub location_name: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPointResponse {
    pub date: String,
    pub downtime_hours: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub location: String,
    pub summary: SummaryStatistics,
    pub daily: Vec<DailyPointResponse>,
    pub rolling: Vec<DailyPointResponse>,
    pub recent_outages: Vec<RecentOutage>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub year: Option<i32>,
    pub limit: Option<u32>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(get_dashboard_endpoint)
        .service(get_daily_stats_endpoint)
        .service(get_rolling_stats_endpoint)
        .service(get_summary_stats_endpoint)
        .service(list_recent_outages_endpoint);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/dashboard")]
async fn get_dashboard_endpoint(state: web::Data<ApiState>) -> impl Responder {
    let service = Arc::clone(&state.service);
    match run_pipeline(move || service.dashboard(Utc::now())).await {
        Ok(data) => HttpResponse::Ok().json(DashboardResponse {
            location: state.location_name.clone(),
            summary: data.summary,
            daily: map_daily(data.daily),
            rolling: map_daily(data.rolling),
            recent_outages: data.recent,
        }),
        Err(response) => response,
    }
}

#[get("/stats/daily")]
async fn get_daily_stats_endpoint(state: web::Data<ApiState>) -> impl Responder {
    let service = Arc::clone(&state.service);
    match run_pipeline(move || service.dashboard(Utc::now())).await {
        Ok(data) => HttpResponse::Ok().json(map_daily(data.daily)),
        Err(response) => response,
    }
}

#[get("/stats/rolling")]
async fn get_rolling_stats_endpoint(state: web::Data<ApiState>) -> impl Responder {
    let service = Arc::clone(&state.service);
    match run_pipeline(move || service.dashboard(Utc::now())).await {
        Ok(data) => HttpResponse::Ok().json(map_daily(data.rolling)),
        Err(response) => response,
    }
}

#[get("/stats/summary")]
async fn get_summary_stats_endpoint(state: web::Data<ApiState>) -> impl Responder {
    let service = Arc::clone(&state.service);
    match run_pipeline(move || service.dashboard(Utc::now())).await {
        Ok(data) => HttpResponse::Ok().json(data.summary),
        Err(response) => response,
    }
}

#[get("/outages/recent")]
async fn list_recent_outages_endpoint(
    state: web::Data<ApiState>,
    query: web::Query<RecentQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(5).clamp(1, 100) as usize;
    let year = query.year;

    let service = Arc::clone(&state.service);
    match run_pipeline(move || service.recent(Utc::now(), year, limit)).await {
        Ok(outages) => HttpResponse::Ok().json(outages),
        Err(response) => response,
    }
}

/// Runs the synchronous pipeline (which may fetch over the network) on the
/// blocking worker pool, mapping failures straight to responses.
async fn run_pipeline<T, F>(op: F) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    match web::block(op).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(service_error_response(&error)),
        Err(error) => Err(HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("worker pool unavailable: {error}")
        }))),
    }
}

fn map_daily(records: Vec<DailyRecord>) -> Vec<DailyPointResponse> {
    records
        .into_iter()
        .map(|record| DailyPointResponse {
            date: record.date.format("%Y-%m-%d").to_string(),
            downtime_hours: record.downtime_hours,
        })
        .collect()
}

fn service_error_response(error: &ServiceError) -> HttpResponse {
    match error {
        ServiceError::Source(source) => HttpResponse::BadGateway().json(serde_json::json!({
            "error": format!("upstream fetch failed: {source}")
        })),
        ServiceError::Parse(parse) => HttpResponse::BadGateway().json(serde_json::json!({
            "error": format!("upstream rows are invalid: {parse}")
        })),
        ServiceError::Allocation(AllocationError::EmptyInput) => {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "no outage events recorded yet"
            }))
        }
        ServiceError::Allocation(allocation) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("downtime computation failed: {allocation}")
            }))
        }
    }
}
