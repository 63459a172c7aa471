use actix_web::{get, web, HttpResponse, Responder};
use diesel::prelude::*;
use serde_json::json;

use crate::RqDbPool;

/// Health check endpoint for load balancers
#[get("")]
pub async fn health_check(pool: RqDbPool) -> impl Responder {
    match pool.get() {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::ServiceUnavailable().json(json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

/// Readiness check - runs a trivial query off the async workers
#[get("/ready")]
pub async fn readiness_check(pool: RqDbPool) -> impl Responder {
    let pool = pool.into_inner();
    let ready = web::block(move || -> Result<(), String> {
        let mut conn = pool.get().map_err(|e| e.to_string())?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map(|_| ())
            .map_err(|e| e.to_string())
    })
    .await;

    match ready {
        Ok(Ok(())) => HttpResponse::Ok().json(json!({
            "status": "ready",
            "database": "connected"
        })),
        Ok(Err(e)) => {
            log::warn!("Readiness check failed: {}", e);
            not_ready()
        }
        Err(e) => {
            log::warn!("Readiness check could not run: {}", e);
            not_ready()
        }
    }
}

fn not_ready() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({
        "status": "not_ready",
        "database": "disconnected"
    }))
}

/// Liveness check - simple check to see if the app is alive
#[get("/live")]
pub async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/health")
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check)
}
