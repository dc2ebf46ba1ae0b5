use crate::codec::SecretKey;
use crate::db::Db;
use crate::error::AppError;
use crate::models::ranking::*;
use crate::services::ranking as service;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn generate_code(
    key: web::types::State<SecretKey>,
    body: web::types::Json<CodeRequest>,
) -> Result<HttpResponse, AppError> {
    let result = service::generate_code(&key, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn submit_result(
    db: web::types::State<Arc<Db>>,
    key: web::types::State<SecretKey>,
    body: web::types::Json<SubmitRequest>,
) -> Result<HttpResponse, AppError> {
    let result = service::submit_result(&db, &key, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn get_leaderboard(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(20);
    let entries = service::get_leaderboard(&db, query.room_id, limit)?;
    Ok(HttpResponse::Ok().json(&entries))
}
