use crate::db::Db;
use crate::error::AppError;
use crate::models::team::*;
use crate::services::team as service;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn register_team(
    db: web::types::State<Arc<Db>>,
    body: web::types::Json<TeamRegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let team = service::register_team(&db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&team))
}

pub async fn get_team(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let team = service::get_team(&db, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(&team))
}

pub async fn rename_team(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
    body: web::types::Json<TeamRenameRequest>,
) -> Result<HttpResponse, AppError> {
    let team = service::rename_team(&db, &path.into_inner(), body.into_inner())?;
    Ok(HttpResponse::Ok().json(&team))
}
