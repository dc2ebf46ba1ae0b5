use crate::db::Db;
use crate::error::AppError;
use crate::models::room::*;
use crate::services::room as service;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn create_room(
    db: web::types::State<Arc<Db>>,
    body: web::types::Json<RoomCreateRequest>,
) -> Result<HttpResponse, AppError> {
    let room = service::create_room(&db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&room))
}

pub async fn list_rooms(db: web::types::State<Arc<Db>>) -> Result<HttpResponse, AppError> {
    let rooms = service::list_rooms(&db)?;
    Ok(HttpResponse::Ok().json(&rooms))
}
