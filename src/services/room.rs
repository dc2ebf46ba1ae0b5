use crate::db::Db;
use crate::error::AppError;
use crate::models::room::*;
use crate::validation;
use rusqlite::params;

pub fn create_room(db: &Db, req: RoomCreateRequest) -> Result<RoomInfo, AppError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Room name cannot be empty".into()));
    }
    validation::validate_duration(req.duration_minutes)?;
    if req.difficulty < 1 || req.difficulty > 5 {
        return Err(AppError::BadRequest("Difficulty must be 1-5".into()));
    }

    Ok(db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO rooms (name, description, duration_minutes, difficulty)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, req.description, req.duration_minutes, req.difficulty],
        )?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT id, name, description, duration_minutes, difficulty, created_at
             FROM rooms WHERE id = ?1",
            params![id],
            room_from_row,
        )
    })?)
}

pub fn list_rooms(db: &Db) -> Result<Vec<RoomInfo>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, duration_minutes, difficulty, created_at
             FROM rooms ORDER BY id",
        )?;
        let rows = stmt.query_map([], room_from_row)?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(row?);
        }
        Ok(rooms)
    })?)
}

fn room_from_row(row: &rusqlite::Row<'_>) -> Result<RoomInfo, rusqlite::Error> {
    Ok(RoomInfo {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        duration_minutes: row.get(3)?,
        difficulty: row.get(4)?,
        created_at: row.get(5)?,
    })
}
