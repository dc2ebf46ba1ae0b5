use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RoomCreateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i64,
    pub difficulty: i64,
}

#[derive(Debug, Serialize)]
pub struct RoomInfo {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub duration_minutes: i64,
    pub difficulty: i64,
    pub created_at: String,
}
