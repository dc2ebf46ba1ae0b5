use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TeamRegisterRequest {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamRenameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TeamInfo {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub members: Vec<String>,
}
