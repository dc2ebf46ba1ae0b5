use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// The two result-code endpoints use camelCase keys; they are the documented
// contract shared with the operator tooling and the public site.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequest {
    #[serde(default)]
    pub team_code: String,
    pub room_id: i64,
    pub score: i64,
    pub duration_minutes: i64,
    pub member_count: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub team_code: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub accepted: bool,
    pub entry_id: i64,
    pub team_code: String,
    pub room_id: i64,
    pub score: i64,
    pub duration_minutes: i64,
    pub member_count: i64,
    pub date_stamp: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub room_id: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub team_code: String,
    pub team_name: String,
    pub room_id: i64,
    pub score: i64,
    pub duration_minutes: i64,
    pub member_count: i64,
    pub recorded_at: String,
}
