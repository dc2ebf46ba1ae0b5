use crate::error::{AppError, ErrorKind};

const MAX_TEAM_NAME_LEN: usize = 64;
const MAX_MEMBERS: usize = 10;

/// Non-empty check for the submission flow; empty input is a `MissingField`
/// rejection rather than a generic bad request.
pub fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::Reject(
            ErrorKind::MissingField,
            format!("{} is required", field),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_team_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Team name cannot be empty".into()));
    }
    Ok(trimmed.chars().take(MAX_TEAM_NAME_LEN).collect())
}

pub fn validate_members(members: &[String]) -> Result<(), AppError> {
    if members.is_empty() || members.len() > MAX_MEMBERS {
        return Err(AppError::BadRequest(format!(
            "A team needs between 1 and {} members",
            MAX_MEMBERS
        )));
    }
    if members.iter().any(|m| m.trim().is_empty()) {
        return Err(AppError::BadRequest("Member names cannot be empty".into()));
    }
    Ok(())
}

pub fn validate_room_id(room_id: i64) -> Result<(), AppError> {
    if room_id < 1 {
        Err(AppError::BadRequest("Room id must be positive".into()))
    } else {
        Ok(())
    }
}

pub fn validate_score(score: i64) -> Result<(), AppError> {
    if score < 0 {
        Err(AppError::BadRequest("Score cannot be negative".into()))
    } else {
        Ok(())
    }
}

pub fn validate_duration(minutes: i64) -> Result<(), AppError> {
    if minutes < 1 {
        Err(AppError::BadRequest("Duration must be at least one minute".into()))
    } else {
        Ok(())
    }
}

pub fn validate_member_count(count: i64) -> Result<(), AppError> {
    if count < 1 || count > MAX_MEMBERS as i64 {
        Err(AppError::BadRequest(format!(
            "Member count must be between 1 and {}",
            MAX_MEMBERS
        )))
    } else {
        Ok(())
    }
}
