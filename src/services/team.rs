use crate::db::{self, Db};
use crate::error::AppError;
use crate::models::team::*;
use crate::validation;
use rand::Rng;
use rusqlite::params;

// No 0/O/1/I; codes get read over the phone and typed from paper.
const CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;
const CODE_ATTEMPTS: usize = 16;

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let chars: Vec<char> = CODE_ALPHABET.chars().collect();
    (0..CODE_LEN)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}

pub fn register_team(db: &Db, req: TeamRegisterRequest) -> Result<TeamInfo, AppError> {
    let name = validation::validate_team_name(&req.name)?;
    validation::validate_members(&req.members)?;
    let members_json =
        serde_json::to_string(&req.members).map_err(|e| AppError::Internal(e.to_string()))?;

    // Collisions are rare in a 32^6 space; retry a handful of times and let
    // the UNIQUE constraint arbitrate instead of pre-checking.
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_code();
        let inserted = db.with_conn(|conn| {
            match conn.execute(
                "INSERT INTO teams (code, name, members) VALUES (?1, ?2, ?3)",
                params![code, name, members_json],
            ) {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(e) if db::is_unique_violation(&e) => Ok(None),
                Err(e) => Err(e),
            }
        })?;
        if let Some(id) = inserted {
            return Ok(TeamInfo {
                id,
                code,
                name,
                members: req.members,
            });
        }
    }

    Err(AppError::Internal("Could not allocate a unique team code".into()))
}

pub fn get_team(db: &Db, code: &str) -> Result<TeamInfo, AppError> {
    let code = code.trim();

    let result = db.with_conn(|conn| {
        conn.query_row(
            "SELECT id, code, name, members FROM teams WHERE code = ?1",
            params![code],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
    });

    match result {
        Ok((id, code, name, members_json)) => Ok(TeamInfo {
            id,
            code,
            name,
            members: serde_json::from_str(&members_json).unwrap_or_default(),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(AppError::NotFound("No team with that code".into()))
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// The name is the only editable field; code and members are fixed at
/// registration.
pub fn rename_team(db: &Db, code: &str, req: TeamRenameRequest) -> Result<TeamInfo, AppError> {
    let name = validation::validate_team_name(&req.name)?;
    let code = code.trim();

    let changed = db.with_conn(|conn| {
        conn.execute(
            "UPDATE teams SET name = ?1 WHERE code = ?2",
            params![name, code],
        )
    })?;

    if changed == 0 {
        return Err(AppError::NotFound("No team with that code".into()));
    }
    get_team(db, code)
}
