//! Result-code issuance and ingestion. Issuance is operator-side and pure;
//! ingestion validates an untrusted (team code, token) pair end to end and
//! commits at most one ranking entry per (team, room).

use crate::codec::{self, ResultPayload, SecretKey};
use crate::db::{self, Db};
use crate::error::{AppError, ErrorKind};
use crate::models::ranking::*;
use crate::validation;
use rusqlite::params;
use tracing::warn;

pub fn generate_code(key: &SecretKey, req: CodeRequest) -> Result<CodeResponse, AppError> {
    validation::require(&req.team_code, "teamCode")?;
    validation::validate_room_id(req.room_id)?;
    validation::validate_score(req.score)?;
    validation::validate_duration(req.duration_minutes)?;
    validation::validate_member_count(req.member_count)?;

    let payload = ResultPayload {
        team_code: req.team_code.trim().to_string(),
        room_id: req.room_id,
        score: req.score,
        duration_minutes: req.duration_minutes,
        member_count: req.member_count,
        date_stamp: codec::date_stamp(req.date),
    };

    Ok(CodeResponse {
        token: codec::encode(&payload, key),
    })
}

pub fn submit_result(
    db: &Db,
    key: &SecretKey,
    req: SubmitRequest,
) -> Result<SubmitResponse, AppError> {
    let team_code = req.team_code.trim();
    let token = req.token.trim();
    validation::require(team_code, "teamCode")?;
    validation::require(token, "token")?;

    let payload = codec::decode(token, key)?;

    // The token is bound to the team presenting it; a code issued to team A
    // is worthless to team B even if B got hold of it.
    if payload.team_code != team_code {
        warn!(team_code, "submission with a result code issued to another team");
        return Err(AppError::Reject(
            ErrorKind::TeamCodeMismatch,
            "This result code was issued to a different team".into(),
        ));
    }

    let team_id = match db.with_conn(|conn| {
        conn.query_row(
            "SELECT id FROM teams WHERE code = ?1",
            params![team_code],
            |row| row.get::<_, i64>(0),
        )
    }) {
        Ok(id) => id,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(AppError::Reject(
                ErrorKind::TeamNotFound,
                "No team is registered with this code".into(),
            ))
        }
        Err(e) => return Err(storage_unavailable(e)),
    };

    // Single insert; the UNIQUE (team_id, room_id) index decides duplicates
    // atomically at commit. No existence pre-check, that would race with a
    // concurrent submission for the same pair.
    let inserted = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO ranking_entries (team_id, room_id, score, duration_minutes, member_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                team_id,
                payload.room_id,
                payload.score,
                payload.duration_minutes,
                payload.member_count,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    });

    match inserted {
        Ok(entry_id) => Ok(SubmitResponse {
            accepted: true,
            entry_id,
            team_code: payload.team_code,
            room_id: payload.room_id,
            score: payload.score,
            duration_minutes: payload.duration_minutes,
            member_count: payload.member_count,
            date_stamp: payload.date_stamp,
        }),
        Err(e) if db::is_unique_violation(&e) => Err(AppError::Reject(
            ErrorKind::DuplicateResult,
            "This team already has a recorded result for this room".into(),
        )),
        Err(e) => Err(storage_unavailable(e)),
    }
}

pub fn get_leaderboard(
    db: &Db,
    room_id: Option<i64>,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let limit = limit.clamp(1, 100);

    Ok(db.with_conn(|conn| {
        let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match room_id {
            Some(room) => (
                "SELECT r.id, t.code, t.name, r.room_id, r.score, r.duration_minutes,
                 r.member_count, r.recorded_at
                 FROM ranking_entries r JOIN teams t ON t.id = r.team_id
                 WHERE r.room_id = ?1
                 ORDER BY r.score DESC, r.duration_minutes ASC LIMIT ?2"
                    .to_string(),
                vec![Box::new(room), Box::new(limit)],
            ),
            None => (
                "SELECT r.id, t.code, t.name, r.room_id, r.score, r.duration_minutes,
                 r.member_count, r.recorded_at
                 FROM ranking_entries r JOIN teams t ON t.id = r.team_id
                 ORDER BY r.score DESC, r.duration_minutes ASC LIMIT ?1"
                    .to_string(),
                vec![Box::new(limit)],
            ),
        };

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), |row| {
            Ok(LeaderboardEntry {
                id: row.get(0)?,
                team_code: row.get(1)?,
                team_name: row.get(2)?,
                room_id: row.get(3)?,
                score: row.get(4)?,
                duration_minutes: row.get(5)?,
                member_count: row.get(6)?,
                recorded_at: row.get(7)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    })?)
}

// Anything that is not a validation failure is an infrastructure problem;
// unlike the rest of the taxonomy, the caller may retry it, the unique index
// guards against a double commit.
fn storage_unavailable(e: rusqlite::Error) -> AppError {
    warn!(error = %e, "ranking store unavailable");
    AppError::Reject(
        ErrorKind::StorageUnavailable,
        "The result could not be saved; it is safe to retry in a moment".into(),
    )
}
