mod codec;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod validation;

use codec::SecretKey;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use rand::RngCore;
use std::sync::Arc;
use tracing::{info, warn};

#[ntex::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "escaperoom.db".into());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    // The signing key must match between the issuing and verifying call
    // sites; both live in this process, so one key covers both.
    let secret = match std::env::var("RESULT_SECRET_KEY") {
        Ok(key) if !key.is_empty() => SecretKey::new(key.into_bytes()),
        _ => {
            warn!("RESULT_SECRET_KEY not set; using a random per-process key, issued result codes will not outlive this process");
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            SecretKey::new(bytes.to_vec())
        }
    };

    let db = Arc::new(Db::open(&db_path).expect("Failed to open database"));

    info!("Escape room server starting on {}:{}", host, port);

    web::HttpServer::new(move || {
        web::App::new()
            .state(db.clone())
            .state(secret.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            // Health check
            .route("/api/health", web::get().to(health))
            // Teams
            .route("/api/teams", web::post().to(handlers::team::register_team))
            .route("/api/teams/{code}", web::get().to(handlers::team::get_team))
            .route("/api/teams/{code}", web::put().to(handlers::team::rename_team))
            // Rooms
            .route("/api/rooms", web::get().to(handlers::room::list_rooms))
            .route("/api/rooms", web::post().to(handlers::room::create_room))
            // Result codes and ranking
            .route("/api/results/code", web::post().to(handlers::ranking::generate_code))
            .route("/api/results/submit", web::post().to(handlers::ranking::submit_result))
            .route("/api/leaderboard", web::get().to(handlers::ranking::get_leaderboard))
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorKind};
    use crate::models::ranking::{CodeRequest, SubmitRequest};
    use crate::models::room::RoomCreateRequest;
    use crate::models::team::{TeamInfo, TeamRegisterRequest, TeamRenameRequest};
    use chrono::NaiveDate;

    fn test_key() -> SecretKey {
        SecretKey::new(b"test-secret".to_vec())
    }

    fn register(db: &Db, name: &str) -> TeamInfo {
        services::team::register_team(
            db,
            TeamRegisterRequest {
                name: name.into(),
                members: vec!["Alice".into(), "Bob".into()],
            },
        )
        .unwrap()
    }

    fn token_for(key: &SecretKey, team_code: &str, room_id: i64, score: i64) -> String {
        services::ranking::generate_code(
            key,
            CodeRequest {
                team_code: team_code.into(),
                room_id,
                score,
                duration_minutes: 45,
                member_count: 4,
                date: NaiveDate::from_ymd_opt(2025, 12, 7).unwrap(),
            },
        )
        .unwrap()
        .token
    }

    #[test]
    fn test_db_open_in_memory() {
        let db = Db::open_in_memory().expect("Failed to open in-memory DB");
        db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('teams', 'rooms', 'ranking_entries')",
                [],
                |row| row.get(0),
            )?;
            assert_eq!(count, 3);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_register_and_lookup_team() {
        let db = Db::open_in_memory().unwrap();
        let team = register(&db, "The Lockpickers");
        assert_eq!(team.code.len(), 6);
        assert!(team.code.chars().all(|c| c.is_ascii_alphanumeric()));

        let found = services::team::get_team(&db, &team.code).unwrap();
        assert_eq!(found.id, team.id);
        assert_eq!(found.name, "The Lockpickers");
        assert_eq!(found.members, vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn test_rename_team() {
        let db = Db::open_in_memory().unwrap();
        let team = register(&db, "Old Name");
        let renamed = services::team::rename_team(
            &db,
            &team.code,
            TeamRenameRequest { name: "New Name".into() },
        )
        .unwrap();
        assert_eq!(renamed.name, "New Name");
        assert_eq!(renamed.code, team.code);

        let err = services::team::rename_team(
            &db,
            "NOSUCH",
            TeamRenameRequest { name: "X".into() },
        );
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_full_submission_flow() {
        let db = Db::open_in_memory().unwrap();
        let key = test_key();
        let team = register(&db, "Escape Artists");

        let token = token_for(&key, &team.code, 1, 1000);
        let result = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: team.code.clone(),
                token,
            },
        )
        .unwrap();

        assert!(result.accepted);
        assert_eq!(result.team_code, team.code);
        assert_eq!(result.room_id, 1);
        assert_eq!(result.score, 1000);
        assert_eq!(result.duration_minutes, 45);
        assert_eq!(result.member_count, 4);
        assert_eq!(result.date_stamp, "071225");
    }

    #[test]
    fn test_duplicate_submission_rejected() {
        let db = Db::open_in_memory().unwrap();
        let key = test_key();
        let team = register(&db, "Repeat Offenders");
        let token = token_for(&key, &team.code, 1, 1000);

        let req = SubmitRequest {
            team_code: team.code.clone(),
            token: token.clone(),
        };
        services::ranking::submit_result(&db, &key, req).unwrap();

        let second = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: team.code.clone(),
                token,
            },
        );
        assert!(matches!(
            second,
            Err(AppError::Reject(ErrorKind::DuplicateResult, _))
        ));

        // A different room is still open for this team.
        let other = token_for(&key, &team.code, 2, 800);
        let result = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: team.code,
                token: other,
            },
        )
        .unwrap();
        assert_eq!(result.room_id, 2);
    }

    #[test]
    fn test_cross_team_rejection() {
        let db = Db::open_in_memory().unwrap();
        let key = test_key();
        let team_a = register(&db, "Team A");
        let team_b = register(&db, "Team B");

        // B presenting A's token fails even though B exists.
        let token = token_for(&key, &team_a.code, 1, 1000);
        let err = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: team_b.code,
                token,
            },
        );
        assert!(matches!(
            err,
            Err(AppError::Reject(ErrorKind::TeamCodeMismatch, _))
        ));
    }

    #[test]
    fn test_unknown_team_rejected() {
        let db = Db::open_in_memory().unwrap();
        let key = test_key();

        // Valid token for a code that was never registered.
        let token = token_for(&key, "GHOST1", 1, 1000);
        let err = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: "GHOST1".into(),
                token,
            },
        );
        assert!(matches!(
            err,
            Err(AppError::Reject(ErrorKind::TeamNotFound, _))
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let db = Db::open_in_memory().unwrap();
        let key = test_key();
        let team = register(&db, "Fat Fingers");

        let err = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: team.code,
                token: "not-a-valid-token".into(),
            },
        );
        assert!(matches!(
            err,
            Err(AppError::Reject(ErrorKind::MalformedToken, _))
        ));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let db = Db::open_in_memory().unwrap();
        let key = test_key();

        let err = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: "".into(),
                token: "whatever".into(),
            },
        );
        assert!(matches!(
            err,
            Err(AppError::Reject(ErrorKind::MissingField, _))
        ));

        let err = services::ranking::submit_result(
            &db,
            &key,
            SubmitRequest {
                team_code: "ABC123".into(),
                token: "   ".into(),
            },
        );
        assert!(matches!(
            err,
            Err(AppError::Reject(ErrorKind::MissingField, _))
        ));
    }

    #[test]
    fn test_wrong_key_submission_rejected() {
        let db = Db::open_in_memory().unwrap();
        let team = register(&db, "Key Jugglers");

        let token = token_for(&test_key(), &team.code, 1, 1000);
        let other_key = SecretKey::new(b"another-secret".to_vec());
        let err = services::ranking::submit_result(
            &db,
            &other_key,
            SubmitRequest {
                team_code: team.code,
                token,
            },
        );
        assert!(matches!(
            err,
            Err(AppError::Reject(ErrorKind::SignatureMismatch, _))
        ));
    }

    #[test]
    fn test_leaderboard_ordering() {
        let db = Db::open_in_memory().unwrap();
        let key = test_key();
        let slow = register(&db, "Slow But High");
        let fast = register(&db, "Fast Equals");
        let top = register(&db, "Top Score");

        for (team, score, minutes) in [(&slow, 1000, 45), (&fast, 1000, 40), (&top, 1200, 60)] {
            let token = services::ranking::generate_code(
                &key,
                CodeRequest {
                    team_code: team.code.clone(),
                    room_id: 1,
                    score,
                    duration_minutes: minutes,
                    member_count: 4,
                    date: NaiveDate::from_ymd_opt(2025, 12, 7).unwrap(),
                },
            )
            .unwrap()
            .token;
            services::ranking::submit_result(
                &db,
                &key,
                SubmitRequest {
                    team_code: team.code.clone(),
                    token,
                },
            )
            .unwrap();
        }

        let entries = services::ranking::get_leaderboard(&db, Some(1), 10).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].team_name, "Top Score");
        // Equal scores rank by faster time.
        assert_eq!(entries[1].team_name, "Fast Equals");
        assert_eq!(entries[2].team_name, "Slow But High");

        let empty = services::ranking::get_leaderboard(&db, Some(99), 10).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_rooms_create_and_list() {
        let db = Db::open_in_memory().unwrap();
        let room = services::room::create_room(
            &db,
            RoomCreateRequest {
                name: "The Vault".into(),
                description: "Crack the safe before the guard returns".into(),
                duration_minutes: 60,
                difficulty: 3,
            },
        )
        .unwrap();
        assert_eq!(room.name, "The Vault");

        let rooms = services::room::list_rooms(&db).unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, room.id);
    }

    #[test]
    fn test_generate_code_validation() {
        let key = test_key();
        let err = services::ranking::generate_code(
            &key,
            CodeRequest {
                team_code: "".into(),
                room_id: 1,
                score: 1000,
                duration_minutes: 45,
                member_count: 4,
                date: NaiveDate::from_ymd_opt(2025, 12, 7).unwrap(),
            },
        );
        assert!(matches!(
            err,
            Err(AppError::Reject(ErrorKind::MissingField, _))
        ));

        let err = services::ranking::generate_code(
            &key,
            CodeRequest {
                team_code: "ABC123".into(),
                room_id: 1,
                score: -5,
                duration_minutes: 45,
                member_count: 4,
                date: NaiveDate::from_ymd_opt(2025, 12, 7).unwrap(),
            },
        );
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }
}
