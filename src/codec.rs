//! Result-code codec: a compact, tamper-evident token a team can carry on
//! paper and type back in later.
//!
//! The payload is a pipe-joined plaintext (`team|room|score|minutes|members|ddmmyy`),
//! authenticated by a truncated HMAC-SHA256 and wrapped in URL-safe base64:
//! `base64(payload).signature8hex`. This is authentication, not encryption —
//! anyone can read the fields back out, but nobody without the server key can
//! mint or alter a token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Datelike, NaiveDate};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const FIELD_COUNT: usize = 6;
// 8 hex chars keeps the token short enough to transcribe by hand; forging
// still also requires a valid team code, so the truncation is acceptable.
const SIGNATURE_LEN: usize = 8;

/// Server-held signing key. Carried as explicit app state so both encode and
/// decode sites share one key and tests can use arbitrary ones.
#[derive(Clone)]
pub struct SecretKey(Arc<Vec<u8>>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        SecretKey(Arc::new(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPayload {
    pub team_code: String,
    pub room_id: i64,
    pub score: i64,
    pub duration_minutes: i64,
    pub member_count: i64,
    /// DDMMYY. Kept as the raw 6-character stamp; decode does not re-validate
    /// it as a calendar date.
    pub date_stamp: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("token does not have the payload.signature shape")]
    MalformedToken,
    #[error("payload segment is not decodable text")]
    CorruptPayload,
    #[error("signature does not match payload")]
    SignatureMismatch,
    #[error("payload does not contain exactly {FIELD_COUNT} fields")]
    MalformedPayload,
    #[error("field {0} is not a number")]
    InvalidNumericField(&'static str),
}

/// Day, month, two-digit year, zero-padded. Not ISO.
pub fn date_stamp(date: NaiveDate) -> String {
    format!("{:02}{:02}{:02}", date.day(), date.month(), date.year() % 100)
}

pub fn encode(payload: &ResultPayload, key: &SecretKey) -> String {
    let plain = serialize(payload);
    let signature = sign(plain.as_bytes(), key);
    format!("{}.{}", URL_SAFE_NO_PAD.encode(plain.as_bytes()), signature)
}

pub fn decode(token: &str, key: &SecretKey) -> Result<ResultPayload, CodeError> {
    let (payload_b64, signature) = match token.split_once('.') {
        Some((p, s)) if !p.is_empty() && !s.is_empty() && !s.contains('.') => (p, s),
        _ => return Err(CodeError::MalformedToken),
    };

    let raw = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| CodeError::CorruptPayload)?;
    let plain = String::from_utf8(raw).map_err(|_| CodeError::CorruptPayload)?;

    // Constant-time comparison; same accept/reject outcomes as a plain
    // equality check, without leaking how many characters matched.
    let expected = sign(plain.as_bytes(), key);
    if expected.as_bytes().ct_eq(signature.as_bytes()).unwrap_u8() == 0 {
        return Err(CodeError::SignatureMismatch);
    }

    let fields: Vec<&str> = plain.split('|').collect();
    if fields.len() != FIELD_COUNT {
        return Err(CodeError::MalformedPayload);
    }

    Ok(ResultPayload {
        team_code: fields[0].to_string(),
        room_id: parse_numeric(fields[1], "roomId")?,
        score: parse_numeric(fields[2], "score")?,
        duration_minutes: parse_numeric(fields[3], "durationMinutes")?,
        member_count: parse_numeric(fields[4], "memberCount")?,
        date_stamp: fields[5].to_string(),
    })
}

fn serialize(p: &ResultPayload) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        p.team_code, p.room_id, p.score, p.duration_minutes, p.member_count, p.date_stamp
    )
}

fn sign(data: &[u8], key: &SecretKey) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(data);
    let digest = hex::encode(mac.finalize().into_bytes());
    digest[..SIGNATURE_LEN].to_string()
}

fn parse_numeric(field: &str, name: &'static str) -> Result<i64, CodeError> {
    field
        .parse()
        .map_err(|_| CodeError::InvalidNumericField(name))
}
