//! Deferred subject setup across account verification.
//!
//! The selection made at sign-up is stored server-side; the client only
//! keeps `"<token_id>.<signature>"`, where the signature is
//! HMAC-SHA256(secret, token_id) in hex. A forged or edited token is
//! rejected before the database is consulted.

use crate::core::changes::ChangeHub;
use crate::db::onboarding::{find_pending, insert_pending, mark_consumed, prune_pending};
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::catalog::CatalogEntry;
use crate::models::change::{ChangeEvent, ChangeKind, Table};
use crate::models::onboarding::{PendingOnboarding, PendingSubject};
use crate::models::subject_total::SubjectTotal;
use chrono::{Duration, Local};
use hmac::{Hmac, Mac};
use rusqlite::params;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// How long a pending selection stays redeemable.
pub const PENDING_TTL_DAYS: i64 = 7;

pub struct Onboarding;

impl Onboarding {
    /// Store a pending selection and return the opaque token for the client.
    pub fn start(
        pool: &mut DbPool,
        secret: &str,
        student: &str,
        subjects: &[PendingSubject],
    ) -> AppResult<String> {
        require_secret(secret)?;
        if subjects.is_empty() {
            return Err(AppError::InvalidValue("no subjects selected".into()));
        }

        let mut normalized = Vec::with_capacity(subjects.len());
        for s in subjects {
            let code = CatalogEntry::normalize_code(&s.code);
            if queries::find_catalog_entry(&pool.conn, &code)?.is_none() {
                return Err(AppError::UnknownSubject(code));
            }
            if let Some(t) = s.total
                && t < 0
            {
                return Err(AppError::InvalidValue(format!(
                    "total for '{}' must be zero or positive",
                    code
                )));
            }
            normalized.push(PendingSubject { code, total: s.total });
        }

        let now = Local::now();
        let pending = PendingOnboarding {
            token_id: Uuid::new_v4().to_string(),
            student_id: student.to_string(),
            subjects: normalized,
            created_at: now,
            consumed_at: None,
        };
        pool.with_tx(|tx| {
            prune_pending(tx, now - Duration::days(PENDING_TTL_DAYS))?;
            insert_pending(tx, &pending)
        })?;

        Ok(format!("{}.{}", pending.token_id, sign(secret, &pending.token_id)?))
    }

    /// Apply a pending selection exactly once. Subjects the student already
    /// has are left untouched; the rows actually created are returned.
    pub fn finish(
        pool: &mut DbPool,
        hub: &ChangeHub,
        secret: &str,
        token: &str,
    ) -> AppResult<Vec<SubjectTotal>> {
        require_secret(secret)?;
        let token_id = verify(secret, token)?;

        let (student, added) = pool.with_tx(|tx| {
            let now = Local::now();
            let pending = find_pending(tx, &token_id)?
                .ok_or_else(|| AppError::InvalidToken("unknown token".into()))?;

            if pending.consumed_at.is_some() || !mark_consumed(tx, &token_id, now)? {
                return Err(AppError::InvalidToken("token already used".into()));
            }
            if pending.created_at + Duration::days(PENDING_TTL_DAYS) < now {
                return Err(AppError::InvalidToken("token expired".into()));
            }

            let mut added = Vec::new();
            for s in &pending.subjects {
                let entry = queries::find_catalog_entry(tx, &s.code)?
                    .ok_or_else(|| AppError::UnknownSubject(s.code.clone()))?;
                let total = s.total.unwrap_or(entry.default_total);

                let inserted = tx.execute(
                    "INSERT OR IGNORE INTO subject_totals (student_id, subject, count, total)
                     VALUES (?1, ?2, 0, ?3)",
                    params![pending.student_id, s.code, total],
                )?;
                if inserted == 1 {
                    added.push(SubjectTotal {
                        student_id: pending.student_id.clone(),
                        subject: s.code.clone(),
                        count: 0,
                        total,
                    });
                }
            }

            Ok((pending.student_id, added))
        })?;

        if !added.is_empty() {
            hub.publish(ChangeEvent::new(
                &student,
                Table::SubjectTotals,
                ChangeKind::Insert,
                None,
            ));
        }
        Ok(added)
    }
}

/// Parse `"CODE"` or `"CODE=TOTAL"` as typed on the command line.
pub fn parse_selection(raw: &str) -> AppResult<PendingSubject> {
    match raw.split_once('=') {
        None => Ok(PendingSubject {
            code: raw.trim().to_string(),
            total: None,
        }),
        Some((code, total)) => Ok(PendingSubject {
            code: code.trim().to_string(),
            total: Some(crate::core::totals::parse_total(total)?),
        }),
    }
}

fn require_secret(secret: &str) -> AppResult<()> {
    if secret.trim().is_empty() {
        return Err(AppError::Config(
            "onboarding_secret is not set; run `rattendance init` or set it in the config file"
                .into(),
        ));
    }
    Ok(())
}

fn mac_for(secret: &str, token_id: &str) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(format!("onboarding_secret: {}", e)))?;
    mac.update(token_id.as_bytes());
    Ok(mac)
}

fn sign(secret: &str, token_id: &str) -> AppResult<String> {
    Ok(hex::encode(mac_for(secret, token_id)?.finalize().into_bytes()))
}

/// Check the signature and return the token id.
fn verify(secret: &str, token: &str) -> AppResult<String> {
    let (token_id, signature) = token
        .trim()
        .split_once('.')
        .ok_or_else(|| AppError::InvalidToken("malformed token".into()))?;

    if Uuid::parse_str(token_id).is_err() {
        return Err(AppError::InvalidToken("malformed token".into()));
    }
    let expected = hex::decode(signature)
        .map_err(|_| AppError::InvalidToken("malformed token".into()))?;

    mac_for(secret, token_id)?
        .verify_slice(&expected)
        .map_err(|_| AppError::InvalidToken("bad signature".into()))?;

    Ok(token_id.to_string())
}
