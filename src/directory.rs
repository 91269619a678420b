// src/directory.rs

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::hash_token;
use crate::models::{Appointment, AppointmentScheduleRow, PortalUser};

#[derive(Debug, Error)]
pub enum AuthResolutionError {
    #[error("no authenticated user found")]
    NoSession,
    #[error("identity lookup failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum DataReadError {
    #[error("appointment read failed: {0}")]
    Backend(String),
}

/// Narrow seam onto the managed auth + data service. The view layer needs
/// exactly two things from it: the current identity and the raw rows of the
/// appointment collection.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn current_user(
        &self,
        access_token: Option<&str>,
    ) -> Result<PortalUser, AuthResolutionError>;

    /// Full contents of the appointment collection, in server order.
    async fn list_appointments(&self) -> Result<Vec<Appointment>, DataReadError>;
}

/// Production directory backed by the managed Postgres service.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountLookupRow {
    account_id: Uuid,
    email: String,
    display_name: String,
}

#[async_trait]
impl Directory for PgDirectory {
    async fn current_user(
        &self,
        access_token: Option<&str>,
    ) -> Result<PortalUser, AuthResolutionError> {
        let Some(token) = access_token else {
            return Err(AuthResolutionError::NoSession);
        };
        let token_hash = hash_token(token);

        let row: AccountLookupRow = sqlx::query_as::<_, AccountLookupRow>(
            r#"
            SELECT a.account_id, a.email, a.display_name
            FROM portal_session s
            JOIN portal_account a ON a.account_id = s.account_id
            WHERE s.session_token_hash = $1
              AND s.revoked_at IS NULL
              AND s.expires_at > now()
              AND a.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthResolutionError::Backend(format!("db error: {e}")))?
        .ok_or(AuthResolutionError::NoSession)?;

        // Touch last_seen_at (best-effort)
        let _ = sqlx::query(
            r#"
            UPDATE portal_session
            SET last_seen_at = now()
            WHERE session_token_hash = $1
            "#,
        )
        .bind(&token_hash)
        .execute(&self.pool)
        .await;

        Ok(PortalUser {
            user_id: row.account_id,
            email: row.email,
            display_name: row.display_name,
        })
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, DataReadError> {
        // The read is not scoped by account; the caller receives the whole
        // collection and partitions it locally. Known scoping gap, see DESIGN.md.
        let rows: Vec<AppointmentScheduleRow> = sqlx::query_as::<_, AppointmentScheduleRow>(
            r#"
            SELECT
              appointment_id,
              doctor_name,
              appointment_reason,
              appointment_date,
              appointment_time,
              appointment_status
            FROM appointment_schedule
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataReadError::Backend(format!("db error: {e}")))?;

        Ok(rows
            .into_iter()
            .map(AppointmentScheduleRow::into_appointment)
            .collect())
    }
}
