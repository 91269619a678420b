// src/routes/appointment_routes.rs

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::MaybeBearer,
    models::{AppState, Appointment, AppointmentStatus},
    view::{AppointmentsView, Partitions},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments/view", post(activate_view))
        .route("/appointments/view/{view_id}", get(render_view))
        .route("/appointments/view/{view_id}/cancel_intent", post(cancel_intent))
        .route("/appointments/view/{view_id}/dismiss", post(dismiss_cancellation))
        .route("/appointments/view/{view_id}/confirm_cancel", post(confirm_cancellation))
}

/* ============================================================
   Response DTOs
   ============================================================ */

const NO_UPCOMING_MESSAGE: &str = "No upcoming appointments found.";
const NO_PAST_MESSAGE: &str = "No past appointments found.";

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct AppointmentCardDto {
    pub appointment_id: Uuid,
    pub doctor_name: String,
    pub reason: Option<String>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub status_label: String,
}

impl From<&Appointment> for AppointmentCardDto {
    fn from(a: &Appointment) -> Self {
        Self {
            appointment_id: a.appointment_id,
            doctor_name: a.doctor_name.clone(),
            reason: a.reason.clone(),
            appointment_date: a.appointment_date,
            appointment_time: a.appointment_time.clone(),
            status: a.status,
            status_label: a.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PendingCancellationDto {
    pub appointment_id: Uuid,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct PageDto {
    pub upcoming: Vec<AppointmentCardDto>,
    pub upcoming_empty_message: Option<&'static str>,
    pub past: Vec<AppointmentCardDto>,
    pub past_empty_message: Option<&'static str>,
    pub pending_cancellation: Option<PendingCancellationDto>,
}

#[derive(Debug, Serialize)]
pub struct ActivatedViewDto {
    pub view_id: String,
    pub page: PageDto,
}

fn cancellation_prompt(appointment: &Appointment) -> String {
    format!(
        "Are you sure you want to cancel your appointment with {} on {} at {}?",
        appointment.doctor_name,
        appointment.appointment_date.format("%-m/%-d/%Y"),
        appointment.appointment_time
    )
}

fn render_page(view: &AppointmentsView) -> PageDto {
    let Partitions { upcoming, past } = view.partitions();

    let pending_cancellation = view.pending_cancellation().map(|a| PendingCancellationDto {
        appointment_id: a.appointment_id,
        prompt: cancellation_prompt(a),
    });

    PageDto {
        upcoming_empty_message: upcoming.is_empty().then_some(NO_UPCOMING_MESSAGE),
        past_empty_message: past.is_empty().then_some(NO_PAST_MESSAGE),
        upcoming: upcoming.iter().map(AppointmentCardDto::from).collect(),
        past: past.iter().map(AppointmentCardDto::from).collect(),
        pending_cancellation,
    }
}

/* ============================================================
   POST /appointments/view  (page activation)
   ============================================================ */

pub async fn activate_view(
    State(state): State<AppState>,
    MaybeBearer(token): MaybeBearer,
) -> Result<Json<ApiOk<ActivatedViewDto>>, ApiError> {
    let view = AppointmentsView::activate(state.directory.as_ref(), token.as_deref()).await;
    let page = render_page(&view);
    let view_id = state.views.insert(view, state.view_ttl_minutes).await;

    Ok(Json(ApiOk {
        data: ActivatedViewDto { view_id, page },
    }))
}

/* ============================================================
   GET /appointments/view/{view_id}
   ============================================================ */

pub async fn render_view(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> Result<Json<ApiOk<PageDto>>, ApiError> {
    let page = state
        .views
        .with_view(&view_id, |view| render_page(view))
        .await
        .ok_or_else(ApiError::view_expired)?;

    Ok(Json(ApiOk { data: page }))
}

/* ============================================================
   POST /appointments/view/{view_id}/cancel_intent
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct CancelIntentRequest {
    pub appointment_id: Uuid,
}

pub async fn cancel_intent(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Json(req): Json<CancelIntentRequest>,
) -> Result<Json<ApiOk<PageDto>>, ApiError> {
    let (selected, page) = state
        .views
        .with_view(&view_id, |view| {
            let selected = view.request_cancel(req.appointment_id).is_some();
            (selected, render_page(view))
        })
        .await
        .ok_or_else(ApiError::view_expired)?;

    if !selected {
        return Err(ApiError::NotFound(
            "NOT_FOUND",
            "appointment is not upcoming or does not exist".into(),
        ));
    }

    Ok(Json(ApiOk { data: page }))
}

/* ============================================================
   POST /appointments/view/{view_id}/dismiss
   ============================================================ */

pub async fn dismiss_cancellation(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> Result<Json<ApiOk<PageDto>>, ApiError> {
    let (dismissed, page) = state
        .views
        .with_view(&view_id, |view| (view.dismiss(), render_page(view)))
        .await
        .ok_or_else(ApiError::view_expired)?;

    if !dismissed {
        return Err(ApiError::BadRequest(
            "NO_PENDING_CANCELLATION",
            "no cancellation is awaiting confirmation".into(),
        ));
    }

    Ok(Json(ApiOk { data: page }))
}

/* ============================================================
   POST /appointments/view/{view_id}/confirm_cancel
   ============================================================ */

pub async fn confirm_cancellation(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> Result<Json<ApiOk<PageDto>>, ApiError> {
    let (confirmed, page) = state
        .views
        .with_view(&view_id, |view| {
            let confirmed = view.confirm_cancel().is_some();
            (confirmed, render_page(view))
        })
        .await
        .ok_or_else(ApiError::view_expired)?;

    if !confirmed {
        return Err(ApiError::BadRequest(
            "NO_PENDING_CANCELLATION",
            "no cancellation is awaiting confirmation".into(),
        ));
    }

    Ok(Json(ApiOk { data: page }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appt(id: u128, doctor: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            appointment_id: Uuid::from_u128(id),
            doctor_name: doctor.to_string(),
            reason: Some("Routine checkup".to_string()),
            appointment_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            appointment_time: "10:30 AM".to_string(),
            status,
        }
    }

    #[test]
    fn test_empty_page_carries_both_messages() {
        let page = render_page(&AppointmentsView::default());

        assert!(page.upcoming.is_empty());
        assert!(page.past.is_empty());
        assert_eq!(page.upcoming_empty_message, Some(NO_UPCOMING_MESSAGE));
        assert_eq!(page.past_empty_message, Some(NO_PAST_MESSAGE));
        assert!(page.pending_cancellation.is_none());
    }

    #[test]
    fn test_populated_page_drops_empty_messages() {
        let view = AppointmentsView::with_collection(vec![
            appt(1, "Dr. Adams", AppointmentStatus::Scheduled),
            appt(2, "Dr. Brown", AppointmentStatus::Completed),
        ]);
        let page = render_page(&view);

        assert_eq!(page.upcoming.len(), 1);
        assert_eq!(page.past.len(), 1);
        assert!(page.upcoming_empty_message.is_none());
        assert!(page.past_empty_message.is_none());
        assert_eq!(page.past[0].status_label, "Completed");
    }

    #[test]
    fn test_cancellation_prompt_names_doctor_date_and_time() {
        let a = appt(1, "Dr. Adams", AppointmentStatus::Scheduled);
        assert_eq!(
            cancellation_prompt(&a),
            "Are you sure you want to cancel your appointment with Dr. Adams on 6/12/2025 at 10:30 AM?"
        );
    }

    #[test]
    fn test_page_serializes_under_data_envelope_shape() {
        let mut view = AppointmentsView::with_collection(vec![appt(
            1,
            "Dr. Adams",
            AppointmentStatus::Scheduled,
        )]);
        view.request_cancel(Uuid::from_u128(1));

        let body = serde_json::to_value(ApiOk {
            data: render_page(&view),
        })
        .unwrap();

        assert_eq!(body["data"]["upcoming"][0]["status"], "scheduled");
        assert_eq!(
            body["data"]["pending_cancellation"]["appointment_id"],
            Uuid::from_u128(1).to_string()
        );
    }
}
