// src/view.rs
//
// The patient-facing appointment page as plain state: one collection of
// appointment rows, split into upcoming/history on every render, plus the
// cancellation confirmation flow. Nothing here touches the network; the
// external service is reached only through the Directory seam at activation.

use uuid::Uuid;

use crate::directory::Directory;
use crate::models::{Appointment, AppointmentStatus};

/// Result of splitting the collection for display. Recomputed from the
/// collection on demand; holds no state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitions {
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

/// Upcoming keeps everything not yet settled, history takes the rest.
/// A row with an unrecognized status stays upcoming.
pub fn derive_partitions(appointments: &[Appointment]) -> Partitions {
    let (past, upcoming): (Vec<_>, Vec<_>) = appointments
        .iter()
        .cloned()
        .partition(|a| a.status.is_settled());
    Partitions { upcoming, past }
}

/// Cancellation confirmation state. At most one appointment may be awaiting
/// confirmation at a time; selecting another target replaces the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelSelection {
    #[default]
    Idle,
    ConfirmPending(Uuid),
}

/// One page session's view over the appointment collection.
#[derive(Debug, Default)]
pub struct AppointmentsView {
    appointments: Vec<Appointment>,
    selection: CancelSelection,
}

impl AppointmentsView {
    /// Page activation: resolve the identity, then read the collection once.
    /// Either failure is logged and leaves the page in its empty state, which
    /// renders the same as a legitimately empty collection.
    pub async fn activate(directory: &dyn Directory, access_token: Option<&str>) -> Self {
        let mut view = Self::default();
        view.load(directory, access_token).await;
        view
    }

    async fn load(&mut self, directory: &dyn Directory, access_token: Option<&str>) {
        let user = match directory.current_user(access_token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("error fetching user: {e}");
                return;
            }
        };

        match directory.list_appointments().await {
            Ok(rows) => {
                tracing::debug!("loaded {} appointment rows for {}", rows.len(), user.email);
                self.appointments = rows;
            }
            Err(e) => {
                tracing::error!("error fetching appointment data: {e}");
            }
        }
    }

    pub fn partitions(&self) -> Partitions {
        derive_partitions(&self.appointments)
    }

    /// The appointment currently awaiting cancellation confirmation, if any.
    pub fn pending_cancellation(&self) -> Option<&Appointment> {
        match self.selection {
            CancelSelection::Idle => None,
            CancelSelection::ConfirmPending(id) => {
                self.appointments.iter().find(|a| a.appointment_id == id)
            }
        }
    }

    /// Cancel-intent on an upcoming appointment. Returns the selected target,
    /// or None when the id does not name an upcoming appointment.
    pub fn request_cancel(&mut self, appointment_id: Uuid) -> Option<&Appointment> {
        let selectable = self
            .appointments
            .iter()
            .any(|a| a.appointment_id == appointment_id && !a.status.is_settled());
        if !selectable {
            return None;
        }
        self.selection = CancelSelection::ConfirmPending(appointment_id);
        self.pending_cancellation()
    }

    /// "Go back": drop the pending selection without touching the collection.
    /// Returns false when nothing was pending.
    pub fn dismiss(&mut self) -> bool {
        match self.selection {
            CancelSelection::Idle => false,
            CancelSelection::ConfirmPending(_) => {
                self.selection = CancelSelection::Idle;
                true
            }
        }
    }

    /// "Confirm cancel": rewrite the target's status in the local copy and
    /// clear the selection. The external store is not written. Returns the
    /// cancelled id, or None when nothing was pending.
    pub fn confirm_cancel(&mut self) -> Option<Uuid> {
        let CancelSelection::ConfirmPending(id) = self.selection else {
            return None;
        };
        for appt in &mut self.appointments {
            if appt.appointment_id == id {
                appt.status = AppointmentStatus::Cancelled;
            }
        }
        self.selection = CancelSelection::Idle;
        Some(id)
    }
}

#[cfg(test)]
impl AppointmentsView {
    pub(crate) fn with_collection(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments,
            selection: CancelSelection::Idle,
        }
    }

    pub(crate) fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub(crate) fn selection(&self) -> CancelSelection {
        self.selection
    }
}
