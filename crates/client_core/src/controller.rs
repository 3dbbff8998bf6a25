//! The valuation form controller: submission, progress polling, result
//! display and reset, driven one user action at a time.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{AllocationMethod, RoomId, RoomLabels, DEFAULT_TOTAL_RENT},
    protocol::CalculateBody,
};
use tracing::{error, info, warn};

use crate::{
    api::RentApi,
    error::ClientError,
    form::{TextSelection, ValuationForm},
    reconcile::ReconcilePolicy,
    view::{ProgressView, ResultsView},
};

pub const SUBMIT_FAILED: &str = "Error submitting valuations";
pub const CALCULATE_FAILED: &str = "Error calculating assignments";
pub const RESET_FAILED: &str = "Error resetting submissions";

/// What a progress poll found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The submission list could not be read; the view is unchanged.
    Unavailable,
    InProgress,
    /// Everybody has submitted; `shown` tells whether the results came up.
    Complete { shown: bool },
}

/// Sink for user-visible alerts.
pub trait Alerts: Send + Sync {
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone)]
pub struct FormOptions {
    pub total_rent: f64,
    pub policy: ReconcilePolicy,
    pub room_labels: RoomLabels,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            total_rent: DEFAULT_TOTAL_RENT,
            policy: ReconcilePolicy::default(),
            room_labels: RoomLabels::default(),
        }
    }
}

pub struct FormController {
    api: Arc<dyn RentApi>,
    alerts: Arc<dyn Alerts>,
    room_labels: RoomLabels,
    form: ValuationForm,
    progress: ProgressView,
    results: ResultsView,
}

impl FormController {
    pub fn new(api: Arc<dyn RentApi>, alerts: Arc<dyn Alerts>, options: FormOptions) -> Self {
        Self {
            api,
            alerts,
            form: ValuationForm::new(options.total_rent, options.policy),
            room_labels: options.room_labels,
            progress: ProgressView::default(),
            results: ResultsView::default(),
        }
    }

    pub fn form(&self) -> &ValuationForm {
        &self.form
    }

    pub fn progress(&self) -> &ProgressView {
        &self.progress
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn room_labels(&self) -> &RoomLabels {
        &self.room_labels
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.set_name(name);
    }

    pub fn edit_room(&mut self, room: RoomId, text: &str) {
        self.form.edit(room, text);
    }

    pub fn focus_room(&mut self, room: RoomId) -> TextSelection {
        self.form.focus(room)
    }

    /// Initial page load.
    pub async fn load(&mut self) {
        self.refresh_progress().await;
    }

    /// Sends the form. Returns `true` when the server accepted it.
    pub async fn submit(&mut self) -> bool {
        let request = match self.form.submit_request() {
            Ok(request) => request,
            Err(err) => {
                self.alerts.alert(err.user_message(SUBMIT_FAILED));
                return false;
            }
        };

        match self.api.submit(&request).await {
            Ok(()) => {
                info!(name = %request.name, "valuations submitted");
                self.form.clear();
                self.refresh_progress().await;
                true
            }
            Err(err) => {
                self.report(&err, SUBMIT_FAILED);
                false
            }
        }
    }

    /// Fetches the submission list and updates the progress view. Failures are
    /// logged and leave the view as it was. Shows the results once all
    /// participants are in.
    pub async fn refresh_progress(&mut self) -> PollOutcome {
        let submissions = match self.api.list_submissions().await {
            Ok(submissions) => submissions,
            Err(err) => {
                warn!(error = %err, "failed to update progress");
                return PollOutcome::Unavailable;
            }
        };

        self.progress = ProgressView::from_submissions(&submissions);
        info!(progress = %self.progress.label(), "progress updated");

        if self.progress.is_complete() {
            PollOutcome::Complete {
                shown: self.show_results().await,
            }
        } else {
            PollOutcome::InProgress
        }
    }

    /// Fetches the allocation and reveals the results section.
    pub async fn show_results(&mut self) -> bool {
        let body = match self.api.calculate().await {
            Ok(body) => body,
            Err(err) => {
                self.report(&err, CALCULATE_FAILED);
                return false;
            }
        };

        let (method, explanation, assignments) = match body {
            CalculateBody::Detailed(response) if response.success => (
                response.method.unwrap_or_default(),
                response.explanation,
                response.assignments,
            ),
            CalculateBody::Detailed(response) => {
                let message = response.error.or(response.message);
                self.alerts
                    .alert(message.as_deref().unwrap_or(CALCULATE_FAILED));
                return false;
            }
            CalculateBody::Legacy(response) => {
                match response.to_assignments(&self.room_labels) {
                    Ok(assignments) => (response.method, None, assignments),
                    Err(err) => {
                        warn!(error = %err, "unusable allocation result");
                        self.alerts.alert(CALCULATE_FAILED);
                        return false;
                    }
                }
            }
            CalculateBody::Failure(body) => {
                self.alerts
                    .alert(body.user_message().unwrap_or(CALCULATE_FAILED));
                return false;
            }
        };

        let explanation = explanation
            .filter(|text| !text.trim().is_empty())
            .or_else(|| {
                AllocationMethod::from_name(&method).map(|known| known.explanation().to_string())
            })
            .unwrap_or_default();

        info!(%method, assignments = assignments.len(), "allocation ready");
        self.results = ResultsView::shown(method, explanation, &assignments);
        true
    }

    /// Clears the server's submissions and returns the page to its initial state.
    pub async fn reset(&mut self) -> bool {
        if let Err(err) = self.api.reset().await {
            self.report(&err, RESET_FAILED);
            return false;
        }

        info!("submissions reset");
        self.form.clear();
        self.results = ResultsView::default();
        self.progress = ProgressView::default();
        self.refresh_progress().await;
        true
    }

    /// Polls progress every `interval` until the results are shown, giving up
    /// after `max_polls` rounds when a limit is set. A failed calculation ends
    /// the watch; it is not requested again.
    pub async fn watch(&mut self, interval: Duration, max_polls: Option<usize>) -> bool {
        let mut polls = 0usize;
        loop {
            match self.refresh_progress().await {
                PollOutcome::Complete { shown } => return shown,
                PollOutcome::Unavailable | PollOutcome::InProgress => {}
            }
            polls += 1;
            if max_polls.is_some_and(|limit| polls >= limit) {
                return false;
            }
            tokio::time::sleep(interval).await;
        }
    }

    fn report(&self, err: &ClientError, fallback: &str) {
        match err {
            ClientError::Rejected { .. } | ClientError::Validation(_) => {
                warn!(error = %err, "request refused");
            }
            _ => error!(error = %err, "request failed"),
        }
        self.alerts.alert(err.user_message(fallback));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
