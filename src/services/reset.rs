use crate::models::config::ResetConfig;
use crate::models::reset::ResetRequestState;
use crate::services::api::ComplaintApi;
use crate::services::navigation::{NavMode, NavTarget, Navigator, ScheduledNavigation};
use crate::services::notify::{Notifier, ToastLevel};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server dispatched the code.
    Sent,
    /// The server answered with `success: false`.
    Rejected(String),
    /// The request failed or the answer was not readable.
    NetworkError,
    /// A submit was already in flight.
    Ignored,
}

/// The "forgot password" screen: one email field, then a confirmation.
pub struct ResetRequestView {
    api: Arc<dyn ComplaintApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    settings: ResetConfig,
    state: watch::Sender<ResetRequestState>,
    redirect: Mutex<Option<ScheduledNavigation>>,
}

impl ResetRequestView {
    pub fn new(
        api: Arc<dyn ComplaintApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        settings: ResetConfig,
    ) -> Self {
        let (state, _) = watch::channel(ResetRequestState::default());
        Self {
            api,
            notifier,
            navigator,
            settings,
            state,
            redirect: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ResetRequestState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResetRequestState> {
        self.state.subscribe()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.state.send_modify(|state| state.email = email);
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.state.borrow().loading
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let mut email = String::new();
        let started = self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            email = state.email.clone();
            true
        });
        if !started {
            debug!("reset request already in flight, submit ignored");
            return SubmitOutcome::Ignored;
        }

        let outcome = match self.api.request_reset_code(&email).await {
            Ok(response) if response.success => {
                info!("password reset code dispatched");
                self.notifier.notify(ToastLevel::Success, response.message);
                self.state.send_modify(|state| state.is_email_sent = true);
                self.schedule_redirect();
                SubmitOutcome::Sent
            }
            Ok(response) => {
                info!(message = %response.message, "password reset code refused");
                self.notifier
                    .notify(ToastLevel::Error, response.message.clone());
                SubmitOutcome::Rejected(response.message)
            }
            Err(e) => {
                warn!("Reset code request failed: {}", e);
                self.notifier
                    .notify(ToastLevel::Error, NETWORK_ERROR_MESSAGE.to_string());
                SubmitOutcome::NetworkError
            }
        };

        self.state.send_modify(|state| state.loading = false);
        outcome
    }

    /// Back to the form, keeping the email and dropping any pending redirect.
    pub fn try_again(&self) {
        if let Some(redirect) = self.redirect.lock().take() {
            redirect.cancel();
        }
        self.state.send_modify(|state| state.is_email_sent = false);
    }

    pub fn pending_navigation(&self) -> Option<(NavTarget, Duration)> {
        self.redirect
            .lock()
            .as_ref()
            .map(|redirect| (redirect.target().clone(), redirect.delay()))
    }

    fn schedule_redirect(&self) {
        let redirect = ScheduledNavigation::spawn(
            Arc::clone(&self.navigator),
            NavTarget::SetPassword,
            NavMode::Hard,
            self.settings.redirect_delay(),
        );
        *self.redirect.lock() = Some(redirect);
    }
}
