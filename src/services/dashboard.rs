use crate::models::complaint::DashboardStats;
use crate::services::api::ComplaintApi;
use crate::services::notify::{Notifier, ToastLevel};
use crate::services::token::TokenStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard data";

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardPhase {
    /// No fetch has completed yet.
    Loading,
    Ready(DashboardStats),
    /// A fetch completed without producing stats.
    Failed,
}

impl DashboardPhase {
    pub fn stats(&self) -> Option<&DashboardStats> {
        match self {
            DashboardPhase::Ready(stats) => Some(stats),
            _ => None,
        }
    }
}

/// Admin analytics screen. Read-only; refreshed only by a full re-fetch.
pub struct DashboardView {
    api: Arc<dyn ComplaintApi>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    phase: watch::Sender<DashboardPhase>,
}

impl DashboardView {
    pub fn new(
        api: Arc<dyn ComplaintApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (phase, _) = watch::channel(DashboardPhase::Loading);
        Self {
            api,
            tokens,
            notifier,
            phase,
        }
    }

    pub fn phase(&self) -> DashboardPhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardPhase> {
        self.phase.subscribe()
    }

    /// Runs one fetch cycle and returns the phase it settled in.
    pub async fn load(&self) -> DashboardPhase {
        let token = self.tokens.auth_token();

        let next = match self.api.fetch_dashboard(token).await {
            Ok(envelope) => match (envelope.status, envelope.data) {
                (true, Some(stats)) => {
                    info!(
                        total = stats.total_complaints,
                        recent = stats.recent_complaints.len(),
                        "dashboard stats loaded"
                    );
                    DashboardPhase::Ready(stats)
                }
                _ => {
                    let message = envelope
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| LOAD_FAILED_MESSAGE.to_string());
                    error!("Dashboard fetch refused: {}", message);
                    self.notifier.notify(ToastLevel::Error, message);
                    DashboardPhase::Failed
                }
            },
            Err(e) => {
                error!("Dashboard fetch failed: {}", e);
                self.notifier
                    .notify(ToastLevel::Error, LOAD_FAILED_MESSAGE.to_string());
                DashboardPhase::Failed
            }
        };

        self.phase.send_replace(next.clone());
        next
    }

    /// Starts over from `Loading` and runs the whole fetch cycle again.
    pub async fn retry(&self) -> DashboardPhase {
        self.phase.send_replace(DashboardPhase::Loading);
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::complaint::{CategoryCount, DashboardEnvelope};
    use crate::services::api::MockComplaintApi;
    use crate::services::notify::ToastBuffer;
    use crate::services::projection::category_bars;
    use crate::services::token::MockTokenStore;
    use mockall::Sequence;

    fn stats() -> DashboardStats {
        DashboardStats {
            total_complaints: 100,
            resolved_complaints: 70,
            pending_complaints: 30,
            resolution_rate: 70.0,
            complaints_by_category: vec![CategoryCount {
                category: "Billing".to_string(),
                count: 25,
            }],
            complaints_by_status: Vec::new(),
            users_by_role: Vec::new(),
            recent_complaints: Vec::new(),
        }
    }

    fn ok_envelope() -> DashboardEnvelope {
        DashboardEnvelope {
            status: true,
            message: None,
            data: Some(stats()),
        }
    }

    fn refused_envelope(message: Option<&str>) -> DashboardEnvelope {
        DashboardEnvelope {
            status: false,
            message: message.map(str::to_string),
            data: None,
        }
    }

    fn tokens(token: Option<&'static str>) -> MockTokenStore {
        let mut tokens = MockTokenStore::new();
        tokens
            .expect_auth_token()
            .returning(move || token.map(str::to_string));
        tokens
    }

    fn mount(api: MockComplaintApi, tokens: MockTokenStore) -> (DashboardView, Arc<ToastBuffer>) {
        let toasts = Arc::new(ToastBuffer::new());
        let view = DashboardView::new(Arc::new(api), Arc::new(tokens), toasts.clone());
        (view, toasts)
    }

    #[tokio::test]
    async fn starts_in_loading() {
        let (view, _) = mount(MockComplaintApi::new(), MockTokenStore::new());

        assert_eq!(view.phase(), DashboardPhase::Loading);
    }

    #[tokio::test]
    async fn successful_fetch_stores_the_stats() {
        let mut api = MockComplaintApi::new();
        api.expect_fetch_dashboard()
            .withf(|token| token.as_deref() == Some("secret"))
            .times(1)
            .returning(|_| Ok(ok_envelope()));
        let (view, toasts) = mount(api, tokens(Some("secret")));

        let phase = view.load().await;

        assert_eq!(phase, DashboardPhase::Ready(stats()));
        assert_eq!(view.phase(), phase);
        assert_eq!(category_bars(phase.stats().unwrap())[0].width_percent, 25.0);
        assert!(toasts.drain().is_empty());
    }

    #[tokio::test]
    async fn refused_fetch_keeps_stats_unset_and_notifies() {
        let mut api = MockComplaintApi::new();
        api.expect_fetch_dashboard()
            .times(1)
            .returning(|_| Ok(refused_envelope(Some("Admin access required"))));
        let (view, toasts) = mount(api, tokens(Some("secret")));

        assert_eq!(view.load().await, DashboardPhase::Failed);
        assert!(view.phase().stats().is_none());

        let toasts = toasts.drain();
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert_eq!(toasts[0].message, "Admin access required");
    }

    #[tokio::test]
    async fn refusal_without_message_uses_the_fallback() {
        let mut api = MockComplaintApi::new();
        api.expect_fetch_dashboard()
            .returning(|_| Ok(refused_envelope(None)));
        let (view, toasts) = mount(api, tokens(None));

        view.load().await;

        assert_eq!(toasts.drain()[0].message, LOAD_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn status_true_without_data_is_a_failure() {
        let mut api = MockComplaintApi::new();
        api.expect_fetch_dashboard().returning(|_| {
            Ok(DashboardEnvelope {
                status: true,
                message: None,
                data: None,
            })
        });
        let (view, _) = mount(api, tokens(Some("secret")));

        assert_eq!(view.load().await, DashboardPhase::Failed);
    }

    #[tokio::test]
    async fn transport_error_uses_the_fallback() {
        let mut api = MockComplaintApi::new();
        api.expect_fetch_dashboard().returning(|_| {
            Err(ApiError::Endpoint("admin/dashboard: relative URL".to_string()))
        });
        let (view, toasts) = mount(api, tokens(Some("secret")));

        assert_eq!(view.load().await, DashboardPhase::Failed);
        assert_eq!(toasts.drain()[0].message, LOAD_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn missing_token_fetches_without_credentials() {
        let mut api = MockComplaintApi::new();
        api.expect_fetch_dashboard()
            .withf(|token| token.is_none())
            .times(1)
            .returning(|_| Ok(refused_envelope(Some("Unauthorized"))));
        let (view, _) = mount(api, tokens(None));

        assert_eq!(view.load().await, DashboardPhase::Failed);
    }

    #[tokio::test]
    async fn retries_converge_on_the_first_success() {
        let mut seq = Sequence::new();
        let mut api = MockComplaintApi::new();
        api.expect_fetch_dashboard()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(refused_envelope(Some("Service unavailable"))));
        api.expect_fetch_dashboard()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ok_envelope()));
        let (view, _) = mount(api, tokens(Some("secret")));

        assert_eq!(view.load().await, DashboardPhase::Failed);
        assert_eq!(view.retry().await, DashboardPhase::Failed);
        let first_success = view.retry().await;
        let second_success = view.retry().await;

        assert_eq!(first_success, DashboardPhase::Ready(stats()));
        assert_eq!(first_success, second_success);
    }
}
