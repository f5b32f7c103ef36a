use crate::error::WebError;
use crate::models::config::AppConfig;
use crate::models::reset::{ResetForm, ResetRequestState};
use crate::services::api::ComplaintApi;
use crate::services::dashboard::{DashboardPhase, DashboardView, LOAD_FAILED_MESSAGE};
use crate::services::navigation::{ClientNavigator, NavTarget};
use crate::services::notify::{Toast, ToastBuffer};
use crate::services::projection::DashboardProjection;
use crate::services::reset::{ResetRequestView, SubmitOutcome};
use crate::services::token::CookieTokenStore;
use askama::Template;
use axum::{
    extract::State,
    http::{header::REFRESH, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

// Templates
#[derive(Template)]
#[template(path = "reset_password.html")]
struct ResetPasswordTemplate {
    login_href: String,
    email: String,
    loading: bool,
    is_email_sent: bool,
    redirect: Option<RedirectMeta>,
    toasts: Vec<Toast>,
}

struct RedirectMeta {
    seconds: u64,
    url: String,
}

impl RedirectMeta {
    fn new(target: &NavTarget, delay: Duration) -> Self {
        Self {
            seconds: delay.as_secs() + u64::from(delay.subsec_nanos() > 0),
            url: target.path(),
        }
    }

    fn header_value(&self) -> String {
        format!("{}; url={}", self.seconds, self.url)
    }
}

impl ResetPasswordTemplate {
    fn from_state(state: ResetRequestState, toasts: Vec<Toast>, redirect: Option<RedirectMeta>) -> Self {
        Self {
            login_href: NavTarget::Login.path(),
            email: state.email,
            loading: state.loading,
            is_email_sent: state.is_email_sent,
            redirect,
            toasts,
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    reports_href: String,
    complaints_href: String,
    projection: Option<DashboardProjection>,
    toasts: Vec<Toast>,
}

// State
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ComplaintApi>,
    pub config: Arc<AppConfig>,
    resets: Arc<ResetSubmissions>,
}

/// A mounted reset view and the toasts it raises.
type ResetSlot = (Arc<ResetRequestView>, Arc<ToastBuffer>);

/// Reset views with a code request in flight, keyed by normalized email.
/// A POST arriving while one is pending joins that view instead of
/// mounting a fresh one, so the view's own guard sees the overlap.
#[derive(Default)]
struct ResetSubmissions {
    in_flight: Mutex<HashMap<String, ResetSlot>>,
}

impl ResetSubmissions {
    fn key(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn join(&self, email: &str, mount: impl FnOnce() -> ResetSlot) -> ResetSlot {
        let mut in_flight = self.in_flight.lock();
        let (view, toasts) = in_flight.entry(Self::key(email)).or_insert_with(mount);
        (Arc::clone(view), Arc::clone(toasts))
    }

    /// Drops the entry once its view is idle again.
    fn release(&self, email: &str, view: &Arc<ResetRequestView>) {
        if view.state().loading {
            return;
        }
        let key = Self::key(email);
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(&key)
            .is_some_and(|(current, _)| Arc::ptr_eq(current, view))
        {
            in_flight.remove(&key);
        }
    }
}

pub fn create_app(api: Arc<dyn ComplaintApi>, config: AppConfig) -> Router {
    let state = AppState {
        api,
        config: Arc::new(config),
        resets: Arc::new(ResetSubmissions::default()),
    };

    Router::new()
        .route("/", get(root))
        .route("/reset-password", get(reset_page).post(reset_submit))
        .route("/reset-password/again", post(reset_try_again))
        .route("/admin/dashboard", get(dashboard_page))
        .route("/admin/dashboard/retry", post(dashboard_retry))
        .route("/api/admin/dashboard/summary", get(api_dashboard_summary))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

fn render<T: Template>(template: &T) -> Result<Html<String>, WebError> {
    Ok(Html(template.render()?))
}

fn reset_view(state: &AppState, toasts: Arc<ToastBuffer>) -> ResetRequestView {
    ResetRequestView::new(
        Arc::clone(&state.api),
        toasts,
        Arc::new(ClientNavigator),
        state.config.reset.clone(),
    )
}

fn dashboard_view(state: &AppState, cookies: Cookies, toasts: Arc<ToastBuffer>) -> DashboardView {
    DashboardView::new(
        Arc::clone(&state.api),
        Arc::new(CookieTokenStore::new(cookies)),
        toasts,
    )
}

// Routes
async fn root() -> impl IntoResponse {
    Redirect::to("/admin/dashboard")
}

async fn reset_page() -> ResetPasswordTemplate {
    ResetPasswordTemplate::from_state(ResetRequestState::default(), Vec::new(), None)
}

async fn reset_submit(
    State(state): State<AppState>,
    Form(form): Form<ResetForm>,
) -> Result<Response, WebError> {
    let (view, toasts) = state.resets.join(&form.email, || {
        let toasts = Arc::new(ToastBuffer::new());
        let view = reset_view(&state, Arc::clone(&toasts));
        view.set_email(form.email.clone());
        (Arc::new(view), toasts)
    });

    if view.submit().await == SubmitOutcome::Ignored {
        // Another POST for this address owns the request; show it as pending.
        let page = ResetPasswordTemplate::from_state(view.state(), Vec::new(), None);
        state.resets.release(&form.email, &view);
        return Ok(render(&page)?.into_response());
    }
    state.resets.release(&form.email, &view);

    // The view is dropped with this request, so the browser carries the
    // delayed move to the next step.
    let redirect = view
        .pending_navigation()
        .map(|(target, delay)| RedirectMeta::new(&target, delay));
    let refresh = redirect.as_ref().map(RedirectMeta::header_value);

    let page = ResetPasswordTemplate::from_state(view.state(), toasts.drain(), redirect);
    let html = render(&page)?;

    Ok(match refresh {
        Some(value) => ([(REFRESH, value)], html).into_response(),
        None => html.into_response(),
    })
}

async fn reset_try_again(
    State(state): State<AppState>,
    Form(form): Form<ResetForm>,
) -> Result<Html<String>, WebError> {
    let toasts = Arc::new(ToastBuffer::new());
    let view = reset_view(&state, Arc::clone(&toasts));
    view.set_email(form.email);
    view.try_again();

    render(&ResetPasswordTemplate::from_state(view.state(), toasts.drain(), None))
}

async fn dashboard_page(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Html<String>, WebError> {
    let toasts = Arc::new(ToastBuffer::new());
    let view = dashboard_view(&state, cookies, Arc::clone(&toasts));
    let phase = view.load().await;

    render_dashboard(&state, phase, &toasts)
}

async fn dashboard_retry(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Html<String>, WebError> {
    let toasts = Arc::new(ToastBuffer::new());
    let view = dashboard_view(&state, cookies, Arc::clone(&toasts));
    let phase = view.retry().await;

    render_dashboard(&state, phase, &toasts)
}

fn render_dashboard(
    state: &AppState,
    phase: DashboardPhase,
    toasts: &ToastBuffer,
) -> Result<Html<String>, WebError> {
    let template = DashboardTemplate {
        reports_href: NavTarget::AdminReports.path(),
        complaints_href: NavTarget::Complaints.path(),
        projection: phase
            .stats()
            .map(|stats| DashboardProjection::build(stats, &state.config.display.date_format)),
        toasts: toasts.drain(),
    };
    render(&template)
}

async fn api_dashboard_summary(
    State(state): State<AppState>,
    cookies: Cookies,
) -> impl IntoResponse {
    let toasts = Arc::new(ToastBuffer::new());
    let view = dashboard_view(&state, cookies, Arc::clone(&toasts));

    match view.load().await {
        DashboardPhase::Ready(stats) => Json(DashboardProjection::build(
            &stats,
            &state.config.display.date_format,
        ))
        .into_response(),
        _ => {
            let message = toasts
                .drain()
                .into_iter()
                .next()
                .map(|toast| toast.message)
                .unwrap_or_else(|| LOAD_FAILED_MESSAGE.to_string());
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": false, "message": message })),
            )
                .into_response()
        }
    }
}
