//! HTTP surface: the rendered page, the JSON relay endpoint and the HTML
//! form post that goes through the client-level fallback.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Form, State};
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use portfolio_lib::contact::{ContactClient, ContactForm, ContactSubmission, Relay, RelayResponse};
use portfolio_lib::profile::{self, ContactBanner};
use portfolio_lib::{
    render_page, LoadState, PageContext, PortfolioError, PortfolioStore, SourceRegistry, Templates,
};

struct Inner {
    store: Arc<PortfolioStore>,
    registry: SourceRegistry,
    templates: Templates,
    relay: Relay,
    contact: ContactClient,
    form: Mutex<ContactForm>,
    fallback_email: String,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    pub fn new(
        store: Arc<PortfolioStore>,
        registry: SourceRegistry,
        relay: Relay,
        contact: ContactClient,
        fallback_email: &str,
    ) -> Result<Self, PortfolioError> {
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                registry,
                templates: Templates::new()?,
                relay,
                contact,
                form: Mutex::new(ContactForm::new()),
                fallback_email: fallback_email.to_string(),
            }),
        })
    }

    fn render(&self, banner: Option<ContactBanner>) -> Response {
        let mut ctx = PageContext::new(&self.inner.fallback_email);
        ctx.banner = banner;
        let state = self.inner.store.state();
        match render_page(&self.inner.templates, &state, &self.inner.registry, &ctx) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Page render failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
            }
        }
    }

    fn form(&self) -> MutexGuard<'_, ContactForm> {
        self.inner.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn target_email(&self) -> String {
        match self.inner.store.state() {
            LoadState::Ready(data) => profile::target_email(Some(data.as_ref()), &self.inner.fallback_email),
            _ => self.inner.fallback_email.clone(),
        }
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers([
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
            HeaderName::from_static("accept-version"),
            header::CONTENT_LENGTH,
            HeaderName::from_static("content-md5"),
            header::CONTENT_TYPE,
            header::DATE,
            HeaderName::from_static("x-api-version"),
        ])
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(
            "/api/send-email",
            post(send_email)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route("/contact", post(contact_form))
        .route("/api/health", get(health))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Serving portfolio on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Response {
    let banner = ContactBanner::from_form(&state.form(), Instant::now());
    state.render(banner)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> (StatusCode, Json<RelayResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(RelayResponse::failure("Method not allowed")),
    )
}

async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<RelayResponse>) {
    let submission: ContactSubmission = match serde_json::from_slice(&body) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Rejecting malformed relay request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(RelayResponse::failure("Invalid JSON body")),
            );
        }
    };
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());

    let (code, response) = state.inner.relay.respond(&submission, referer).await;
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

/// Fields posted by the page's contact form.
#[derive(Debug, Deserialize)]
struct ContactFormInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    subject: String,
    purpose: Option<String>,
    #[serde(default)]
    message: String,
    consent: Option<String>,
}

async fn contact_form(
    State(state): State<AppState>,
    Form(input): Form<ContactFormInput>,
) -> Response {
    let target_email = state.target_email();
    let submission = ContactSubmission {
        name: input.name,
        email: input.email,
        subject: input.subject,
        purpose: input.purpose.filter(|p| !p.is_empty()),
        message: input.message,
        target_email: target_email.clone(),
        consent: input.consent.is_some(),
    };

    let begun = state.form().begin_submit(&submission, Instant::now());
    match begun {
        Ok(()) => {}
        Err(missing) if !missing.is_empty() => {
            tracing::warn!("Contact form incomplete: {}", missing.join(", "));
            let banner =
                ContactBanner::failure(&target_email, &submission.subject, &submission.message);
            return state.render(Some(banner));
        }
        Err(_) => {
            tracing::info!("Contact form busy, ignoring submission");
            let banner = ContactBanner::from_form(&state.form(), Instant::now());
            return (StatusCode::CONFLICT, state.render(banner)).into_response();
        }
    }

    let delivered = match state.inner.contact.submit(&submission).await {
        Ok(delivery) => {
            tracing::info!("Contact message delivered ({:?})", delivery);
            true
        }
        Err(e) => {
            tracing::error!("Contact message failed: {}", e);
            false
        }
    };
    let banner = {
        let mut form = state.form();
        let now = Instant::now();
        form.finish(delivered, now);
        ContactBanner::from_form(&form, now)
    };
    state.render(banner)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let load = match state.inner.store.state() {
        LoadState::Loading => "loading",
        LoadState::Ready(_) => "ready",
        LoadState::Failed(_) => "failed",
    };
    Json(serde_json::json!({
        "status": "ok",
        "data": load,
        "provider": state.inner.relay.method(),
    }))
}
