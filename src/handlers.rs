use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::Serialize;
use serde_json::json;

use crate::config::ProfileUpdateAuth;
use crate::cookies::{access_token, remove_cookie, ACCESS_TOKEN_COOKIE};
use crate::error::AppError;
use crate::jwt::TokenCodec;
use crate::profile::{ProfileRecord, ProfileStore, ProfileUpdate};

/// Shared, read-only state handed to every worker.
#[derive(Debug, Clone)]
pub struct AppState {
    pub codec: TokenCodec,
    pub store: ProfileStore,
    pub profile_update_auth: ProfileUpdateAuth,
}

/// Subject of a verified bearer token.
#[derive(Debug, Clone)]
pub struct Subject(pub String);

impl FromRequest for Subject {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(subject_from_request(req).map(Subject))
    }
}

fn subject_from_request(req: &HttpRequest) -> Result<String, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("application state not configured".to_string()))?;
    let token = access_token(req).ok_or(AppError::UnauthorizedMissingBearer)?;
    Ok(state.codec.extract_subject(&token)?)
}

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Collaborative Research Platform API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

pub async fn get_profile(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    let store = state.store.clone();

    let profile = web::block(move || store.get(&user_id)).await??;

    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Debug, Serialize)]
struct ProfileUpdated {
    message: &'static str,
    profile: ProfileRecord,
}

pub async fn update_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();

    if state.profile_update_auth == ProfileUpdateAuth::Owner {
        let subject = subject_from_request(&req)?;
        if subject != user_id {
            tracing::warn!(%user_id, "profile update by another subject refused");
            return Err(AppError::Forbidden);
        }
    }

    let store = state.store.clone();
    let update = body.into_inner();
    let profile = {
        let user_id = user_id.clone();
        web::block(move || store.put(&user_id, update)).await??
    };

    tracing::info!(%user_id, "profile updated");

    Ok(HttpResponse::Ok().json(ProfileUpdated {
        message: "Profile updated successfully",
        profile,
    }))
}

pub async fn me(subject: Subject) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "subject": subject.0 }))
}

pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(remove_cookie(ACCESS_TOKEN_COOKIE))
        .json(json!({ "message": "Logged out" }))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::bad_request("INVALID_BODY", err.to_string()).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api/v1")
                .route("/profiles/{user_id}", web::get().to(get_profile))
                .route("/profiles/{user_id}", web::put().to(update_profile))
                .route("/auth/me", web::get().to(me))
                .route("/auth/logout", web::post().to(logout)),
        );
}
