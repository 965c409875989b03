use actix_web::{cookie::Cookie, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::models::{AuthContext, UserClaims, UserProfile};
use crate::services::session_cookie::SessionCookieManager;
use crate::utils::date_format::{format_date, format_relative};
use crate::utils::device_detection::{detect, DeviceCapabilities};

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
    pub claims: UserClaims,
    pub member_since: Option<String>,
    pub last_seen: Option<String>,
    pub device: DeviceCapabilities,
}

fn with_cookie(cookie: &Cookie<'_>) -> Result<HttpResponse, AppError> {
    let mut response = HttpResponse::Ok().json(json!({ "success": true }));
    response.add_cookie(cookie).map_err(|e| {
        error!("Failed to write session cookie: {}", e);
        AppError::Internal("Failed to update session cookie".to_string())
    })?;
    Ok(response)
}

/// POST /api/auth/session
pub async fn create_session(
    req: HttpRequest,
    cookies: web::Data<SessionCookieManager>,
    body: web::Json<SessionRequest>,
) -> Result<HttpResponse, AppError> {
    let cookie = cookies.set(&body.token)?;
    let response = with_cookie(&cookie)?;

    info!("Session cookie issued (mobile client: {})", detect(&req).mobile);
    Ok(response)
}

/// DELETE /api/auth/session
pub async fn delete_session(cookies: web::Data<SessionCookieManager>) -> Result<HttpResponse, AppError> {
    let response = with_cookie(&cookies.delete())?;
    info!("Session cookie removed");
    Ok(response)
}

/// POST /api/auth/clear-session
pub async fn clear_session(cookies: web::Data<SessionCookieManager>) -> Result<HttpResponse, AppError> {
    let response = with_cookie(&cookies.clear())?;
    info!("Session cookie cleared");
    Ok(response)
}

/// GET /api/auth/me
pub async fn session_status(req: HttpRequest, ctx: AuthContext) -> HttpResponse {
    let now = Utc::now();
    let user = ctx.profile();

    let member_since = ctx
        .user
        .as_ref()
        .and_then(|u| u.created_at)
        .map(|d| format_date(&d));
    let last_seen = ctx
        .user
        .as_ref()
        .and_then(|u| u.last_login_at)
        .map(|d| format_relative(&d, &now));

    HttpResponse::Ok().json(SessionStatusResponse {
        authenticated: ctx.is_authenticated(),
        user,
        claims: ctx.claims,
        member_since,
        last_seen,
        device: detect(&req),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::models::AuthenticatedUser;
    use actix_web::{http::header::SET_COOKIE, http::StatusCode, test, App, HttpMessage, ResponseError};
    use chrono::TimeZone;

    fn cookie_manager(environment: &str) -> web::Data<SessionCookieManager> {
        let mut settings = AppSettings::for_tests("http://localhost");
        settings.app.environment = environment.to_string();
        web::Data::new(SessionCookieManager::new(&settings))
    }

    macro_rules! session_app {
        ($environment:expr) => {
            test::init_service(
                App::new()
                    .app_data(cookie_manager($environment))
                    .route("/api/auth/session", web::post().to(create_session))
                    .route("/api/auth/session", web::delete().to(delete_session))
                    .route("/api/auth/clear-session", web::post().to(clear_session)),
            )
            .await
        };
    }

    fn set_cookie_header<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
        resp.headers()
            .get(SET_COOKIE)
            .expect("Set-Cookie header")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[actix_rt::test]
    async fn test_create_session_sets_cookie_outside_production() {
        let app = session_app!("development");
        let req = test::TestRequest::post()
            .uri("/api/auth/session")
            .set_json(json!({ "token": "abc" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let header = set_cookie_header(&resp);
        assert!(header.starts_with("session=abc"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Max-Age=604800"));
        assert!(!header.contains("Secure"));

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "success": true }));
    }

    #[actix_rt::test]
    async fn test_create_session_secure_in_production() {
        let app = session_app!("production");
        let req = test::TestRequest::post()
            .uri("/api/auth/session")
            .set_json(json!({ "token": "abc" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(set_cookie_header(&resp).contains("Secure"));
    }

    #[actix_rt::test]
    async fn test_blank_token_is_bad_request() {
        let app = session_app!("development");
        let req = test::TestRequest::post()
            .uri("/api/auth/session")
            .set_json(json!({ "token": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.headers().get(SET_COOKIE).is_none());
    }

    #[actix_rt::test]
    async fn test_injected_cookie_attributes_are_rejected() {
        let app = session_app!("development");
        let req = test::TestRequest::post()
            .uri("/api/auth/session")
            .set_json(json!({ "token": "abc; Domain=evil.example" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.headers().get(SET_COOKIE).is_none());
    }

    #[::core::prelude::v1::test]
    fn test_unwritable_cookie_is_internal_error() {
        let err = with_cookie(&Cookie::new("session", "a\nb")).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_rt::test]
    async fn test_clear_then_clear_again_is_idempotent() {
        let app = session_app!("development");

        let mut headers = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::post().uri("/api/auth/clear-session").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let cookie = resp.response().cookies().next().unwrap().into_owned();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
            headers.push(set_cookie_header(&resp));
        }
        assert_eq!(headers[0], headers[1]);
    }

    #[actix_rt::test]
    async fn test_delete_session_expires_cookie() {
        let app = session_app!("development");
        let req = test::TestRequest::delete()
            .uri("/api/auth/session")
            .cookie(Cookie::new("session", "abc"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let header = set_cookie_header(&resp);
        assert!(header.starts_with("session=;"));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Expires="));
    }

    #[actix_rt::test]
    async fn test_session_status_reports_profile_and_device() {
        let user = AuthenticatedUser {
            uid: "uid-3".to_string(),
            email: "vecino@zentry.mx".to_string(),
            email_verified: true,
            display_name: Some("Vecino".to_string()),
            phone_number: None,
            created_at: Some(Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()),
            last_login_at: None,
            id_token: "t".to_string(),
        };
        let ctx = AuthContext::authenticated(user, UserClaims::default());
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("user-agent", "Mozilla/5.0 (Linux; Android 14) Mobile"))
            .to_http_request();
        req.extensions_mut().insert(ctx.clone());

        let resp = session_status(req, ctx).await;
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["authenticated"], true);
        assert_eq!(json["user"]["id"], "uid-3");
        assert_eq!(json["user"]["role"], "user");
        assert_eq!(json["memberSince"], "14 de marzo de 2025");
        assert_eq!(json["claims"]["isGlobalAdmin"], false);
        assert_eq!(json["device"]["mobile"], true);
        assert_eq!(json["device"]["cameraCapable"], true);
    }
}
