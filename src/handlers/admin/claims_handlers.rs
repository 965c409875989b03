use actix_web::{web, HttpResponse};
use log::info;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{AuthenticatedUser, UserClaims};
use crate::services::auth::AdminServices;

/// POST /api/admin/users/{uid}/claims
///
/// Replaces the target user's custom claims. The change is visible once
/// that user's ID token is refreshed.
pub async fn set_user_claims(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    admin: web::Data<Option<Arc<AdminServices>>>,
    body: web::Json<UserClaims>,
) -> Result<HttpResponse, AppError> {
    let admin = admin.get_ref().as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Admin services are not configured".to_string())
    })?;

    let uid = path.into_inner();
    admin.set_custom_claims(&uid, &body).await?;

    info!("User {} updated claims of {}", caller.uid, uid);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::models::AuthContext;
    use actix_web::{dev::Service, http::StatusCode, test, App, HttpMessage};
    use mockito::Matcher;

    const TEST_KEY: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/fixtures/test_service_account_key.pem"
    ));

    fn admin_context() -> AuthContext {
        let user = AuthenticatedUser {
            uid: "admin-1".to_string(),
            email: "admin@zentry.mx".to_string(),
            email_verified: true,
            display_name: None,
            phone_number: None,
            created_at: None,
            last_login_at: None,
            id_token: "admin-id-token".to_string(),
        };
        AuthContext::authenticated(user, UserClaims { is_global_admin: true, ..Default::default() })
    }

    macro_rules! claims_app {
        ($admin:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($admin))
                    .wrap_fn(|req, srv| {
                        req.extensions_mut().insert(admin_context());
                        srv.call(req)
                    })
                    .route("/api/admin/users/{uid}/claims", web::post().to(set_user_claims)),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn test_claims_unavailable_without_admin_services() {
        let app = claims_app!(None::<Arc<AdminServices>>);
        let req = test::TestRequest::post()
            .uri("/api/admin/users/uid-7/claims")
            .set_json(json!({ "isGlobalAdmin": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_rt::test]
    async fn test_claims_are_written_through_admin_services() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"ya29.test","expires_in":3599}"#)
            .create_async()
            .await;
        let update = server
            .mock("POST", "/projects/zentry-test/accounts:update")
            .match_body(Matcher::PartialJson(json!({ "localId": "uid-7" })))
            .with_status(200)
            .with_body(r#"{"localId":"uid-7"}"#)
            .expect(1)
            .create_async()
            .await;

        let settings = AppSettings::for_tests(&server.url());
        let credential = json!({
            "project_id": "zentry-test",
            "private_key": TEST_KEY,
            "client_email": "admin@zentry-test.iam.gserviceaccount.com",
            "token_uri": format!("{}/token", server.url()),
        })
        .to_string();
        let admin = AdminServices::from_json(reqwest::Client::new(), &credential, &settings).unwrap();

        let app = claims_app!(Some(Arc::new(admin)));
        let req = test::TestRequest::post()
            .uri("/api/admin/users/uid-7/claims")
            .set_json(json!({ "role": "admin", "residencialId": "res-1" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        update.assert_async().await;
    }
}
