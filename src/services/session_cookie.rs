use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

use crate::config::settings::AppSettings;
use crate::error::AppError;

pub const SESSION_COOKIE_NAME: &str = "session";
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
}

/// Builds the `session` cookie that carries the provider's opaque ID token.
///
/// Only the token's characters are checked here; the token is validated by
/// the identity provider when a session is resolved.
#[derive(Debug, Clone)]
pub struct SessionCookieManager {
    secure: bool,
}

impl SessionCookieManager {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            secure: settings.app.is_production(),
        }
    }

    fn base(&self, value: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE_NAME, value)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .finish()
    }

    /// Session cookie carrying `token`, stored as given, for seven days.
    ///
    /// ID tokens are JWTs, so anything outside the base64url-plus-dot
    /// alphabet is rejected rather than written into `Set-Cookie`.
    pub fn set(&self, token: &str) -> Result<Cookie<'static>, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::Validation("Token is required".to_string()));
        }
        if !token.bytes().all(is_token_byte) {
            return Err(AppError::Validation("Token contains invalid characters".to_string()));
        }

        let mut cookie = self.base(token.to_string());
        cookie.set_max_age(Duration::days(SESSION_MAX_AGE_DAYS));
        Ok(cookie)
    }

    /// Overwrites the session with an empty value that expires immediately.
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie
    }

    /// Removal cookie: empty value, zero max-age and an expiry in the past.
    pub fn delete(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.make_removal();
        cookie
    }

    /// Token carried by the request's session cookie, if non-empty.
    pub fn token_from_request(req: &HttpRequest) -> Option<String> {
        req.cookie(SESSION_COOKIE_NAME)
            .map(|c| c.value().trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn manager(environment: &str) -> SessionCookieManager {
        let mut settings = AppSettings::for_tests("http://localhost");
        settings.app.environment = environment.to_string();
        SessionCookieManager::new(&settings)
    }

    #[test]
    fn test_set_cookie_attributes_outside_production() {
        let cookie = manager("development").set("abc").unwrap();
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("session=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Max-Age=604800"));
        assert!(rendered.contains("Path=/"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_set_cookie_is_secure_in_production() {
        let cookie = manager("production").set("abc").unwrap();
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_blank_token_rejected() {
        assert!(matches!(manager("development").set("   "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_token_stored_as_given() {
        let jwt = "eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJ1aWQtMSJ9.c2ln_-";
        assert_eq!(manager("development").set(jwt).unwrap().value(), jwt);
    }

    #[test]
    fn test_tokens_that_could_inject_attributes_rejected() {
        let m = manager("development");
        for token in ["abc; Domain=evil.example", " abc", "abc ", "a\nb", "a,b", "a\"b", "a=b"] {
            assert!(matches!(m.set(token), Err(AppError::Validation(_))), "{:?} accepted", token);
        }
    }

    #[test]
    fn test_clear_is_empty_with_zero_max_age_and_idempotent() {
        let m = manager("development");
        let first = m.clear();
        let second = m.clear();

        assert_eq!(first.value(), "");
        assert_eq!(first.max_age(), Some(Duration::ZERO));
        assert_eq!(first.to_string(), second.to_string());
        assert!(first.to_string().contains("Max-Age=0"));
    }

    #[test]
    fn test_delete_is_removal_cookie() {
        let cookie = manager("development").delete();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(cookie.expires().is_some());
    }

    #[test]
    fn test_token_from_request() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE_NAME, "tok"))
            .to_http_request();
        assert_eq!(SessionCookieManager::token_from_request(&req).as_deref(), Some("tok"));

        let empty = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE_NAME, ""))
            .to_http_request();
        assert!(SessionCookieManager::token_from_request(&empty).is_none());
    }
}
