pub mod auth;
pub mod document_service;
pub mod guardia_service;
pub mod registration_service;
pub mod session_cookie;

// Re-export commonly used types
pub use document_service::DocumentService;
pub use guardia_service::GuardiaService;
pub use session_cookie::SessionCookieManager;
