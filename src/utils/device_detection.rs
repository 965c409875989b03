use actix_web::http::header::USER_AGENT;
use actix_web::HttpRequest;
use serde::Serialize;

const MOBILE_MARKERS: &[&str] = &[
    "android", "iphone", "ipod", "blackberry", "iemobile", "opera mini", "mobile",
];
const TABLET_MARKERS: &[&str] = &["ipad", "tablet", "kindle", "silk"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub mobile: bool,
    /// Handheld devices are assumed to carry a usable camera for
    /// document and QR capture.
    pub camera_capable: bool,
}

pub fn is_mobile(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|m| ua.contains(m))
}

fn is_tablet(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    TABLET_MARKERS.iter().any(|m| ua.contains(m))
}

pub fn camera_capable(user_agent: &str) -> bool {
    is_mobile(user_agent) || is_tablet(user_agent)
}

pub fn detect(req: &HttpRequest) -> DeviceCapabilities {
    let ua = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    DeviceCapabilities {
        mobile: is_mobile(ua),
        camera_capable: camera_capable(ua),
    }
}
