pub mod date_format;
pub mod device_detection;
