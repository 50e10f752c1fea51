pub mod xray;
pub mod zephyr;

pub use xray::XrayClient;
pub use zephyr::ZephyrClient;

/// Normalize a base URL so relative joins append to it instead of replacing
/// its last path segment.
pub(crate) fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
