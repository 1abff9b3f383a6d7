pub mod config;
pub mod cookies;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use cookies::{CookieOrigin, CookieRecord, CookieSources, SameSite};
pub use error::HarvestError;
pub use types::*;
