pub mod chrome;
pub mod error;
pub mod page;
pub mod query;
pub mod snapshot;

pub use chrome::{ChromePage, ChromeSession};
pub use error::BrowserError;
pub use page::{ElementInfo, PageDriver};
pub use query::{Locator, Query};
pub use snapshot::SnapshotPage;
