//! Locating, expanding and extracting the comments of a post.

pub mod chain;
pub mod expand;
pub mod extract;
pub mod inspect;
pub mod labels;
pub mod pacing;
pub mod pipeline;
pub mod post;
pub mod region;

#[cfg(test)]
mod testing;

pub use extract::{CommentExtractor, Extraction, ExtractionStrategy, SkipReason};
pub use inspect::{inspect_page, Inspection};
pub use pacing::Pacing;
pub use pipeline::{CommentScraper, ScrapeReport};
pub use post::extract_post_text;
