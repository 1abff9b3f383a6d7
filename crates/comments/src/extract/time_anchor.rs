use async_trait::async_trait;
use tracing::{debug, info};

use fbharvest_browser::{Locator, PageDriver, Query};
use fbharvest_core::{Comment, CommentSet};

use super::{admit, truncate_chars, ExtractionStrategy};
use crate::labels::{contains_any, NAVIGATION_WORDS, TIME_FRAGMENTS};

const ANCHORS_PER_FRAGMENT: usize = 10;
const MAX_CONTEXT_CHARS: usize = 500;
const MAX_AUTHOR_CHARS: usize = 50;
const RAW_CONTEXT_CHARS: usize = 200;

/// Finds elements mentioning a relative timestamp and reads the comment
/// around them: the first short line is the author, the next substantial
/// line is the text.
pub struct TimeAnchorStrategy;

#[async_trait(?Send)]
impl ExtractionStrategy for TimeAnchorStrategy {
    fn name(&self) -> &'static str {
        "time-anchor"
    }

    async fn extract(&self, page: &dyn PageDriver) -> Vec<Comment> {
        let mut set = CommentSet::new();

        for fragment in TIME_FRAGMENTS {
            let anchors = Locator::new(Query::has_text("*", fragment));
            let count = match page.count(&anchors).await {
                Ok(n) => n,
                Err(e) => {
                    debug!("selector {} failed: {}", anchors, e);
                    continue;
                }
            };
            info!("{} elements mention \"{}\"", count, fragment);

            for i in 0..count.min(ANCHORS_PER_FRAGMENT) {
                let anchor = anchors.clone().nth(i);
                let contexts = [
                    anchor.clone(),
                    anchor.locate(Query::parent()),
                    anchor.locate(Query::ancestor(2)),
                ];
                for context in &contexts {
                    let Ok(text) = page.inner_text(context).await else {
                        continue;
                    };
                    let text = text.trim();
                    if let Some((author, body)) = split_time_anchored(text) {
                        let comment = Comment::new(author, body)
                            .with_raw_context(truncate_chars(text, RAW_CONTEXT_CHARS));
                        admit(&mut set, Ok(comment), i);
                    }
                }
            }
        }

        set.into_vec()
    }
}

/// Author and text read from the lines around a timestamp, skipping
/// timestamp lines and one- or two-character noise.
fn split_time_anchored(context: &str) -> Option<(String, String)> {
    if context.chars().count() >= MAX_CONTEXT_CHARS {
        return None;
    }
    if contains_any(&context.to_lowercase(), NAVIGATION_WORDS) {
        return None;
    }

    let lines: Vec<&str> = context
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return None;
    }

    let mut author: Option<&str> = None;
    for line in lines {
        let len = line.chars().count();
        if len <= 2 || TIME_FRAGMENTS.iter().any(|t| line.contains(t)) {
            continue;
        }
        match author {
            None if len < MAX_AUTHOR_CHARS => author = Some(line),
            Some(name) if len > 5 => return Some((name.to_string(), line.to_string())),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_author_then_text() {
        let context = "Marta Gómez\n2 h\nQué buena noticia para el barrio";
        assert_eq!(
            split_time_anchored(context),
            Some((
                "Marta Gómez".to_string(),
                "Qué buena noticia para el barrio".to_string()
            ))
        );
    }

    #[test]
    fn test_split_skips_noise_and_short_text() {
        // "Sí" is noise, "Vale" too short to be the text
        let context = "Sí\nPedro\nVale\nHoy llueve en Lima";
        assert_eq!(
            split_time_anchored(context),
            Some(("Pedro".to_string(), "Hoy llueve en Lima".to_string()))
        );
    }

    #[test]
    fn test_split_rejects_navigation_and_oversized() {
        assert_eq!(split_time_anchored("Inicio\nPedro\nHoy llueve mucho"), None);
        assert_eq!(split_time_anchored("Pedro"), None);
        let long = format!("Pedro\n{}", "a".repeat(600));
        assert_eq!(split_time_anchored(&long), None);
    }

    #[test]
    fn test_split_needs_short_author() {
        let context = format!("{}\nTexto suficiente", "x".repeat(60));
        assert_eq!(split_time_anchored(&context), None);
    }
}
