//! Selector model shared by the live browser and saved-page snapshots.
//! Plain CSS cannot express "element whose text contains X" or "nth
//! ancestor", so queries are a small tagged enum that both page backends
//! interpret the same way.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    /// Descendants matching a CSS selector.
    Css { css: String },
    /// CSS matches whose visible text contains `text`, case-insensitively.
    HasText { css: String, text: String },
    /// Any element whose whole visible text equals `text`.
    ExactText { text: String },
    /// CSS matches that contain a descendant for every `has` selector and
    /// none for any `has_not` selector. An entry starting with `>` is a
    /// child-combinator path anchored at the element's direct children,
    /// like the relative selector in `:has(> div > span)`.
    Has {
        css: String,
        has: Vec<String>,
        has_not: Vec<String>,
    },
    /// The element `levels` steps up the tree.
    Ancestor { levels: usize },
}

impl Query {
    pub fn css(css: &str) -> Self {
        Query::Css { css: css.to_string() }
    }

    pub fn has_text(css: &str, text: &str) -> Self {
        Query::HasText {
            css: css.to_string(),
            text: text.to_string(),
        }
    }

    pub fn exact_text(text: &str) -> Self {
        Query::ExactText {
            text: text.to_string(),
        }
    }

    pub fn has(css: &str, has: &[&str]) -> Self {
        Query::Has {
            css: css.to_string(),
            has: has.iter().map(|s| s.to_string()).collect(),
            has_not: Vec::new(),
        }
    }

    pub fn without(css: &str, has_not: &[&str]) -> Self {
        Query::Has {
            css: css.to_string(),
            has: Vec::new(),
            has_not: has_not.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn parent() -> Self {
        Query::Ancestor { levels: 1 }
    }

    pub fn ancestor(levels: usize) -> Self {
        Query::Ancestor { levels }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Css { css } => write!(f, "{}", css),
            Query::HasText { css, text } => write!(f, "{}:has-text(\"{}\")", css, text),
            Query::ExactText { text } => write!(f, "text=\"{}\"", text),
            Query::Has { css, has, has_not } => {
                write!(f, "{}", css)?;
                for inner in has {
                    write!(f, ":has({})", inner)?;
                }
                for inner in has_not {
                    write!(f, ":not(:has({}))", inner)?;
                }
                Ok(())
            }
            Query::Ancestor { levels } => {
                let hops = vec![".."; *levels];
                write!(f, "{}", hops.join("/"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub query: Query,
    pub nth: Option<usize>,
}

/// A lazily-resolved chain of queries, re-evaluated against the page on
/// every operation. Each step searches inside the matches of the previous
/// one; `nth` narrows a step to a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    pub fn new(query: Query) -> Self {
        Self {
            steps: vec![Step { query, nth: None }],
        }
    }

    pub fn css(css: &str) -> Self {
        Self::new(Query::css(css))
    }

    pub fn nth(mut self, index: usize) -> Self {
        if let Some(last) = self.steps.last_mut() {
            last.nth = Some(index);
        }
        self
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Searches inside the current matches.
    pub fn locate(&self, query: Query) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step { query, nth: None });
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .steps
            .iter()
            .map(|step| match step.nth {
                Some(n) => format!("{} >> nth={}", step.query, n),
                None => step.query.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join(" >> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_reads_like_a_selector() {
        assert_eq!(
            Query::has_text("span", "See more").to_string(),
            r#"span:has-text("See more")"#
        );
        assert_eq!(
            Query::without("span[dir=\"auto\"]", &["strong"]).to_string(),
            r#"span[dir="auto"]:not(:has(strong))"#
        );
        assert_eq!(Query::ancestor(2).to_string(), "../..");
        assert_eq!(
            Query::has("div", &["> div > div > strong", "span"]).to_string(),
            "div:has(> div > div > strong):has(span)"
        );

        let locator = Locator::css("div[role=\"article\"]")
            .nth(3)
            .locate(Query::css("strong"))
            .first();
        assert_eq!(
            locator.to_string(),
            r#"div[role="article"] >> nth=3 >> strong >> nth=0"#
        );
    }

    #[test]
    fn test_locate_does_not_mutate_parent() {
        let block = Locator::css("article").nth(1);
        let author = block.locate(Query::css("strong"));

        assert_eq!(block.steps().len(), 1);
        assert_eq!(author.steps().len(), 2);
        assert_eq!(author.steps()[0].nth, Some(1));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let value = serde_json::to_value(Locator::new(Query::exact_text("Comments"))).unwrap();
        assert_eq!(value["steps"][0]["query"]["kind"], "exact_text");
        assert_eq!(value["steps"][0]["nth"], serde_json::Value::Null);
    }
}
