//! Markdown rendering of a pipeline result, laid out like the map sidebar:
//! a place title followed by one card per article.

use crate::models::{Article, PipelineResult};
use itertools::Itertools;
use std::fmt::Write;

/// Place title shown above the articles.
///
/// The regional name is left out when it repeats the local one, and empty
/// labels are skipped.
pub fn sidebar_title(local: &str, regional: &str, national: &str) -> String {
    let mut parts = Vec::with_capacity(3);
    if !local.is_empty() {
        parts.push(local);
    }
    if !regional.is_empty() && regional != local {
        parts.push(regional);
    }
    if !national.is_empty() {
        parts.push(national);
    }
    parts.into_iter().join(", ")
}

fn write_card(md: &mut String, article: &Article) {
    if article.link.is_empty() {
        writeln!(md, "### {}\n", article.title).unwrap();
    } else {
        writeln!(md, "### [{}]({})\n", article.title, article.link).unwrap();
    }
    if !article.image.is_empty() {
        writeln!(md, "![]({})\n", article.image).unwrap();
    }
    if !article.description.is_empty() {
        writeln!(md, "{}\n", article.description).unwrap();
    }
}

/// Render a full result as Markdown.
pub fn result_to_markdown(result: &PipelineResult) -> String {
    let mut md = String::new();
    let title = sidebar_title(&result.local, &result.regional, &result.national);
    if title.is_empty() {
        writeln!(md, "## Unknown location\n").unwrap();
    } else {
        writeln!(md, "## {}\n", title).unwrap();
    }

    if result.articles.is_empty() {
        writeln!(md, "_No articles found_\n").unwrap();
        return md;
    }
    for article in &result.articles {
        write_card(&mut md, article);
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;

    fn result(articles: Vec<Article>) -> PipelineResult {
        PipelineResult {
            articles,
            local: "Leeds".into(),
            regional: "West Yorkshire".into(),
            national: "United Kingdom".into(),
            outcome: Outcome::Primary,
            queries: vec![],
        }
    }

    #[test]
    fn test_sidebar_title() {
        assert_eq!(
            sidebar_title("Leeds", "West Yorkshire", "United Kingdom"),
            "Leeds, West Yorkshire, United Kingdom"
        );
        assert_eq!(sidebar_title("Berlin", "Berlin", "Germany"), "Berlin, Germany");
        assert_eq!(sidebar_title("", "", "China"), "China");
        assert_eq!(sidebar_title("", "Bavaria", "Germany"), "Bavaria, Germany");
        assert_eq!(sidebar_title("", "", ""), "");
    }

    #[test]
    fn test_cards() {
        let md = result_to_markdown(&result(vec![
            Article {
                title: "Council approves budget".into(),
                description: "The council met on Tuesday.".into(),
                link: "https://example.com/a".into(),
                image: String::new(),
            },
            Article {
                title: "No link story".into(),
                ..Default::default()
            },
        ]));
        assert!(md.starts_with("## Leeds, West Yorkshire, United Kingdom\n"));
        assert!(md.contains("### [Council approves budget](https://example.com/a)\n"));
        assert!(md.contains("The council met on Tuesday.\n"));
        assert!(md.contains("### No link story\n"));
        assert!(!md.contains("![]"));
    }

    #[test]
    fn test_no_articles() {
        let md = result_to_markdown(&result(vec![]));
        assert!(md.contains("_No articles found_"));
    }

    #[test]
    fn test_unknown_location() {
        let mut r = result(vec![]);
        r.local.clear();
        r.regional.clear();
        r.national.clear();
        assert!(result_to_markdown(&r).starts_with("## Unknown location"));
    }
}
