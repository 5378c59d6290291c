use pulldown_cmark::{html, Options, Parser};

use crate::markdown::Snippet;

/// Text characters collected for a page excerpt before it ends at the next
/// block boundary.
pub const EXCERPT_LENGTH: usize = 200;

/// Which Markdown syntax is recognized. Chosen once per build.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RuleSet {
    /// Plain CommonMark.
    Basic,
    /// CommonMark plus tables, strikethrough, task lists, and footnotes.
    Extended,
}

/// A rendered document body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Html {
    pub content: String,
    pub excerpt: String,
}

/// Converts document bodies to HTML fragments.
#[derive(Debug, Clone, Copy)]
pub struct Markdown {
    options: Options,
    excerpt_length: usize,
}

impl RuleSet {
    pub fn options(self) -> Options {
        match self {
            RuleSet::Basic => Options::empty(),
            RuleSet::Extended => Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES,
        }
    }
}

impl From<bool> for RuleSet {
    fn from(extended: bool) -> Self {
        if extended { RuleSet::Extended } else { RuleSet::Basic }
    }
}

impl Markdown {
    pub fn new(rules: RuleSet) -> Self {
        Markdown { options: rules.options(), excerpt_length: EXCERPT_LENGTH }
    }

    pub fn with_excerpt_length(mut self, length: usize) -> Self {
        self.excerpt_length = length;
        self
    }

    /// Renders `body` to a complete HTML fragment along with its excerpt.
    pub fn render(&self, body: &str) -> Html {
        let mut excerpt = String::new();
        let mut content = String::with_capacity(body.len() + body.len() / 2);

        let parser = Parser::new_ext(body, self.options);
        html::push_html(&mut content, Snippet::new(parser, &mut excerpt, self.excerpt_length));
        Html { content, excerpt }
    }
}

#[cfg(test)]
mod tests {
    use super::{Markdown, RuleSet};

    #[test]
    fn plain_text_survives_verbatim() {
        let text = "Just some words, with punctuation: yes... and -- fine";
        let html = Markdown::new(RuleSet::Extended).render(text);
        assert_eq!(html.content, format!("<p>{text}</p>\n"));
    }

    #[test]
    fn headings_become_heading_elements() {
        let html = Markdown::new(RuleSet::Basic).render("# Hi\n");
        assert_eq!(html.content, "<h1>Hi</h1>\n");
        assert_eq!(html.excerpt, "");
    }

    #[test]
    fn extended_syntax_depends_on_the_rule_set() {
        let input = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n";

        let extended = Markdown::new(RuleSet::Extended).render(input);
        assert!(extended.content.contains("<table>"));
        assert!(extended.content.contains("<del>gone</del>"));

        let basic = Markdown::new(RuleSet::Basic).render(input);
        assert!(!basic.content.contains("<table>"));
        assert!(basic.content.contains("~~gone~~"));
    }

    #[test]
    fn excerpts_come_from_the_body() {
        let html = Markdown::new(RuleSet::Basic)
            .with_excerpt_length(5)
            .render("Intro text.\n\nMore text.");

        assert_eq!(html.excerpt, "<p>Intro text.</p>");
    }
}
