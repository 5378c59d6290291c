use pulldown_cmark::{Event, Tag, TagEnd};

use crate::util::escape_html;

/// Wraps a Markdown event stream and records an HTML excerpt of the leading
/// top-level blocks while passing every event through unchanged. Recording
/// stops at the first block boundary after `min_length` text characters.
pub struct Snippet<'s, I> {
    inner: I,
    snippet: &'s mut String,
    capture: Vec<bool>,
    text_len: usize,
    min_length: usize,
    done: bool,
}

impl<'s, I> Snippet<'s, I> {
    pub fn new(inner: I, snippet: &'s mut String, min_length: usize) -> Self {
        Snippet {
            inner,
            snippet,
            capture: vec![],
            text_len: 0,
            min_length,
            done: min_length == 0,
        }
    }

    fn open(&mut self, html: Option<String>) {
        let capturing = self.capture.last().copied().unwrap_or(true);
        match html {
            Some(html) if capturing => {
                self.snippet.push_str(&html);
                self.capture.push(true);
            }
            _ => self.capture.push(false),
        }
    }

    fn close(&mut self, html: &str) {
        if self.capture.pop().unwrap_or(false) {
            self.snippet.push_str(html);
        }

        if self.capture.is_empty() && self.text_len >= self.min_length {
            self.done = true;
        }
    }

    fn text(&mut self, text: &str, html: &str) {
        if self.capture.last().copied().unwrap_or(false) {
            self.snippet.push_str(html);
            self.text_len += text.chars().count();
        }
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Snippet<'_, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.inner.next()?;
        if self.done {
            return Some(event);
        }

        match &event {
            Event::Start(tag) => {
                let html = match tag {
                    Tag::Paragraph => Some("<p>".into()),
                    Tag::Emphasis => Some("<em>".into()),
                    Tag::Strong => Some("<strong>".into()),
                    Tag::Strikethrough => Some("<del>".into()),
                    Tag::BlockQuote => Some("<blockquote>".into()),
                    Tag::Link { dest_url, .. } => {
                        Some(format!(r#"<a href="{}">"#, escape_html(dest_url)))
                    }
                    _ => None,
                };

                self.open(html);
            }
            Event::End(tag) => match tag {
                TagEnd::Paragraph => self.close("</p>"),
                TagEnd::Emphasis => self.close("</em>"),
                TagEnd::Strong => self.close("</strong>"),
                TagEnd::Strikethrough => self.close("</del>"),
                TagEnd::BlockQuote => self.close("</blockquote>"),
                TagEnd::Link => self.close("</a>"),
                _ => self.close(""),
            },
            Event::SoftBreak => self.text(" ", " "),
            Event::HardBreak => self.text("", "<br>"),
            Event::Code(text) => {
                let html = format!("<code>{}</code>", escape_html(text));
                self.text(text, &html)
            }
            Event::Text(text) => self.text(text, &escape_html(text)),
            _ => {}
        }

        Some(event)
    }
}
