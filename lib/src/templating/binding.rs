//! The data each kind of template is rendered with.
//!
//! Text fields hold HTML-escaped values since templates render without
//! auto-escaping. Fields documented as HTML are emitted verbatim.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::markdown::FrontMatter;
use crate::taxonomy::PageSummary;
use crate::util::escape_html;

/// Site-wide values, available as `site` in every template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteBinding {
    pub title: String,
    pub base_url: String,
    pub theme: String,
    pub author: String,
}

/// Bound to `base` for every content page.
#[derive(Debug, Serialize)]
pub struct PageBinding<'a> {
    pub site: &'a SiteBinding,
    pub title: String,
    pub description: String,
    pub date: String,
    /// Rendered body, HTML.
    pub content: &'a str,
    /// Site-relative URL of the page, escaped.
    pub url: String,
    /// Terms of each declared taxonomy the page lists.
    pub taxonomies: BTreeMap<String, Vec<TermLink>>,
}

/// Bound to `taxonomy/terms` for a taxonomy's listing page.
#[derive(Debug, Serialize)]
pub struct TermsBinding<'a> {
    pub site: &'a SiteBinding,
    pub taxonomy: String,
    pub terms: Vec<TermLink>,
}

/// Bound to `taxonomy/<taxonomy>` for one term's page.
#[derive(Debug, Serialize)]
pub struct TermBinding<'a> {
    pub site: &'a SiteBinding,
    pub taxonomy: String,
    pub term: TermLink,
    pub pages: &'a [PageSummary],
}

/// A term as displayed and linked to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermLink {
    pub name: String,
    pub slug: String,
    /// Site-relative URL of the term's page.
    pub url: String,
    pub count: usize,
}

impl SiteBinding {
    pub fn new(config: &SiteConfig) -> Self {
        SiteBinding {
            title: escape_html(&config.title),
            base_url: config.base_url.clone(),
            theme: config.theme.clone(),
            author: escape_html(&config.params.author),
        }
    }
}

impl<'a> PageBinding<'a> {
    pub fn new(
        site: &'a SiteBinding,
        config: &SiteConfig,
        front_matter: &FrontMatter,
        content: &'a str,
        url: &str,
    ) -> Self {
        let taxonomies = config.taxonomy_names()
            .map(|taxonomy| {
                let links = front_matter.terms(taxonomy).iter()
                    .map(|term| TermLink::new(taxonomy, term, 0))
                    .collect();

                (taxonomy.to_string(), links)
            })
            .collect();

        PageBinding {
            site,
            title: escape_html(&front_matter.title),
            description: escape_html(&front_matter.description),
            date: escape_html(&front_matter.date),
            content,
            url: escape_html(url),
            taxonomies,
        }
    }
}

impl TermLink {
    pub fn new(taxonomy: &str, term: &str, count: usize) -> Self {
        let slug = crate::util::slugify(term);
        TermLink {
            name: escape_html(term),
            url: format!("/{}/{}/", taxonomy, slug),
            slug,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_text_is_escaped_but_content_is_not() {
        let config = SiteConfig { title: "A & B".into(), ..SiteConfig::default() };
        let site = SiteBinding::new(&config);
        let front_matter = FrontMatter {
            title: "<script>alert(1)</script>".into(),
            description: "\"quoted\"".into(),
            ..FrontMatter::default()
        };

        let binding = PageBinding::new(&site, &config, &front_matter, "<h1>Hi</h1>", "/\"hi\".html");
        assert_eq!(binding.site.title, "A &amp; B");
        assert_eq!(binding.title, "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert_eq!(binding.description, "&quot;quoted&quot;");
        assert_eq!(binding.content, "<h1>Hi</h1>");
        assert_eq!(binding.url, "/&quot;hi&quot;.html");
        assert!(binding.taxonomies["tags"].is_empty());
    }

    #[test]
    fn term_links_use_slugs() {
        let link = TermLink::new("tags", "Rust & Web", 2);
        assert_eq!(link.name, "Rust &amp; Web");
        assert_eq!(link.slug, "rust-web");
        assert_eq!(link.url, "/tags/rust-web/");
    }
}
