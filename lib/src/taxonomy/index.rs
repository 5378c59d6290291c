use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::SiteConfig;
use crate::markdown::FrontMatter;
use crate::util::escape_html;

/// What taxonomy pages show about a content page. Text fields are escaped;
/// `excerpt` is HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub title: String,
    pub description: String,
    pub date: String,
    pub excerpt: String,
    pub url: String,
}

/// Pages grouped by taxonomy, then by term.
///
/// Only declared taxonomies are tracked. Terms are kept as written, so `Rust`
/// and `rust` are distinct terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageIndex {
    taxonomies: BTreeMap<String, BTreeMap<String, Vec<PageSummary>>>,
}

impl PageSummary {
    pub fn new(front_matter: &FrontMatter, excerpt: &str, url: &str) -> Self {
        PageSummary {
            title: escape_html(&front_matter.title),
            description: escape_html(&front_matter.description),
            date: escape_html(&front_matter.date),
            excerpt: excerpt.to_string(),
            url: escape_html(url),
        }
    }
}

impl PageIndex {
    /// An index for the taxonomies declared in `config`, listing their
    /// configured terms with no pages yet.
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut index = PageIndex::default();
        for (taxonomy, terms) in &config.taxonomies {
            index.declare(taxonomy, terms.iter().map(String::as_str));
        }

        index
    }

    pub fn declare<'a, I>(&mut self, taxonomy: &str, terms: I)
        where I: IntoIterator<Item = &'a str>
    {
        let entry = self.taxonomies.entry(taxonomy.to_string()).or_default();
        for term in terms.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
            entry.entry(term.to_string()).or_default();
        }
    }

    /// Files `summary` under every term `front_matter` lists for each
    /// declared taxonomy. Returns how many terms the page was filed under.
    pub fn add_page(&mut self, front_matter: &FrontMatter, summary: &PageSummary) -> usize {
        let mut filed = 0;
        for (taxonomy, terms) in &mut self.taxonomies {
            let listed: BTreeSet<String> = front_matter.terms(taxonomy).iter()
                .map(|term| term.trim())
                .filter(|term| !term.is_empty())
                .map(String::from)
                .collect();

            for term in listed {
                terms.entry(term).or_default().push(summary.clone());
                filed += 1;
            }
        }

        filed
    }

    /// Puts each term's pages in a fixed order, newest date first and then by
    /// URL, independent of the order pages were added in.
    pub fn sort(&mut self) {
        for pages in self.taxonomies.values_mut().flat_map(|terms| terms.values_mut()) {
            pages.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.url.cmp(&b.url)));
        }
    }

    pub fn taxonomies(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Vec<PageSummary>>)> {
        self.taxonomies.iter().map(|(name, terms)| (name.as_str(), terms))
    }

    pub fn terms(&self, taxonomy: &str) -> Option<&BTreeMap<String, Vec<PageSummary>>> {
        self.taxonomies.get(taxonomy)
    }

    pub fn pages(&self, taxonomy: &str, term: &str) -> &[PageSummary] {
        self.terms(taxonomy)
            .and_then(|terms| terms.get(term))
            .map(|pages| pages.as_slice())
            .unwrap_or_default()
    }
}
