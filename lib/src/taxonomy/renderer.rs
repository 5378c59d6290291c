use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::{Chainable, Result};
use crate::page::write_file;
use crate::taxonomy::{PageIndex, PageSummary};
use crate::templating::{TemplateSet, TermBinding, TermLink, TermsBinding, SiteBinding};
use crate::templating::{TAXONOMY_DIR, TERMS_TEMPLATE};
use crate::util::escape_html;

/// Counts of taxonomy pages written and failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxonomyReport {
    pub rendered: usize,
    pub failed: usize,
}

/// Writes every taxonomy's listing page and a page for each term with at
/// least one page. A template missing for a taxonomy skips that part of it; a
/// failure on one page doesn't stop the rest.
pub fn render_taxonomies(
    index: &PageIndex,
    templates: &TemplateSet,
    site: &SiteBinding,
    output: &Path,
) -> TaxonomyReport {
    let mut report = TaxonomyReport::default();
    for (taxonomy, terms) in index.taxonomies() {
        let mut record = |result: Result<()>| match result {
            Ok(()) => report.rendered += 1,
            Err(e) => {
                tracing::error!("{e}");
                report.failed += 1;
            }
        };

        if templates.contains(TERMS_TEMPLATE) {
            record(render_terms(templates, site, taxonomy, terms, output));
        } else {
            tracing::warn!(taxonomy, "no `{TERMS_TEMPLATE}` template; skipping term listing");
        }

        let template = format!("{TAXONOMY_DIR}/{taxonomy}");
        let mut terms = terms.iter().filter(|(_, pages)| !pages.is_empty()).peekable();
        if terms.peek().is_some() && !templates.contains(&template) {
            tracing::warn!(taxonomy, "no `{template}` template; skipping term pages");
            continue;
        }

        let mut slugs = FxHashSet::default();
        for (term, pages) in terms {
            let link = TermLink::new(taxonomy, term, pages.len());
            if link.slug.is_empty() || !slugs.insert(link.slug.clone()) {
                tracing::warn!(taxonomy, term = %term, slug = %link.slug, "term has no unique slug; skipping");
                continue;
            }

            record(render_term(templates, &template, site, taxonomy, link, pages, output));
        }
    }

    report
}

fn render_terms(
    templates: &TemplateSet,
    site: &SiteBinding,
    taxonomy: &str,
    terms: &BTreeMap<String, Vec<PageSummary>>,
    output: &Path,
) -> Result<()> {
    let binding = TermsBinding {
        site,
        taxonomy: escape_html(taxonomy),
        terms: terms.iter()
            .map(|(term, pages)| TermLink::new(taxonomy, term, pages.len()))
            .collect(),
    };

    let html = templates.render(TERMS_TEMPLATE, &binding)
        .chain_with(|| error!("failed to render term listing", "taxonomy" => taxonomy))?;

    write_file(&output.join(taxonomy).join("index.html"), &html)
}

fn render_term(
    templates: &TemplateSet,
    template: &str,
    site: &SiteBinding,
    taxonomy: &str,
    term: TermLink,
    pages: &[PageSummary],
    output: &Path,
) -> Result<()> {
    let path = output.join(taxonomy).join(&term.slug).join("index.html");
    let binding = TermBinding { site, taxonomy: escape_html(taxonomy), term, pages };
    let html = templates.render(template, &binding)
        .chain_with(|| error! {
            "failed to render term page",
            "taxonomy" => taxonomy,
            "term" => &binding.term.name,
        })?;

    write_file(&path, &html)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::config::SiteConfig;
    use crate::markdown::extract;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn config(taxonomies: &[(&str, &[&str])]) -> SiteConfig {
        let taxonomies = taxonomies.iter()
            .map(|(name, terms)| (name.to_string(), terms.iter().map(|t| t.to_string()).collect()))
            .collect::<BTreeMap<_, _>>();

        SiteConfig { taxonomies, ..SiteConfig::default() }
    }

    #[test]
    fn terms_without_pages_get_a_listing_only() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("layouts");
        write(&layouts, "taxonomy/terms.html", "{{ taxonomy }}:{% for t in terms %} {{ t.name }}({{ t.count }}){% endfor %}");
        write(&layouts, "taxonomy/tags.html", "{{ term.name }}");

        let config = config(&[("tags", &["tag1", "tag2"])]);
        let templates = TemplateSet::load(&layouts, &config).unwrap();
        let index = PageIndex::from_config(&config);
        let output = dir.path().join("public");

        let report = render_taxonomies(&index, &templates, &SiteBinding::new(&config), &output);
        assert_eq!(report, TaxonomyReport { rendered: 1, failed: 0 });
        assert_eq!(fs::read_to_string(output.join("tags/index.html")).unwrap(), "tags: tag1(0) tag2(0)");
        assert!(!output.join("tags/tag1").exists());
        assert!(!output.join("tags/tag2").exists());
    }

    #[test]
    fn term_pages_list_their_pages() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("layouts");
        write(&layouts, "taxonomy/terms.html", "{{ terms | length }}");
        write(&layouts, "taxonomy/tags.html", "{{ term.name }}:{% for p in pages %} {{ p.title }}{% endfor %}");

        let config = config(&[("tags", &[]), ("categories", &[])]);
        let templates = TemplateSet::load(&layouts, &config).unwrap();
        let mut index = PageIndex::from_config(&config);
        for (source, url) in [
            ("---\ntitle: One\ndate: '2024-01-02'\ntags: [Rust Lang, '!!!']\ncategories: x\n---\n", "/one.html"),
            ("---\ntitle: Two\ndate: '2024-01-01'\ntags: [Rust Lang]\n---\n", "/two.html"),
        ] {
            let front_matter = extract(source).front_matter;
            index.add_page(&front_matter, &PageSummary::new(&front_matter, "", url));
        }

        index.sort();
        let output = dir.path().join("public");
        let report = render_taxonomies(&index, &templates, &SiteBinding::new(&config), &output);

        // Two listings and one term page; `!!!` has no slug and `categories`
        // has no term template.
        assert_eq!(report, TaxonomyReport { rendered: 3, failed: 0 });
        assert_eq!(fs::read_to_string(output.join("tags/rust-lang/index.html")).unwrap(), "Rust Lang: One Two");
        assert_eq!(fs::read_to_string(output.join("tags/index.html")).unwrap(), "2");
        assert_eq!(fs::read_to_string(output.join("categories/index.html")).unwrap(), "1");
        assert!(!output.join("categories/x").exists());
    }

    #[test]
    fn missing_listing_template_skips_the_listing() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("layouts");
        write(&layouts, "base.html", "");

        let config = config(&[("tags", &["a"])]);
        let templates = TemplateSet::load(&layouts, &config).unwrap();
        let output = dir.path().join("public");
        let report = render_taxonomies(&PageIndex::from_config(&config), &templates, &SiteBinding::new(&config), &output);

        assert_eq!(report, TaxonomyReport::default());
        assert!(!output.join("tags").exists());
    }
}
