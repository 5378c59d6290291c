use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use minijinja::{context, Environment};

use crate::config::{SiteConfig, SitePaths};
use crate::error::{Chainable, Result};
use crate::util::slugify;

/// Used when the site has no `archetypes/post.md`.
pub const DEFAULT_ARCHETYPE: &str = "\
---
title: {{ title | quote }}
date: {{ date }}
author: {{ author | quote }}
draft: true
---
";

/// Quotes `value` as a double-quoted string valid in both YAML and TOML.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }

    quoted.push('"');
    quoted
}

/// Creates `content/<slug>.md` from the site's post archetype, filled in with
/// `title`, `date`, and the configured author. Never overwrites a document.
pub fn new_document(paths: &SitePaths, config: &SiteConfig, title: &str, date: NaiveDate) -> Result<PathBuf> {
    let slug = slugify(title);
    if slug.is_empty() {
        return err!("document title has no usable characters for a file name", "title" => title);
    }

    let archetype_path = paths.archetype();
    let archetype = match fs::read_to_string(&archetype_path) {
        Ok(archetype) => archetype,
        Err(e) if e.kind() == io::ErrorKind::NotFound => DEFAULT_ARCHETYPE.to_string(),
        Err(e) => return Err(e).chain_with(|| error! {
            "failed to read archetype",
            "path" => archetype_path.display(),
        }),
    };

    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_filter("quote", quote);
    let document = env
        .render_named_str("archetype", &archetype, context! {
            title => title,
            date => date.format("%Y-%m-%d").to_string(),
            author => &config.params.author,
        })
        .chain_with(|| error!("failed to render archetype", "path" => archetype_path.display()))?;

    let content = paths.content();
    fs::create_dir_all(&content).chain_with(|| error! {
        "failed to create content directory",
        "path" => content.display(),
    })?;

    let path = content.join(format!("{slug}.md"));
    let mut file = OpenOptions::new().write(true).create_new(true).open(&path)
        .chain_with(|| error!("failed to create document", "path" => path.display()))?;

    file.write_all(document.as_bytes())
        .chain_with(|| error!("failed to write document", "path" => path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;
    use crate::markdown::extract;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn default_archetype_round_trips_through_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        let mut config = SiteConfig::default();
        config.params.author = "Ada \"A\" L".into();

        let path = new_document(&paths, &config, "Hello: World", date()).unwrap();
        assert_eq!(path, dir.path().join("content/hello-world.md"));

        let text = fs::read_to_string(&path).unwrap();
        let extracted = extract(&text);
        assert!(extracted.error.is_none());
        assert_eq!(extracted.front_matter.title, "Hello: World");
        assert_eq!(extracted.front_matter.date, "2024-03-01");
        assert!(extracted.front_matter.draft);
        assert_eq!(extracted.front_matter.extra["author"], "Ada \"A\" L");
    }

    #[test]
    fn site_archetypes_are_used_and_documents_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        fs::create_dir_all(dir.path().join("archetypes")).unwrap();
        fs::write(paths.archetype(), "+++\ntitle = {{ title | quote }}\n+++\nBy {{ author }}\n").unwrap();

        let mut config = SiteConfig::default();
        config.params.author = "Ada".into();
        let path = new_document(&paths, &config, "Post", date()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "+++\ntitle = \"Post\"\n+++\nBy Ada\n");

        assert!(new_document(&paths, &config, "Post", date()).is_err());
        assert!(new_document(&paths, &config, "???", date()).is_err());
    }
}
