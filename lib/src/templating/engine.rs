use std::sync::Arc;

use minijinja::{context, AutoEscape, Environment, Error, ErrorKind, State};
use minijinja::value::{Rest, Value};

use crate::config::SiteConfig;
use crate::templating::Partials;

/// Builds the environment every layout renders in: the partial helpers, a
/// loader that compiles partials on first use, and the site filters.
///
/// Auto-escaping is off. Bindings carry text that is already escaped and
/// HTML that must be emitted as is.
pub fn environment(config: &SiteConfig, partials: Arc<Partials>) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_keep_trailing_newline(true);

    let bundle = partials.clone();
    env.set_loader(move |name: &str| Ok(bundle.load(name)));

    env.add_function("partial", move |state: &State, name: &str, ctx: Option<Value>| {
        ext::partial(state, &partials, name, ctx)
    });

    env.add_function("partial_cached", ext::partial_cached);

    let base_url: Arc<str> = config.base_url.as_str().into();
    env.add_function("url", move |segments: Rest<String>| ext::url(&base_url, &segments));

    env.add_filter("slugify", ext::slugify);
    env.add_filter("deslug", ext::deslug);
    env.add_filter("date", ext::date);
    env
}

mod ext {
    use std::fmt::Write;

    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    use super::*;

    fn context_or_empty(ctx: Option<Value>) -> Value {
        ctx.unwrap_or_else(|| context! {})
    }

    /// Compiles and renders the partial `name` on every call.
    pub fn partial(
        state: &State,
        partials: &Partials,
        name: &str,
        ctx: Option<Value>,
    ) -> Result<Value, Error> {
        let source = partials.get(name).ok_or_else(|| Error::new(
            ErrorKind::TemplateNotFound,
            format!("no partial named {name:?}")
        ))?;

        let html = state.env()
            .render_named_str(&Partials::template_name(name), source, context_or_empty(ctx))?;

        Ok(Value::from_safe_string(html))
    }

    /// Renders the partial `name`, reusing its compiled form after the first
    /// call.
    pub fn partial_cached(state: &State, name: &str, ctx: Option<Value>) -> Result<Value, Error> {
        let template = state.env().get_template(&Partials::template_name(name))?;
        Ok(Value::from_safe_string(template.render(context_or_empty(ctx))?))
    }

    /// Joins `segments` onto the site's base URL with single slashes.
    pub fn url(base: &str, segments: &[String]) -> String {
        let mut url = base.trim_end_matches('/').to_string();
        for segment in segments.iter().map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(segment);
        }

        if url.is_empty() {
            url.push('/');
        }

        url
    }

    pub fn slugify(value: &str) -> String {
        crate::util::slugify(value)
    }

    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }

    /// Reformats a date written as `YYYY-MM-DD`, a naive datetime, or
    /// RFC 3339.
    pub fn date(value: &str, fmt: &str) -> Result<String, Error> {
        let value = value.trim();
        let formatted = value.parse::<NaiveDate>().map(|d| d.format(fmt))
            .or_else(|_| value.parse::<NaiveDateTime>().map(|dt| dt.format(fmt)))
            .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.format(fmt)))
            .map_err(|e| Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to parse date {value:?}: {e}")
            ))?;

        let mut out = String::new();
        write!(out, "{formatted}").map_err(|_| Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format {fmt:?}")
        ))?;

        Ok(out)
    }

}
