mod path_ext;

pub use path_ext::*;

/// Convert spaces to hyphens. Remove characters that aren't alphanumerics,
/// underscores, or hyphens. Convert to lowercase. Also strip leading and
/// trailing whitespace.
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        let ascii = deunicode::deunicode_char(ch).unwrap_or("-");
        if ch.is_whitespace() || ascii.is_empty() {
            need_dash = !output.is_empty();
            continue;
        }

        for b in ascii.bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                _ => need_dash = !output.is_empty(),
            }
        }
    }

    output
}

/// Escapes `&`, `<`, `>`, `"`, and `'` so `string` can be placed in HTML text
/// or a quoted attribute.
pub fn escape_html(string: &str) -> String {
    let mut output = String::with_capacity(string.len());
    for ch in string.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }

    output
}
