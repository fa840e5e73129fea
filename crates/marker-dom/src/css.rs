//! Small CSS helpers: inline declarations and `:root` custom properties.

use std::collections::HashMap;

/// Permissive inline declaration parser for `style="..."` attributes.
///
/// Property names are lowercased unless they are custom properties, whose
/// names are case sensitive. Empty names or values are dropped.
pub fn parse_declarations(source: &str) -> Vec<(String, String)> {
    source
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let name = if name.starts_with("--") {
                name.to_string()
            } else {
                name.to_ascii_lowercase()
            };
            let value = value.trim().to_string();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value))
        })
        .collect()
}

/// Serialize declarations back into an inline style string.
pub fn serialize_declarations<'a>(decls: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    decls
        .into_iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collect `--name: value` declarations from top-level rule blocks whose
/// selector targets the document root (`:root` or `html`).
///
/// Nested blocks (media queries and the like) are skipped.
pub fn collect_root_custom_properties(stylesheet: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    let css = strip_comments(stylesheet);
    let mut selector = String::new();
    let mut body = String::new();
    let mut depth = 0usize;

    for ch in css.chars() {
        match ch {
            '{' => {
                depth += 1;
                if depth > 1 {
                    body.push(ch);
                }
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    body.push(ch);
                    continue;
                }
                if selector_targets_root(&selector) && !body.contains('{') {
                    for (name, value) in parse_declarations(&body) {
                        if name.starts_with("--") {
                            vars.insert(name, value);
                        }
                    }
                }
                selector.clear();
                body.clear();
            }
            _ if depth == 0 => selector.push(ch),
            _ => body.push(ch),
        }
    }
    vars
}

fn selector_targets_root(selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .any(|s| s == ":root" || s.eq_ignore_ascii_case("html"))
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_declarations_keep_custom_property_case() {
        let decls = parse_declarations("Color: red; --Brand-Color: #123; ; broken");
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "red".to_string()),
                ("--Brand-Color".to_string(), "#123".to_string()),
            ]
        );
    }

    #[test]
    fn root_properties_from_root_and_html_blocks() {
        let css = r#"
            /* palette */
            :root { --brand: #ff0066; --ink: black }
            body { --not-root: 1px; }
            html, .x { --accent: teal; }
            @media (min-width: 10px) { :root { --nested: 1; } }
        "#;
        let vars = collect_root_custom_properties(css);
        assert_eq!(vars.get("--brand").map(String::as_str), Some("#ff0066"));
        assert_eq!(vars.get("--ink").map(String::as_str), Some("black"));
        assert_eq!(vars.get("--accent").map(String::as_str), Some("teal"));
        assert!(!vars.contains_key("--not-root"));
        assert!(!vars.contains_key("--nested"));
    }

    #[test]
    fn unterminated_comment_is_dropped() {
        let vars = collect_root_custom_properties(":root { --a: 1; } /* trailing");
        assert_eq!(vars.len(), 1);
    }
}
