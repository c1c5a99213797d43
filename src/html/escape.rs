//! Attribute-safe escaping for interpolated values.

/// Escape a value for use inside a double- or single-quoted attribute or as
/// element text.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Encode a string as a JavaScript string literal that is safe inside an
/// inline `<script>` element.
pub fn js_string_literal(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"/\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr() {
        assert_eq!(
            escape_attr(r#"Tom & "Jerry" <b>'x'</b>"#),
            "Tom &amp; &quot;Jerry&quot; &lt;b&gt;&#39;x&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_attr("خبر تجريبي"), "خبر تجريبي");
    }

    #[test]
    fn test_js_string_literal() {
        assert_eq!(js_string_literal("/?redirect=%2Fnews%2F1"), "\"/?redirect=%2Fnews%2F1\"");
        assert_eq!(js_string_literal("</script>"), "\"\\u003c/script\\u003e\"");
    }
}
