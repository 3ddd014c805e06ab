//! HTML pages served by the API.

const HOMEPAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Postboard</title>
</head>
<body data-user-id="{{user_id}}">
    <h1>Postboard</h1>
    <p>Signed in as <strong>{{username}}</strong>.</p>
    <form action="/api/users/logout" method="post">
        <button type="submit">Log out</button>
    </form>
</body>
</html>
"#;

/// Homepage shown right after a successful login.
pub fn homepage(user_id: i32, username: &str) -> String {
    HOMEPAGE
        .replace("{{user_id}}", &user_id.to_string())
        .replace("{{username}}", &escape_html(username))
}

/// Escape text for use in HTML element content or a quoted attribute.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homepage_carries_user_id_and_escapes_name() {
        let page = homepage(42, "<script>");

        assert!(page.contains(r#"data-user-id="42""#));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_name_cannot_inject_placeholder() {
        let page = homepage(7, "{{user_id}}");

        assert!(page.contains("Signed in as <strong>{{user_id}}</strong>"));
        assert!(page.contains(r#"data-user-id="7""#));
    }

    #[test]
    fn test_escape_html_quotes_and_ampersands() {
        assert_eq!(escape_html(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &#39;d&#39;");
    }
}
