//! `Set-Cookie` relaying.
//!
//! Some HTTP stacks fold several `Set-Cookie` headers into a single comma-joined value. A comma
//! is only a cookie separator when what follows it starts a new `name=` pair; commas inside an
//! attribute such as `Expires=Wed, 09 Jun 2021 10:18:14 GMT` belong to the cookie.

/// True if `rest` (the text after a comma) begins a new `name=value` cookie.
fn starts_new_cookie(rest: &str) -> bool {
    let rest = rest.trim_start();
    let name_len = rest
        .find(|c: char| c == '=' || c == ';' || c == ',' || c.is_whitespace())
        .unwrap_or(rest.len());
    name_len > 0 && rest[name_len..].starts_with('=')
}

/// Split a possibly comma-joined `Set-Cookie` value into individual cookies.
pub fn split_set_cookie(value: &str) -> Vec<String> {
    let mut cookies = Vec::new();
    let mut start = 0;
    for (idx, ch) in value.char_indices() {
        if ch == ',' && starts_new_cookie(&value[idx + 1..]) {
            cookies.push(value[start..idx].trim().to_string());
            start = idx + 1;
        }
    }
    cookies.push(value[start..].trim().to_string());
    cookies.retain(|c| !c.is_empty());
    cookies
}

/// Split every raw header value and flatten the result, preserving order.
pub fn collect_set_cookies<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values.into_iter().flat_map(split_set_cookie).collect()
}

/// A cookie that tells the browser to drop `name`.
pub fn expire_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// A session cookie set by the gateway itself.
pub fn session_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax")
}

/// True if one of `cookies` already sets `name`.
pub fn sets_cookie(cookies: &[String], name: &str) -> bool {
    cookies.iter().any(|c| {
        c.split_once('=')
            .is_some_and(|(n, _)| n.trim() == name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cookie_with_expires_is_not_split() {
        let header = "access_token=abc; Expires=Wed, 09 Jun 2021 10:18:14 GMT; Path=/; HttpOnly";
        assert_eq!(split_set_cookie(header), vec![header.to_string()]);
    }

    #[test]
    fn joined_cookies_are_split_on_new_pairs_only() {
        let header = "access_token=abc; Expires=Wed, 09 Jun 2021 10:18:14 GMT; Path=/, \
                      refresh_token=def; Expires=Thu, 10 Jun 2021 10:18:14 GMT, role=doctor";
        let cookies = split_set_cookie(header);
        assert_eq!(
            cookies,
            vec![
                "access_token=abc; Expires=Wed, 09 Jun 2021 10:18:14 GMT; Path=/",
                "refresh_token=def; Expires=Thu, 10 Jun 2021 10:18:14 GMT",
                "role=doctor",
            ]
        );
    }

    #[test]
    fn collect_flattens_multiple_header_values() {
        let cookies = collect_set_cookies(["a=1, b=2", "c=3; Path=/"]);
        assert_eq!(cookies, vec!["a=1", "b=2", "c=3; Path=/"]);
    }

    #[test]
    fn empty_value_yields_no_cookies() {
        assert!(split_set_cookie("  ").is_empty());
    }

    #[test]
    fn detects_cookie_already_set() {
        let cookies = vec![session_cookie("access_token", "a"), "role=doctor; Path=/".to_string()];
        assert!(sets_cookie(&cookies, "role"));
        assert!(sets_cookie(&cookies, "access_token"));
        assert!(!sets_cookie(&cookies, "refresh_token"));
    }

    #[test]
    fn expire_cookie_sets_zero_max_age() {
        assert!(expire_cookie("role").starts_with("role=; Path=/; Max-Age=0"));
    }
}
