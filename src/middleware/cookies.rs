use axum::http::{header, HeaderMap};

/// Find `name` in a `Cookie`-style header value (`a=1; b=2`).
pub fn find_cookie<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Value of cookie `name` across all `Cookie` headers of a request.
pub fn request_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| find_cookie(raw, name))
        .filter(|v| !v.is_empty())
}
