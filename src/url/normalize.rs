/// Normalizes a domain string into the key used for a crawl session
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace and lowercase
/// 2. Strip a leading `http://` or `https://`
/// 3. Strip a leading `www.`
///
/// Anything after the host (e.g. a `/in` region path) is kept. The function is
/// total: an empty input yields an empty string, and [`crate::url::Domain::parse`]
/// is where unusable domains are rejected.
///
/// # Examples
///
/// ```
/// use aisle::url::normalize_domain;
///
/// assert_eq!(normalize_domain("https://www.Example.com"), "example.com");
/// assert_eq!(normalize_domain("  www.zara.com/in "), "zara.com/in");
/// ```
pub fn normalize_domain(input: &str) -> String {
    let domain = input.trim().to_lowercase();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(&domain);
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    domain.to_string()
}

/// Normalizes a URL for deduplication
///
/// Lowercases, trims whitespace and drops everything from the first `#` on.
/// Query strings, trailing slashes and `www.` hosts are left alone.
///
/// # Examples
///
/// ```
/// use aisle::url::normalize_url;
///
/// assert_eq!(normalize_url("  HTTPS://Example.com/Shoes#reviews "), "https://example.com/shoes");
/// assert_eq!(normalize_url("https://example.com/?page=2"), "https://example.com/?page=2");
/// ```
pub fn normalize_url(input: &str) -> String {
    let url = input.trim().to_lowercase();
    match url.find('#') {
        Some(idx) => url[..idx].to_string(),
        None => url,
    }
}
