use crate::url::normalize::normalize_domain;
use crate::UrlError;
use std::fmt;
use url::Url;

/// A normalized domain, the identity key of a crawl session
///
/// Lowercase, without scheme and without a leading `www.`. A path suffix such as
/// `zara.com/in` is allowed and becomes part of the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(String);

impl Domain {
    /// Normalizes `input` and rejects strings that cannot name a site
    ///
    /// # Examples
    ///
    /// ```
    /// use aisle::url::Domain;
    ///
    /// let domain = Domain::parse("https://www.Shop.test").unwrap();
    /// assert_eq!(domain.as_str(), "shop.test");
    /// assert_eq!(domain.base_url("https"), "https://shop.test");
    ///
    /// assert!(Domain::parse("   ").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let normalized = normalize_domain(input);

        if normalized.is_empty() {
            return Err(UrlError::EmptyDomain);
        }

        if normalized.contains(char::is_whitespace) || normalized.contains("://") {
            return Err(UrlError::Malformed(normalized));
        }

        let parsed = Url::parse(&format!("https://{}", normalized))
            .map_err(|e| UrlError::Parse(format!("{}: {}", normalized, e)))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::Malformed(normalized));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host part of the domain, without any path suffix
    pub fn host(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// The URL a session starts from, e.g. `https://zara.com/in`
    pub fn base_url(&self, scheme: &str) -> String {
        format!("{}://{}", scheme, self.0)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true when `url` lives on a different site than `base_url`
///
/// Hosts are compared together with their port, each with one leading `www.`
/// removed. A URL that cannot be parsed is treated as out of domain.
///
/// # Examples
///
/// ```
/// use aisle::url::is_out_of_domain;
///
/// assert!(!is_out_of_domain("https://www.example.com/x", "https://example.com"));
/// assert!(is_out_of_domain("https://sub.example.com", "https://example.com"));
/// ```
pub fn is_out_of_domain(url: &str, base_url: &str) -> bool {
    match (site_key(url), site_key(base_url)) {
        (Some(candidate), Some(base)) => candidate != base,
        _ => true,
    }
}

/// Extracts `host[:port]` with a leading `www.` removed
fn site_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_domain_cases() {
        let cases = [
            ("https://example.com/product", "https://example.com", false),
            ("https://www.example.com/product", "https://example.com", false),
            ("https://example.com/product", "https://www.example.com", false),
            ("https://otherdomain.com/product", "https://example.com", true),
            ("https://subdomain.example.com", "https://example.com", true),
            ("https://example.org", "https://example.com", true),
        ];

        for (url, base, expected) in cases {
            assert_eq!(is_out_of_domain(url, base), expected, "{} vs {}", url, base);
        }
    }

    #[test]
    fn test_out_of_domain_ignores_base_path() {
        assert!(!is_out_of_domain(
            "https://www.zara.com/in/shoes",
            "https://zara.com/in"
        ));
    }

    #[test]
    fn test_out_of_domain_compares_ports() {
        assert!(!is_out_of_domain("http://127.0.0.1:8080/a", "http://127.0.0.1:8080"));
        assert!(is_out_of_domain("http://127.0.0.1:9090/a", "http://127.0.0.1:8080"));
    }

    #[test]
    fn test_unparseable_url_is_out_of_domain() {
        assert!(is_out_of_domain("/relative/path", "https://example.com"));
        assert!(is_out_of_domain("javascript:void(0)", "https://example.com"));
    }

    #[test]
    fn test_domain_parse() {
        let domain = Domain::parse("HTTP://www.Example.com").unwrap();
        assert_eq!(domain.as_str(), "example.com");
        assert_eq!(domain.host(), "example.com");
        assert_eq!(domain.to_string(), "example.com");
    }

    #[test]
    fn test_domain_with_path() {
        let domain = Domain::parse("www.zara.com/in").unwrap();
        assert_eq!(domain.host(), "zara.com");
        assert_eq!(domain.base_url("https"), "https://zara.com/in");
    }

    #[test]
    fn test_domain_with_port() {
        let domain = Domain::parse("127.0.0.1:4000").unwrap();
        assert_eq!(domain.base_url("http"), "http://127.0.0.1:4000");
    }

    #[test]
    fn test_domain_parse_rejects_garbage() {
        assert!(matches!(Domain::parse(""), Err(UrlError::EmptyDomain)));
        assert!(matches!(Domain::parse("https://"), Err(UrlError::EmptyDomain)));
        assert!(Domain::parse("exa mple.com").is_err());
        assert!(Domain::parse("ftp://example.com").is_err());
    }
}
