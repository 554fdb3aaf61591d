//! Robots.txt rules for one site, matched with the robotstxt crate

use robotstxt::DefaultMatcher;

/// Robots.txt rules bound to the crawler's user-agent token
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt body; `None` means everything is allowed
    content: Option<String>,
    /// Product token matched against `User-agent` lines, e.g. `Aisle`
    agent: String,
}

impl ParsedRobots {
    /// Wraps a fetched robots.txt body
    pub fn from_content(content: &str, agent: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            agent: agent.to_string(),
        }
    }

    /// Rules that allow every URL
    ///
    /// Used when robots.txt is missing, unreachable, or checking is turned off.
    pub fn allow_all() -> Self {
        Self {
            content: None,
            agent: String::new(),
        }
    }

    /// Checks whether `url` (absolute, or a bare path) may be visited
    ///
    /// # Examples
    ///
    /// ```
    /// use aisle::robots::ParsedRobots;
    ///
    /// let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /cart", "Aisle");
    /// assert!(robots.is_allowed("https://shop.test/shoes"));
    /// assert!(!robots.is_allowed("https://shop.test/cart/1"));
    /// ```
    pub fn is_allowed(&self, url: &str) -> bool {
        match self.content.as_deref() {
            None | Some("") => true,
            Some(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, &self.agent, url)
            }
        }
    }

    /// True when the site's root is off limits to this crawler
    pub fn blocks_site(&self) -> bool {
        !self.is_allowed("/")
    }
}
