use crate::config::PatternGroups;
use crate::ConfigError;
use regex::Regex;

/// What a crawl session does with a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlClass {
    /// A product detail page - recorded, never rendered
    Product,
    /// A utility page or static file - neither recorded nor followed
    Ignored,
    /// Anything else - a candidate for the frontier
    Followable,
}

impl UrlClass {
    /// Returns true if the URL may enter the frontier
    pub fn is_followable(&self) -> bool {
        matches!(self, Self::Followable)
    }
}

/// Compiled classification rules for one domain
///
/// Product rules are tested before ignore rules, so a URL matching both is a
/// product. Rules are regular expressions searched anywhere in the URL.
#[derive(Debug, Clone)]
pub struct Classifier {
    product: Vec<Regex>,
    ignore: Vec<Regex>,
}

impl Classifier {
    /// Compiles both rule groups
    ///
    /// # Returns
    ///
    /// * `Ok(Classifier)` - All rules compiled
    /// * `Err(ConfigError::InvalidPattern)` - The first rule that failed to compile
    pub fn new(groups: &PatternGroups) -> Result<Self, ConfigError> {
        Ok(Self {
            product: compile_group("product", &groups.product)?,
            ignore: compile_group("ignore", &groups.ignore)?,
        })
    }

    /// Classifies a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use aisle::url::{Classifier, UrlClass};
    ///
    /// let classifier = Classifier::default();
    /// assert_eq!(classifier.classify("https://shop.test/product/1"), UrlClass::Product);
    /// assert_eq!(classifier.classify("https://shop.test/about"), UrlClass::Ignored);
    /// assert_eq!(classifier.classify("https://shop.test/category"), UrlClass::Followable);
    /// ```
    pub fn classify(&self, url: &str) -> UrlClass {
        if self.is_product(url) {
            UrlClass::Product
        } else if self.is_ignored(url) {
            UrlClass::Ignored
        } else {
            UrlClass::Followable
        }
    }

    pub fn is_product(&self, url: &str) -> bool {
        self.product.iter().any(|rule| rule.is_match(url))
    }

    pub fn is_ignored(&self, url: &str) -> bool {
        self.ignore.iter().any(|rule| rule.is_match(url))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        // Built-in rules are static and covered by tests
        Self::new(&PatternGroups::default()).expect("built-in patterns compile")
    }
}

fn compile_group(group: &str, rules: &[String]) -> Result<Vec<Regex>, ConfigError> {
    rules
        .iter()
        .map(|rule| {
            Regex::new(rule).map_err(|e| ConfigError::InvalidPattern {
                group: group.to_string(),
                pattern: rule.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}
