//! Category extraction strategies over scraped marketplace HTML.
//!
//! The site's markup is unstable and undocumented, so extraction runs an
//! ordered list of independent heuristics, one per observed markup
//! generation. The first strategy that yields usable entries wins wholesale;
//! exhausting the list produces an empty mapping, never an error. An empty
//! taxonomy page is a valid, if degenerate, outcome.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::CategoryMap;

use super::slug::slugify;

/// Maximum path segments for a listing-path link to count as top-level.
/// Deeper paths are subcategory links and are skipped.
const LISTING_TOP_LEVEL_SEGMENTS: usize = 2;

/// One self-contained extraction heuristic.
///
/// Yields `(id, label)` pairs in document order. No pairs means "this markup
/// generation is not present on the page", not a failure.
pub trait ExtractStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, doc: &Html) -> Vec<(String, String)>;
}

/// Anchors whose path carries a numeric category-page segment:
/// `/cp/<digits>/<slug>/`. The digits are the category id.
struct NumericCategoryPage {
    pattern: Regex,
}

impl NumericCategoryPage {
    fn new() -> Self {
        Self {
            pattern: Regex::new(r"/cp/(\d+)(?:/|$)").expect("static pattern"),
        }
    }
}

impl ExtractStrategy for NumericCategoryPage {
    fn name(&self) -> &'static str {
        "cp-numeric"
    }

    fn extract(&self, doc: &Html) -> Vec<(String, String)> {
        anchor_pairs(doc)
            .into_iter()
            .filter_map(|(path, text)| {
                let caps = self.pattern.captures(&path)?;
                Some((caps[1].to_string(), text))
            })
            .collect()
    }
}

/// Anchors whose path carries a generic category segment:
/// `/c/<slug>/<digits>`. The digits are the category id.
struct CategorySegment {
    pattern: Regex,
}

impl CategorySegment {
    fn new() -> Self {
        Self {
            pattern: Regex::new(r"/c/([^/]+)/(\d+)").expect("static pattern"),
        }
    }
}

impl ExtractStrategy for CategorySegment {
    fn name(&self) -> &'static str {
        "c-segment"
    }

    fn extract(&self, doc: &Html) -> Vec<(String, String)> {
        anchor_pairs(doc)
            .into_iter()
            .filter_map(|(path, text)| {
                let caps = self.pattern.captures(&path)?;
                Some((caps[2].to_string(), text))
            })
            .collect()
    }
}

/// Fallback: anchors under the general listing path `/l/<slug>/`.
///
/// There is no numeric id in this markup generation, so the slug itself is
/// the id. A path-depth guard skips deeper links, which are subcategories.
struct ListingPath;

impl ExtractStrategy for ListingPath {
    fn name(&self) -> &'static str {
        "l-path"
    }

    fn extract(&self, doc: &Html) -> Vec<(String, String)> {
        anchor_pairs(doc)
            .into_iter()
            .filter_map(|(path, text)| {
                path.strip_prefix("/l/")?;
                let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
                if segments.len() > LISTING_TOP_LEVEL_SEGMENTS {
                    return None;
                }
                let slug = segments.get(1).copied().unwrap_or("");
                Some((slug.to_string(), text))
            })
            .collect()
    }
}

/// Subcategory links nested under the parent's `/c/<slug>/<id>/` page path,
/// ending in their own `<slug>/<digits>` pair.
struct NestedCategorySegment {
    prefix: String,
    pattern: Regex,
}

impl NestedCategorySegment {
    fn new(parent_id: &str, parent_label: &str) -> Self {
        Self {
            prefix: format!("/c/{}/{}/", slugify(parent_label), parent_id),
            pattern: Regex::new(r"^([^/]+)/(\d+)(?:/|$)").expect("static pattern"),
        }
    }
}

impl ExtractStrategy for NestedCategorySegment {
    fn name(&self) -> &'static str {
        "c-nested"
    }

    fn extract(&self, doc: &Html) -> Vec<(String, String)> {
        anchor_pairs(doc)
            .into_iter()
            .filter_map(|(path, text)| {
                let rest = path.strip_prefix(self.prefix.as_str())?;
                let caps = self.pattern.captures(rest)?;
                Some((caps[2].to_string(), text))
            })
            .collect()
    }
}

/// Subcategory links nested under the parent's `/l/<slug>/` listing path.
/// The trailing slug is the subcategory id.
struct NestedListingPath {
    prefix: String,
}

impl NestedListingPath {
    fn new(parent_label: &str) -> Self {
        Self {
            prefix: format!("/l/{}/", slugify(parent_label)),
        }
    }
}

impl ExtractStrategy for NestedListingPath {
    fn name(&self) -> &'static str {
        "l-nested"
    }

    fn extract(&self, doc: &Html) -> Vec<(String, String)> {
        anchor_pairs(doc)
            .into_iter()
            .filter_map(|(path, text)| {
                let rest = path.strip_prefix(self.prefix.as_str())?;
                let segments: Vec<&str> = rest.trim_matches('/').split('/').collect();
                if segments.len() != 1 {
                    return None;
                }
                Some((segments[0].to_string(), text))
            })
            .collect()
    }
}

/// Ordered strategy list for top-level category pages, most specific first.
pub fn category_strategies() -> Vec<Box<dyn ExtractStrategy>> {
    vec![
        Box::new(NumericCategoryPage::new()),
        Box::new(CategorySegment::new()),
        Box::new(ListingPath),
    ]
}

/// Ordered strategy list for one parent's subcategory page.
///
/// Every strategy is scoped to links nested under the parent's own path; an
/// unscoped match would pick up unrelated navigation links sitewide.
pub fn subcategory_strategies(
    parent_id: &str,
    parent_label: &str,
) -> Vec<Box<dyn ExtractStrategy>> {
    vec![
        Box::new(NestedCategorySegment::new(parent_id, parent_label)),
        Box::new(NestedListingPath::new(parent_label)),
    ]
}

/// Extract top-level categories from an HTML document.
pub fn extract_categories(html: &str) -> CategoryMap {
    let doc = Html::parse_document(html);
    run_strategies(&doc, &category_strategies())
}

/// Extract subcategories of one parent category from its page HTML.
pub fn extract_subcategories(html: &str, parent_id: &str, parent_label: &str) -> CategoryMap {
    let doc = Html::parse_document(html);
    run_strategies(&doc, &subcategory_strategies(parent_id, parent_label))
}

fn run_strategies(doc: &Html, strategies: &[Box<dyn ExtractStrategy>]) -> CategoryMap {
    for strategy in strategies {
        let map = collect(strategy.extract(doc));
        if !map.is_empty() {
            debug!("Strategy {} matched {} entries", strategy.name(), map.len());
            return map;
        }
    }
    CategoryMap::new()
}

/// Fold raw pairs into a mapping: trim labels, drop entries with an empty id
/// or label, first occurrence of an id wins. Sites repeat the same link in
/// multiple DOM locations.
fn collect(pairs: Vec<(String, String)>) -> CategoryMap {
    let mut map = CategoryMap::new();
    for (id, label) in pairs {
        let id = id.trim();
        let label = label.trim();
        if id.is_empty() || label.is_empty() {
            continue;
        }
        map.entry(id.to_string())
            .or_insert_with(|| label.to_string());
    }
    map
}

/// Collect `(path, text)` for every usable anchor in the document.
///
/// Absolute hrefs are reduced to their path; fragments, query strings and
/// non-navigational schemes are dropped.
fn anchor_pairs(doc: &Html) -> Vec<(String, String)> {
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut pairs = Vec::new();
    for element in doc.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let path = match href_path(href) {
            Some(p) if !p.is_empty() => p,
            _ => continue,
        };

        let text: String = element.text().collect();
        pairs.push((path, text.trim().to_string()));
    }
    pairs
}

fn href_path(href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        Url::parse(href).ok().map(|u| u.path().to_string())
    } else if let Some(rest) = href.strip_prefix("//") {
        Url::parse(&format!("https://{}", rest))
            .ok()
            .map(|u| u.path().to_string())
    } else {
        // Relative href: strip query and fragment, keep the path.
        let path = href.split(['?', '#']).next().unwrap_or("");
        Some(path.to_string())
    }
}
