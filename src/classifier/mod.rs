//! Link classification
//!
//! Maps the raw anchor list of a landing page onto the fixed link taxonomy.
//! Classification never fails: hrefs that cannot be resolved are logged and
//! skipped.

mod rules;

pub use rules::{LinkCategory, Matcher, Rule, RULES};

use crate::url::resolve_link;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Outbound links assigned to taxonomy categories
///
/// Serializes as one field per category (`null` when unfilled) followed by
/// `allMatchedUrls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLinks {
    /// At most one URL per category
    pub categories: BTreeMap<LinkCategory, String>,

    /// Every link that matched any category rule, in document order
    pub all_matched_urls: Vec<String>,
}

impl ClassifiedLinks {
    /// Returns the URL assigned to `category`, if any
    pub fn get(&self, category: LinkCategory) -> Option<&str> {
        self.categories.get(&category).map(String::as_str)
    }

    pub fn twitter(&self) -> Option<&str> {
        self.get(LinkCategory::Twitter)
    }

    pub fn instagram(&self) -> Option<&str> {
        self.get(LinkCategory::Instagram)
    }

    pub fn facebook(&self) -> Option<&str> {
        self.get(LinkCategory::Facebook)
    }

    pub fn linkedin(&self) -> Option<&str> {
        self.get(LinkCategory::Linkedin)
    }

    pub fn github(&self) -> Option<&str> {
        self.get(LinkCategory::Github)
    }

    pub fn youtube(&self) -> Option<&str> {
        self.get(LinkCategory::Youtube)
    }

    pub fn app_store(&self) -> Option<&str> {
        self.get(LinkCategory::AppStore)
    }

    pub fn play_store(&self) -> Option<&str> {
        self.get(LinkCategory::PlayStore)
    }

    pub fn affiliate(&self) -> Option<&str> {
        self.get(LinkCategory::Affiliate)
    }

    /// Returns true if an off-site affiliate link was found
    pub fn has_affiliate_program(&self) -> bool {
        self.categories.contains_key(&LinkCategory::Affiliate)
    }

    /// Returns true if no link matched any category
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.all_matched_urls.is_empty()
    }

    /// Serializable view holding only the per-category fields
    pub fn category_fields(&self) -> CategoryFields<'_> {
        CategoryFields(self)
    }

    fn serialize_categories<S: SerializeStruct>(&self, state: &mut S) -> Result<(), S::Error> {
        for category in LinkCategory::all() {
            state.serialize_field(category.as_str(), &self.get(category))?;
        }
        Ok(())
    }
}

impl Serialize for ClassifiedLinks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state =
            serializer.serialize_struct("ClassifiedLinks", LinkCategory::all().len() + 1)?;
        self.serialize_categories(&mut state)?;
        state.serialize_field("allMatchedUrls", &self.all_matched_urls)?;
        state.end()
    }
}

/// One field per category, without the audit list
#[derive(Debug, Clone, Copy)]
pub struct CategoryFields<'a>(&'a ClassifiedLinks);

impl Serialize for CategoryFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CategoryFields", LinkCategory::all().len())?;
        self.0.serialize_categories(&mut state)?;
        state.end()
    }
}

/// Classifies the raw links found on a page
///
/// # Arguments
///
/// * `final_url` - The resolved page URL; relative links are resolved against it
///   and it identifies the site for same-site affiliate exclusion
/// * `raw_links` - Anchor hrefs as written in the markup, in document order
///
/// # Returns
///
/// The classified links. For each category the first qualifying link in
/// document order wins; one link may fill several categories when it
/// matches several rules.
pub fn classify(final_url: &Url, raw_links: &[String]) -> ClassifiedLinks {
    let mut result = ClassifiedLinks::default();
    let mut seen: HashSet<String> = HashSet::new();

    for href in raw_links {
        let Some(link) = resolve_link(final_url, href) else {
            tracing::debug!("Skipping unresolvable link {:?} on {}", href, final_url);
            continue;
        };

        let mut matched = false;

        for rule in RULES {
            if !rule.matcher.matches(&link, final_url) {
                continue;
            }
            matched = true;

            if !result.categories.contains_key(&rule.category) {
                tracing::trace!("Link {} assigned to {}", link, rule.category);
                result.categories.insert(rule.category, link.to_string());
            }
        }

        if matched && seen.insert(link.to_string()) {
            result.all_matched_urls.push(link.to_string());
        }
    }

    tracing::debug!(
        "Classified {} raw links on {}: {} categories, {} matched",
        raw_links.len(),
        final_url,
        result.categories.len(),
        result.all_matched_urls.len()
    );

    result
}
