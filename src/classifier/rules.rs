//! Link taxonomy and the ordered rule table used to classify outbound links.

use crate::url::{extract_domain, is_same_site, matches_wildcard};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

// Path patterns for store listings
const APP_STORE_PATH_PATTERN: &str = r"^/(?:[a-z]{2}(?:-[a-z]{2})?/)?app/";
const PLAY_STORE_PATH_PATTERN: &str = r"^/store/apps(?:/|$)";

// Affiliate and referral vocabulary, matched against the whole URL
const AFFILIATE_PATTERN: &str = r"(?i)affiliate|referral|partner|[?&]ref=|/ref/|[?&]via=";

/// Compiles a static regex pattern, panicking with context if it is invalid.
/// Only used for the compile-time constants above.
fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

static APP_STORE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(APP_STORE_PATH_PATTERN, "APP_STORE_PATH_RE"));
static PLAY_STORE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(PLAY_STORE_PATH_PATTERN, "PLAY_STORE_PATH_RE"));
static AFFILIATE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(AFFILIATE_PATTERN, "AFFILIATE_RE"));

/// Fixed taxonomy of outbound link categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkCategory {
    Twitter,
    Instagram,
    Facebook,
    Linkedin,
    Github,
    Youtube,
    AppStore,
    PlayStore,
    Affiliate,
}

impl LinkCategory {
    /// Returns the category label as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Linkedin => "linkedin",
            Self::Github => "github",
            Self::Youtube => "youtube",
            Self::AppStore => "appStore",
            Self::PlayStore => "playStore",
            Self::Affiliate => "affiliate",
        }
    }

    /// Returns all categories in taxonomy order
    pub fn all() -> [Self; 9] {
        [
            Self::Twitter,
            Self::Instagram,
            Self::Facebook,
            Self::Linkedin,
            Self::Github,
            Self::Youtube,
            Self::AppStore,
            Self::PlayStore,
            Self::Affiliate,
        ]
    }

    /// Returns true for social-profile categories
    pub fn is_social(&self) -> bool {
        !matches!(self, Self::AppStore | Self::PlayStore | Self::Affiliate)
    }
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a rule decides whether a link belongs to its category
pub enum Matcher {
    /// Link host matches one of the wildcard patterns and, when given, the
    /// path matches the regex
    Host {
        hosts: &'static [&'static str],
        path: Option<&'static LazyLock<Regex>>,
    },

    /// Link URL contains affiliate vocabulary and points off-site
    Vocabulary(&'static LazyLock<Regex>),
}

impl Matcher {
    /// Tests a resolved link found on the page at `site`
    pub fn matches(&self, link: &Url, site: &Url) -> bool {
        match self {
            Self::Host { hosts, path } => {
                let Some(host) = extract_domain(link) else {
                    return false;
                };
                if !hosts.iter().any(|pattern| matches_wildcard(pattern, &host)) {
                    return false;
                }
                match path {
                    Some(re) => re.is_match(link.path()),
                    None => true,
                }
            }
            Self::Vocabulary(re) => re.is_match(link.as_str()) && !is_same_site(site, link),
        }
    }
}

/// One entry of the rule table
pub struct Rule {
    pub category: LinkCategory,
    pub matcher: Matcher,
}

/// Ordered rule table; a link is offered to rules in this order
pub static RULES: &[Rule] = &[
    Rule {
        category: LinkCategory::Twitter,
        matcher: Matcher::Host {
            hosts: &["*.twitter.com", "*.x.com"],
            path: None,
        },
    },
    Rule {
        category: LinkCategory::Instagram,
        matcher: Matcher::Host {
            hosts: &["*.instagram.com"],
            path: None,
        },
    },
    Rule {
        category: LinkCategory::Facebook,
        matcher: Matcher::Host {
            hosts: &["*.facebook.com", "*.fb.com", "fb.me"],
            path: None,
        },
    },
    Rule {
        category: LinkCategory::Linkedin,
        matcher: Matcher::Host {
            hosts: &["*.linkedin.com"],
            path: None,
        },
    },
    Rule {
        category: LinkCategory::Github,
        matcher: Matcher::Host {
            hosts: &["*.github.com"],
            path: None,
        },
    },
    Rule {
        category: LinkCategory::Youtube,
        matcher: Matcher::Host {
            hosts: &["*.youtube.com", "youtu.be"],
            path: None,
        },
    },
    Rule {
        category: LinkCategory::AppStore,
        matcher: Matcher::Host {
            hosts: &["apps.apple.com", "itunes.apple.com"],
            path: Some(&APP_STORE_PATH_RE),
        },
    },
    Rule {
        category: LinkCategory::PlayStore,
        matcher: Matcher::Host {
            hosts: &["play.google.com"],
            path: Some(&PLAY_STORE_PATH_RE),
        },
    },
    Rule {
        category: LinkCategory::Affiliate,
        matcher: Matcher::Vocabulary(&AFFILIATE_RE),
    },
];
