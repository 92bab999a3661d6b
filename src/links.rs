//! Link discovery: which addresses on a page are worth fetching next.
//!
//! No sitemap is assumed, so both kinds of links are picked by text
//! heuristics and capped to bound the work per source:
//!
//! - **Listing links** ([`find_listing_links`]): pagination, topic
//!   categories, recent-year archives. Same host only. At most
//!   [`MAX_LISTING_LINKS`].
//! - **Item links** ([`find_item_links`]): anchors that look like article
//!   headlines. At most [`MAX_ITEM_LINKS`].
//!
//! Every returned address is absolute, has no fragment, is not the page
//! itself, and appears once.

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::extract::element_text;

pub const MAX_LISTING_LINKS: usize = 10;
pub const MAX_PAGINATION_LINKS: usize = 5;
pub const MAX_ITEM_LINKS: usize = 20;
/// Anchor text shorter than this is never an article link.
pub const MIN_ITEM_TEXT_CHARS: usize = 10;
const MIN_HEADLINE_WORDS: usize = 4;

/// Words that mark an address or anchor text as agriculture related.
const TOPIC_WORDS: &[&str] = &[
    "agri", "agriculture", "farming", "farm", "crop", "harvest", "krishi", "mandi", "market",
    "horticulture", "livestock", "news", "കൃഷി", "കർഷക",
];

/// Words that mark a link as pointing at an article.
const ARTICLE_WORDS: &[&str] = &[
    "agriculture", "farming", "crop", "farmer", "cultivation", "harvest", "coconut", "rice",
    "rubber", "kerala", "price", "market", "weather", "government", "scheme", "news", "കൃഷി",
    "കർഷക", "കേരളം", "വില",
];

/// Anchor texts that are navigation chrome, compared case-insensitively.
const GENERIC_TEXTS: &[&str] = &[
    "home", "about", "about us", "contact", "contact us", "login", "log in", "sign in",
    "register", "sign up", "more", "read more", "click here", "next", "previous", "prev",
    "share", "like", "follow", "subscribe", "privacy policy", "terms of use", "menu", "search",
    "view all", "load more",
];

/// Address fragments that never lead to an article.
const BLOCKED_PATHS: &[&str] = &[
    "/login", "/register", "/signup", "/sign-up", "/contact", "/about", "/privacy", "/terms",
    "/subscribe", "/account",
];

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "whatsapp:", "sms:", "data:"];

/// Social and utility hosts (and their subdomains).
const BLOCKED_HOSTS: &[&str] = &[
    "facebook.com", "twitter.com", "x.com", "instagram.com", "youtube.com", "whatsapp.com",
    "linkedin.com", "pinterest.com", "t.me", "telegram.me", "play.google.com",
    "apps.apple.com",
];

static PAGINATION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#".pagination a, .pager a, .page-numbers a, a.page-numbers, a[href*="page"], a[href*="Page"], .next a, a.next, a[rel="next"], .more a"#,
    )
    .unwrap()
});

static CATEGORY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"nav a, .menu a, .nav a, .navbar a, .category a, .categories a, a[href*="agri"], a[href*="farm"], a[href*="crop"], a[href*="news"], a[href*="category"], a[href*="section"]"#,
    )
    .unwrap()
});

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Item-link selectors, most specific first.
static ITEM_PATTERNS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        ".article-title a", ".news-title a", ".post-title a", ".headline a",
        ".story-headline a", ".entry-title a", "h1 a", "h2 a", "h3 a", "h4 a",
        ".article a", ".news-item a", ".post a", ".story a", "article a",
        r#".content a[href*="article"]"#, "li a", ".list a", "ul a",
    ]
    .iter()
    .map(|raw| Selector::parse(raw).unwrap())
    .collect()
});

/// Pagination, category and archive links that lead to more article listings.
pub fn find_listing_links(document: &Html, base_url: &str) -> Vec<String> {
    let Some(mut links) = LinkSet::new(base_url, MAX_LISTING_LINKS) else {
        return Vec::new();
    };

    let mut pagination = 0;
    for anchor in document.select(&PAGINATION) {
        if pagination >= MAX_PAGINATION_LINKS {
            break;
        }
        if links.offer_same_host(anchor) {
            pagination += 1;
        }
    }

    for anchor in document.select(&CATEGORY) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text = element_text(anchor, &[]).to_lowercase();
        if contains_any(&text, TOPIC_WORDS) || contains_any(&href.to_lowercase(), TOPIC_WORDS) {
            links.offer_same_host(anchor);
        }
    }

    let year = Local::now().year();
    let archive_marks = [
        format!("/{}/", year),
        format!("/{}/", year - 1),
        "archive".to_string(),
    ];
    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.to_lowercase();
        if archive_marks.iter().any(|mark| href.contains(mark.as_str())) {
            links.offer_same_host(anchor);
        }
    }

    debug!(base = %base_url, count = links.links.len(), "Found listing links");
    links.links
}

/// Links to individual articles.
pub fn find_item_links(document: &Html, base_url: &str) -> Vec<String> {
    let Some(mut links) = LinkSet::new(base_url, MAX_ITEM_LINKS) else {
        return Vec::new();
    };

    let year = Local::now().year();
    let year_patterns: Vec<Selector> = [year, year - 1]
        .iter()
        .filter_map(|y| Selector::parse(&format!(r#"a[href*="{}"]"#, y)).ok())
        .collect();

    for selector in ITEM_PATTERNS.iter().chain(year_patterns.iter()) {
        for anchor in document.select(selector) {
            if links.is_full() {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let text = element_text(anchor, &[]);
            if looks_like_article_link(href, &text) {
                links.offer(anchor);
            }
        }
    }

    debug!(base = %base_url, count = links.links.len(), "Found item links");
    links.links
}

/// Resolve `href` against `base_url`, dropping the fragment.
///
/// Returns `None` for unparsable addresses and non-http(s) schemes.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    resolve_against(&base, href).map(|url| url.to_string())
}

fn resolve_against(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Anchor text and address heuristics for article links.
pub fn looks_like_article_link(href: &str, text: &str) -> bool {
    let href_lower = href.trim().to_lowercase();
    if BLOCKED_SCHEMES.iter().any(|scheme| href_lower.starts_with(scheme))
        || BLOCKED_PATHS.iter().any(|path| href_lower.contains(path))
    {
        return false;
    }

    let text = text.trim();
    let text_lower = text.to_lowercase();
    if text.chars().count() < MIN_ITEM_TEXT_CHARS || GENERIC_TEXTS.contains(&text_lower.as_str()) {
        return false;
    }

    let topical = contains_any(&href_lower, ARTICLE_WORDS) || contains_any(&text_lower, ARTICLE_WORDS);
    topical || looks_like_headline(text)
}

/// At least four words, some letters, and not shouting.
fn looks_like_headline(text: &str) -> bool {
    let words = text.split_whitespace().count();
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    if words < MIN_HEADLINE_WORDS || letters.peek().is_none() {
        return false;
    }
    let cased: Vec<char> = letters.filter(|c| c.is_uppercase() || c.is_lowercase()).collect();
    cased.is_empty() || !cased.iter().all(|c| c.is_uppercase())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn blocked_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.trim_start_matches("www.");
        BLOCKED_HOSTS
            .iter()
            .any(|blocked| host == *blocked || host.ends_with(&format!(".{}", blocked)))
    })
}

/// Ordered, deduplicated, capped set of resolved links.
struct LinkSet {
    base: Url,
    seen: HashSet<String>,
    links: Vec<String>,
    cap: usize,
}

impl LinkSet {
    fn new(base_url: &str, cap: usize) -> Option<Self> {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                debug!(base = %base_url, error = %e, "Cannot resolve links against base");
                return None;
            }
        };
        let mut own = base.clone();
        own.set_fragment(None);
        let mut seen = HashSet::new();
        seen.insert(own.to_string());
        Some(Self {
            base,
            seen,
            links: Vec::new(),
            cap,
        })
    }

    fn is_full(&self) -> bool {
        self.links.len() >= self.cap
    }

    fn offer(&mut self, anchor: ElementRef<'_>) -> bool {
        self.offer_if(anchor, |_, _| true)
    }

    fn offer_same_host(&mut self, anchor: ElementRef<'_>) -> bool {
        self.offer_if(anchor, |base, url| base.host_str() == url.host_str())
    }

    fn offer_if(&mut self, anchor: ElementRef<'_>, keep: impl Fn(&Url, &Url) -> bool) -> bool {
        if self.is_full() {
            return false;
        }
        let Some(href) = anchor.value().attr("href") else {
            return false;
        };
        if BLOCKED_SCHEMES.iter().any(|scheme| href.trim().to_lowercase().starts_with(scheme)) {
            return false;
        }
        let Some(url) = resolve_against(&self.base, href) else {
            return false;
        };
        if blocked_host(&url) || !keep(&self.base, &url) {
            return false;
        }
        let address = url.to_string();
        if !self.seen.insert(address.clone()) {
            return false;
        }
        self.links.push(address);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_address() {
        assert_eq!(
            resolve("https://x.org/", "/news/1").as_deref(),
            Some("https://x.org/news/1")
        );
        assert_eq!(
            resolve("https://x.org/agri/list", "story-2#comments").as_deref(),
            Some("https://x.org/agri/story-2")
        );
    }

    #[test]
    fn test_resolve_rejects_other_schemes() {
        assert_eq!(resolve("https://x.org/", "javascript:void(0)"), None);
        assert_eq!(resolve("https://x.org/", "mailto:desk@x.org"), None);
        assert_eq!(resolve("https://x.org/", "#top"), None);
    }

    #[test]
    fn test_listing_links_pagination_categories_and_archives() {
        let year = Local::now().year();
        let html = format!(
            r#"<nav>
                <a href="/agriculture/">Agriculture</a>
                <a href="/cinema/">Cinema</a>
                <a href="/crop-news/">Crops</a>
            </nav>
            <div class="pagination"><a href="?page=2">2</a><a href="?page=3">3</a></div>
            <a href="/{year}/03/">March</a>
            <a href="https://other.org/agriculture/">Elsewhere</a>"#
        );
        let document = Html::parse_document(&html);
        let links = find_listing_links(&document, "https://x.org/");

        assert_eq!(
            links,
            vec![
                "https://x.org/?page=2".to_string(),
                "https://x.org/?page=3".to_string(),
                "https://x.org/agriculture/".to_string(),
                "https://x.org/crop-news/".to_string(),
                format!("https://x.org/{year}/03/"),
            ]
        );
    }

    #[test]
    fn test_listing_links_are_capped() {
        let anchors: String = (0..30)
            .map(|i| format!(r#"<a href="/news/page/{i}">News page {i}</a>"#))
            .collect();
        let document = Html::parse_document(&anchors);
        let links = find_listing_links(&document, "https://x.org/");
        assert_eq!(links.len(), MAX_LISTING_LINKS);
    }

    #[test]
    fn test_item_links_filtering() {
        let html = r#"<ul>
            <li><a href="/2019/paddy-procurement">Paddy procurement begins in Palakkad district</a></li>
            <li><a href="/login">Login</a></li>
            <li><a href="/x">Read more</a></li>
            <li><a href="https://facebook.com/share">Share this story on Facebook now</a></li>
            <li><a href="/story/abc">Rains lash the hill districts overnight</a></li>
            <li><a href="/story/def">BREAKING LIVE UPDATES FROM THE DESK</a></li>
            <li><a href="/story/ghi">Short</a></li>
            <li><a href="/2019/paddy-procurement">Paddy procurement begins in Palakkad district</a></li>
        </ul>"#;
        let document = Html::parse_document(html);
        let links = find_item_links(&document, "https://x.org/section/");
        assert_eq!(
            links,
            vec![
                "https://x.org/2019/paddy-procurement".to_string(),
                "https://x.org/story/abc".to_string(),
            ]
        );
    }

    #[test]
    fn test_item_links_are_capped() {
        let anchors: String = (0..40)
            .map(|i| format!(r#"<h2><a href="/story/{i}">Coconut prices update number {i}</a></h2>"#))
            .collect();
        let document = Html::parse_document(&anchors);
        assert_eq!(find_item_links(&document, "https://x.org/").len(), MAX_ITEM_LINKS);
    }

    #[test]
    fn test_looks_like_article_link() {
        assert!(looks_like_article_link("/a", "Kerala coconut prices hit a new high"));
        assert!(looks_like_article_link("/farmer-story", "Voices from the field"));
        assert!(!looks_like_article_link("/a", "Subscribe"));
        assert!(!looks_like_article_link("tel:12345", "Call the kerala desk now"));
        assert!(!looks_like_article_link("/a", "ALL CAPS BANNER TEXT HERE"));
        assert!(looks_like_article_link("/a", "കർഷകർക്ക് പുതിയ പദ്ധതി പ്രഖ്യാപിച്ചു"));
    }

    #[test]
    fn test_invalid_base_yields_nothing() {
        let document = Html::parse_document(r#"<a href="/news/1">Paddy procurement begins today</a>"#);
        assert!(find_item_links(&document, "not a url").is_empty());
        assert!(find_listing_links(&document, "not a url").is_empty());
    }
}
