//! Website scraper (spec §4.7): obeys `robots.txt` via a 1h cache, rate
//! limits 2s between requests per domain, budgets ≤10 pages/≤3 depth per
//! domain, discovers "important" pages by URL pattern, extracts with the
//! HTML pipeline (C1), and aggregates into an LLM-extracted company
//! overview.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcm_storage::HttpFetcher;
use tokio::sync::Mutex;
use url::Url;

use crate::llm_fill::FieldExtractionLlm;

pub const USER_AGENT: &str = "gcm-profile-scraper/1.0 (+https://example.invalid/bot)";
const ROBOTS_CACHE_TTL: Duration = Duration::from_secs(3600);
const PER_DOMAIN_RATE_LIMIT: Duration = Duration::from_secs(2);
const MAX_PAGES_PER_DOMAIN: usize = 10;
const MAX_DEPTH: u32 = 3;

const IMPORTANT_PATH_PATTERNS: &[&str] =
    &["about", "company", "services", "team", "leadership", "contact", "capabilities", "past-performance"];

#[derive(Debug, Clone, Default)]
struct RobotsRules {
    disallow: Vec<String>,
}

impl RobotsRules {
    fn allows(&self, path: &str) -> bool {
        !self.disallow.iter().any(|prefix| !prefix.is_empty() && path.starts_with(prefix.as_str()))
    }
}

fn parse_robots_txt(body: &str) -> RobotsRules {
    let mut rules = RobotsRules::default();
    let mut in_wildcard_block = false;
    for line in body.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((directive, value)) = line.split_once(':') else { continue };
        let directive = directive.trim().to_ascii_lowercase();
        let value = value.trim();
        match directive.as_str() {
            "user-agent" => in_wildcard_block = value == "*",
            "disallow" if in_wildcard_block => rules.disallow.push(value.to_string()),
            _ => {}
        }
    }
    rules
}

struct CachedRobots {
    rules: RobotsRules,
    fetched_at: Instant,
}

#[derive(Default)]
pub struct RobotsCache {
    entries: Mutex<std::collections::HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn rules_for(&self, fetcher: &HttpFetcher, origin: &str) -> RobotsRules {
        {
            let entries = self.entries.lock().await;
            if let Some(cached) = entries.get(origin) {
                if cached.fetched_at.elapsed() < ROBOTS_CACHE_TTL {
                    return cached.rules.clone();
                }
            }
        }

        let robots_url = format!("{origin}/robots.txt");
        let rules = match fetcher.fetch_bytes(uuid::Uuid::new_v4(), origin, &robots_url).await {
            Ok(response) => parse_robots_txt(&String::from_utf8_lossy(&response.body)),
            Err(_) => RobotsRules::default(),
        };

        self.entries
            .lock()
            .await
            .insert(origin.to_string(), CachedRobots { rules: rules.clone(), fetched_at: Instant::now() });
        rules
    }
}

#[derive(Default)]
pub struct DomainRateLimiter {
    last_request: Mutex<std::collections::HashMap<String, Instant>>,
}

impl DomainRateLimiter {
    pub async fn wait_turn(&self, domain: &str) {
        let sleep_for = {
            let mut last = self.last_request.lock().await;
            match last.get(domain) {
                Some(previous) if previous.elapsed() < PER_DOMAIN_RATE_LIMIT => {
                    Some(PER_DOMAIN_RATE_LIMIT - previous.elapsed())
                }
                _ => None,
            }
        };
        if let Some(delay) = sleep_for {
            tokio::time::sleep(delay).await;
        }
        self.last_request.lock().await.insert(domain.to_string(), Instant::now());
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScrapedPage {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyOverviewFromWeb {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capabilities: Vec<String>,
    pub pages_visited: Vec<String>,
}

fn is_important_path(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    IMPORTANT_PATH_PATTERNS.iter().any(|pattern| path.contains(pattern))
}

fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    use scraper::{Html, Selector};
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| url.host_str() == base.host_str())
        .collect()
}

/// Crawls `start_url`'s domain breadth-first within the depth/page
/// budget, respecting `robots.txt` and the per-domain rate limit, then
/// asks `llm` to extract a structured company overview from the
/// aggregated visible text.
pub async fn scrape_company_site(
    fetcher: &HttpFetcher,
    robots: &RobotsCache,
    rate_limiter: &DomainRateLimiter,
    start_url: &str,
    llm: &dyn FieldExtractionLlm,
) -> anyhow::Result<CompanyOverviewFromWeb> {
    let start = Url::parse(start_url)?;
    let origin = format!("{}://{}", start.scheme(), start.host_str().unwrap_or_default());
    let domain = start.host_str().unwrap_or_default().to_string();

    let mut visited = HashSet::new();
    let mut queue: VecDeque<(Url, u32)> = VecDeque::new();
    queue.push_back((start.clone(), 0));

    let mut pages = Vec::new();
    let mut aggregated_text = String::new();

    while let Some((url, depth)) = queue.pop_front() {
        if pages.len() >= MAX_PAGES_PER_DOMAIN || depth > MAX_DEPTH {
            continue;
        }
        let url_str = url.as_str().to_string();
        if !visited.insert(url_str.clone()) {
            continue;
        }

        let rules = robots.rules_for(fetcher, &origin).await;
        if !rules.allows(url.path()) {
            continue;
        }

        rate_limiter.wait_turn(&domain).await;

        let Ok(response) = fetcher.fetch_bytes(uuid::Uuid::new_v4(), &domain, &url_str).await else {
            continue;
        };

        let document = gcm_extract::html::extract_html(&response.body);
        aggregated_text.push_str(&document.full_text);
        aggregated_text.push('\n');
        pages.push(ScrapedPage { url: url_str, title: document.metadata.title.clone(), text: document.full_text });

        if depth < MAX_DEPTH {
            for link in extract_links(&url, &String::from_utf8_lossy(&response.body)) {
                if is_important_path(&link) && !visited.contains(link.as_str()) {
                    queue.push_back((link, depth + 1));
                }
            }
        }
    }

    let fields = llm
        .fill_missing_fields(&aggregated_text, &["overview.name".to_string(), "overview.description".to_string()])
        .await
        .unwrap_or_default();

    Ok(CompanyOverviewFromWeb {
        name: fields.get("overview.name").cloned(),
        description: fields.get("overview.description").cloned(),
        capabilities: Vec::new(),
        pages_visited: pages.into_iter().map(|p| p.url).collect(),
    })
}

pub fn new_rate_limiter() -> Arc<DomainRateLimiter> {
    Arc::new(DomainRateLimiter::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robots_txt_disallow_rules_apply_only_to_wildcard_block() {
        let body = "User-agent: Googlebot\nDisallow: /private\n\nUser-agent: *\nDisallow: /internal\n";
        let rules = parse_robots_txt(body);
        assert!(!rules.allows("/internal/page"));
        assert!(rules.allows("/private/page"));
        assert!(rules.allows("/public/page"));
    }

    #[test]
    fn important_path_patterns_are_detected() {
        let url = Url::parse("https://acme.example/about-us").unwrap();
        assert!(is_important_path(&url));
        let url = Url::parse("https://acme.example/blog/2024/post").unwrap();
        assert!(!is_important_path(&url));
    }

    #[tokio::test]
    async fn rate_limiter_enforces_minimum_gap_between_requests() {
        let limiter = DomainRateLimiter::default();
        let start = Instant::now();
        limiter.wait_turn("acme.example").await;
        limiter.wait_turn("acme.example").await;
        assert!(start.elapsed() >= PER_DOMAIN_RATE_LIMIT);
    }
}
