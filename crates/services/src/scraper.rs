//! Contact scraper: fetch one page and pull emails, phone numbers, postal
//! addresses and a likely contact person out of it with fixed patterns.
//!
//! There is no crawling, JavaScript rendering or retrying. A batch scrape
//! visits each URL once, in order.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use bizagent_core::models::contact::{ContactInfo, ScrapeResult};
use eyre::{Result, WrapErr};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const IGNORED_EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "domain.com",
    "email.com",
    "sentry.io",
    "wixpress.com",
];

const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Pure HTML-to-contacts extraction. Holds the compiled patterns.
pub struct ContactExtractor {
    email_regex: Regex,
    phone_regex: Regex,
    address_regex: Regex,
    whitespace_regex: Regex,
    person_label_regex: Regex,
    person_title_before_regex: Regex,
    person_title_after_regex: Regex,
    link_selector: Selector,
}

impl ContactExtractor {
    pub fn new() -> Self {
        Self {
            email_regex: Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b")
                .expect("Failed to compile email regex"),
            phone_regex: Regex::new(
                r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{2,4}\)|\d{2,4})(?:[\s.-]?\d{2,4}){2,4}",
            )
            .expect("Failed to compile phone regex"),
            address_regex: Regex::new(
                r"\b\d{1,6}\s+(?:(?:[A-Z][A-Za-z.'-]*|\d+(?:st|nd|rd|th))\s+){1,5}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl|Parkway|Pkwy|Highway|Hwy)\b\.?(?:,?\s+(?:Suite|Ste|Unit|#)\s*[A-Za-z0-9-]+)?(?:,\s*[A-Z][A-Za-z .'-]+,\s*[A-Z]{2}\s+\d{5}(?:-\d{4})?)?",
            )
            .expect("Failed to compile address regex"),
            whitespace_regex: Regex::new(r"\s+").expect("Failed to compile whitespace regex"),
            person_label_regex: Regex::new(
                r"(?:Contact Person|Contact|Attn|Attention)\s*:\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,2})",
            )
            .expect("Failed to compile contact label regex"),
            person_title_before_regex: Regex::new(
                r"(?:CEO|Co-Founder|Founder|Owner|President|Managing Director)\s*[:\-]\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,2})",
            )
            .expect("Failed to compile title regex"),
            person_title_after_regex: Regex::new(
                r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,2}),?\s+(?:-\s+)?(?:CEO|Co-Founder|Founder|Owner|President|Managing Director)\b",
            )
            .expect("Failed to compile title regex"),
            link_selector: Selector::parse("a[href]").expect("static href selector"),
        }
    }

    /// Extracts contact details from a raw HTML document.
    pub fn extract(&self, html: &str) -> ContactInfo {
        let document = Html::parse_document(html);
        let blocks = self.text_blocks(&document);
        let text = blocks.join(" ");

        let mut emails = BTreeSet::new();
        let mut phones: BTreeMap<String, String> = BTreeMap::new();

        for element in document.select(&self.link_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if let Some(target) = strip_prefix_ignore_case(href, "mailto:") {
                let address = target.split('?').next().unwrap_or_default();
                self.collect_emails(&urlencoding::decode(address).unwrap_or_default(), &mut emails);
            } else if let Some(number) = strip_prefix_ignore_case(href, "tel:") {
                self.collect_phones(number, &mut phones);
            }
        }

        self.collect_emails(&text, &mut emails);
        self.collect_phones(&text, &mut phones);

        let addresses = self
            .address_regex
            .find_iter(&text)
            .map(|m| m.as_str().trim().trim_end_matches(',').to_string())
            .collect();

        ContactInfo {
            emails,
            phones: phones.into_values().collect(),
            addresses,
            contact_person: blocks.iter().find_map(|block| self.find_contact_person(block)),
        }
    }

    /// Text nodes outside script/style, whitespace-collapsed, empty ones dropped.
    fn text_blocks(&self, document: &Html) -> Vec<String> {
        let mut blocks = Vec::new();
        for node in document.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"))
            });
            if hidden {
                continue;
            }
            let block = self.whitespace_regex.replace_all(text, " ");
            let block = block.trim();
            if !block.is_empty() {
                blocks.push(block.to_string());
            }
        }
        blocks
    }

    fn collect_emails(&self, text: &str, emails: &mut BTreeSet<String>) {
        for m in self.email_regex.find_iter(text) {
            let email = m.as_str().trim_matches('.').to_lowercase();
            if is_plausible_email(&email) {
                emails.insert(email);
            }
        }
    }

    /// Keyed by digits so the same number in different formats is kept once.
    fn collect_phones(&self, text: &str, phones: &mut BTreeMap<String, String>) {
        for m in self.phone_regex.find_iter(text) {
            let display = self.whitespace_regex.replace_all(m.as_str().trim(), " ").to_string();
            let digits: String = display.chars().filter(char::is_ascii_digit).collect();
            if (10..=15).contains(&digits.len()) {
                phones.entry(digits).or_insert(display);
            }
        }
    }

    fn find_contact_person(&self, text: &str) -> Option<String> {
        [
            &self.person_label_regex,
            &self.person_title_before_regex,
            &self.person_title_after_regex,
        ]
        .iter()
        .find_map(|regex| regex.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
    }
}

impl Default for ContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn is_plausible_email(email: &str) -> bool {
    if ASSET_SUFFIXES.iter().any(|suffix| email.ends_with(suffix)) {
        return false;
    }
    let domain = email.rsplit('@').next().unwrap_or_default();
    !IGNORED_EMAIL_DOMAINS
        .iter()
        .any(|ignored| domain == *ignored || domain.ends_with(&format!(".{}", ignored)))
}

/// Prefixes `https://` when the URL has no scheme.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

pub struct ContactScraper {
    client: Client,
    extractor: ContactExtractor,
}

impl ContactScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()
            .wrap_err("Failed to build scraper HTTP client")?;

        Ok(Self {
            client,
            extractor: ContactExtractor::new(),
        })
    }

    pub fn extractor(&self) -> &ContactExtractor {
        &self.extractor
    }

    /// Fetches `url` and extracts its contacts. Fetch failures propagate.
    pub async fn scrape(&self, url: &str) -> Result<ContactInfo> {
        let url = normalize_url(url);
        debug!("Scraping {}", url);

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .wrap_err_with(|| format!("{} returned an error status", url))?
            .text()
            .await
            .wrap_err_with(|| format!("Failed to read body of {}", url))?;

        let contacts = self.extractor.extract(&body);
        info!(
            "Scraped {}: {} emails, {} phones, {} addresses",
            url,
            contacts.emails.len(),
            contacts.phones.len(),
            contacts.addresses.len()
        );
        Ok(contacts)
    }

    /// Scrapes each site in order, one result per input. A failed site is
    /// reported in its result and does not stop the batch.
    pub async fn scrape_many(&self, urls: &[String], delay: Duration) -> Vec<ScrapeResult> {
        let mut results = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            let result = match self.scrape(url).await {
                Ok(contacts) => ScrapeResult {
                    url: url.clone(),
                    contacts,
                    error: None,
                },
                Err(e) => {
                    warn!("Failed to scrape {}: {:#}", url, e);
                    ScrapeResult {
                        url: url.clone(),
                        contacts: ContactInfo::default(),
                        error: Some(format!("{:#}", e)),
                    }
                }
            };
            results.push(result);

            if !delay.is_zero() && i + 1 < urls.len() {
                tokio::time::sleep(delay).await;
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const CONTACT_PAGE: &str = r#"
        <html>
          <head>
            <style>.x { content: "style@example.net"; }</style>
            <script>var support = "tracking@analytics.io";</script>
          </head>
          <body>
            <h1>Acme Widgets</h1>
            <p>Email us at info@acme.io or INFO@acme.io.</p>
            <p>Sales: <a href="mailto:sales@acme.io?subject=Hello">sales@acme.io</a></p>
            <p>Again: info@acme.io</p>
            <p>Download logo@2x.png or icon@3x.webp for print.</p>
            <p>Call (555) 123-4567 or <a href="tel:+1-555-987-6543">+1 555 987 6543</a></p>
            <p>Visit 123 Main Street, Springfield, IL 62704</p>
            <p>Contact: Jane Doe</p>
            <p>Placeholder: name@example.com</p>
          </body>
        </html>
    "#;

    #[test]
    fn test_extract_deduplicates_emails() {
        let info = ContactExtractor::new().extract(CONTACT_PAGE);

        assert_eq!(
            info.emails.into_iter().collect::<Vec<_>>(),
            vec!["info@acme.io".to_string(), "sales@acme.io".to_string()]
        );
    }

    #[test]
    fn test_extract_drops_asset_file_names() {
        let info = ContactExtractor::new().extract(CONTACT_PAGE);

        assert!(!info.emails.contains("logo@2x.png"));
        assert!(!info.emails.contains("icon@3x.webp"));
    }

    #[rstest]
    #[case("logo@2x.png", false)]
    #[case("name@example.com", false)]
    #[case("team@mail.example.org", false)]
    #[case("info@acme.io", true)]
    fn test_is_plausible_email(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_plausible_email(email), expected);
    }

    #[test]
    fn test_extract_skips_script_and_style_text() {
        let info = ContactExtractor::new().extract(CONTACT_PAGE);

        assert!(!info.emails.contains("tracking@analytics.io"));
        assert!(!info.emails.contains("style@example.net"));
    }

    #[test]
    fn test_extract_phones_keyed_by_digits() {
        let info = ContactExtractor::new().extract(CONTACT_PAGE);

        assert_eq!(info.phones.len(), 2);
        assert!(info.phones.contains("(555) 123-4567"));
    }

    #[test]
    fn test_extract_address_and_person() {
        let info = ContactExtractor::new().extract(CONTACT_PAGE);

        assert!(info
            .addresses
            .contains("123 Main Street, Springfield, IL 62704"));
        assert_eq!(info.contact_person.as_deref(), Some("Jane Doe"));
    }

    #[rstest]
    #[case("<p>Founder: Maria Lopez</p>", Some("Maria Lopez"))]
    #[case("<p>Our team: John Smith, CEO</p>", Some("John Smith"))]
    #[case("<p>Attn: Sam Taylor</p>", Some("Sam Taylor"))]
    #[case("<p>We build things.</p>", None)]
    fn test_contact_person_patterns(#[case] html: &str, #[case] expected: Option<&str>) {
        let info = ContactExtractor::new().extract(html);
        assert_eq!(info.contact_person.as_deref(), expected);
    }

    #[test]
    fn test_short_numbers_are_not_phones() {
        let info = ContactExtractor::new().extract("<p>Founded 2019-05-01, 42 staff</p>");
        assert!(info.phones.is_empty());
    }

    #[test]
    fn test_empty_page() {
        let info = ContactExtractor::new().extract("");
        assert!(info.is_empty());
    }

    #[rstest]
    #[case("acme.io", "https://acme.io")]
    #[case("  http://acme.io ", "http://acme.io")]
    #[case("https://acme.io/contact", "https://acme.io/contact")]
    fn test_normalize_url(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_url(input), expected);
    }

    #[tokio::test]
    async fn test_scrape_many_reports_failures_per_site() {
        let scraper = ContactScraper::new().unwrap();
        let urls = vec![
            "http://127.0.0.1:1/unreachable".to_string(),
            "http://127.0.0.1:1/also-unreachable".to_string(),
        ];

        let results = scraper.scrape_many(&urls, Duration::ZERO).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, urls[0]);
        assert_eq!(results[1].url, urls[1]);
        assert!(results.iter().all(|r| r.error.is_some() && r.contacts.is_empty()));
    }
}
