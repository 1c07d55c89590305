//! Online people-directory lookup: name -> unix identifier -> profile page ->
//! education fragment.
//!
//! Absence and ambiguity are ordinary outcomes here. Postdocs and visiting
//! staff are usually not listed at all, and a faculty member can share a name
//! with a student. Transport failures are folded into per-name outcomes so
//! one bad fetch never takes down the rest of a ~150-name batch.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::DirectoryConfig;
use crate::error::{Result, ScraperError};
use crate::patterns;
use crate::types::{DirectoryClient, FacultyName, RecordOutcome, RecordSource};

/// Outcome of resolving a name on the search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierOutcome {
    /// Not listed; expected for postdocs and visitors
    None,
    Single(String),
    /// Name collision; listing order puts faculty first
    Multiple(Vec<String>),
}

/// Production client backed by reqwest, with a per-request timeout so a hung
/// fetch degrades into a missing record like any other lookup failure.
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    search_url: String,
    profile_url: String,
}

impl HttpDirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            profile_url: config.profile_url.clone(),
        })
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn search_page(&self, query: &str) -> Result<String> {
        let url = self.search_url.replace("{query}", query);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Ok(response.text().await?)
    }

    async fn profile_page(&self, unix_id: &str) -> Result<String> {
        let url = self.profile_url.replace("{unix_id}", unix_id);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Ok(response.text().await?)
    }
}

pub struct DirectoryLookup {
    client: Box<dyn DirectoryClient>,
    search_selector: Selector,
    education_selector: Selector,
    pattern: Regex,
}

impl DirectoryLookup {
    pub fn new(client: Box<dyn DirectoryClient>, config: &DirectoryConfig) -> Result<Self> {
        let search_selector = Selector::parse(&config.search_selector)
            .map_err(|_| ScraperError::Selector(config.search_selector.clone()))?;
        let education_selector = Selector::parse(&config.education_selector)
            .map_err(|_| ScraperError::Selector(config.education_selector.clone()))?;

        Ok(Self {
            client,
            search_selector,
            education_selector,
            pattern: patterns::ACADEMIC_RECORD.clone(),
        })
    }

    /// Resolve one name. Every failure mode is folded into the outcome;
    /// callers can rely on this never returning an error and never panicking.
    #[instrument(skip(self), fields(name = %name.display()))]
    pub async fn lookup(&self, name: &FacultyName) -> RecordOutcome {
        match self.try_lookup(name).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("directory lookup failed for {}: {}", name.display(), e);
                RecordOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_lookup(&self, name: &FacultyName) -> Result<RecordOutcome> {
        let query = build_query(name);
        let search_html = self.client.search_page(&query).await?;

        match self.find_identifier(&search_html) {
            IdentifierOutcome::None => {
                debug!("{} is absent from the directory", name.display());
                Ok(RecordOutcome::Missing)
            }
            IdentifierOutcome::Single(unix_id) => {
                let record = self
                    .fetch_education(&unix_id)
                    .await?
                    .and_then(|education| self.extract_record(&education));

                Ok(match record {
                    Some(text) => RecordOutcome::Found {
                        text,
                        source: RecordSource::Directory,
                    },
                    None => RecordOutcome::Missing,
                })
            }
            IdentifierOutcome::Multiple(unix_ids) => {
                // Listing order puts faculty ahead of students and staff;
                // taking the first entry is the deterministic tie-break.
                // Only the chosen profile is ever fetched.
                let chosen = unix_ids[0].clone();
                let discarded = unix_ids[1..].to_vec();
                warn!(
                    "ambiguous directory match for {}: picked {} over {}",
                    name.display(),
                    chosen,
                    discarded.join(", ")
                );

                let text = self
                    .fetch_education(&chosen)
                    .await?
                    .and_then(|education| self.extract_record(&education));

                Ok(RecordOutcome::Ambiguous {
                    text,
                    chosen,
                    discarded,
                })
            }
        }
    }

    async fn fetch_education(&self, unix_id: &str) -> Result<Option<String>> {
        let html = self.client.profile_page(unix_id).await?;
        Ok(self.extract_education(&html))
    }

    /// Unix identifiers from the search results: the mailto local parts in
    /// the cell next to each listing's phone field, in listing order.
    fn find_identifier(&self, html: &str) -> IdentifierOutcome {
        let document = Html::parse_document(html);
        let mut unix_ids: Vec<String> = Vec::new();

        for element in document.select(&self.search_selector) {
            let href = element.value().attr("href").unwrap_or_default();
            if let Some(captures) = patterns::UNIX_ID.captures(href) {
                let unix_id = captures[1].to_string();
                if !unix_ids.contains(&unix_id) {
                    unix_ids.push(unix_id);
                }
            }
        }

        match unix_ids.len() {
            0 => IdentifierOutcome::None,
            1 => IdentifierOutcome::Single(unix_ids.remove(0)),
            _ => IdentifierOutcome::Multiple(unix_ids),
        }
    }

    /// Education text from a profile page. Some staff profiles exist without
    /// a degree section at all; that reads as `None`.
    fn extract_education(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let text = document
            .select(&self.education_selector)
            .flat_map(|element| element.text())
            .collect::<Vec<_>>()
            .join(" ");

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn extract_record(&self, education: &str) -> Option<String> {
        self.pattern.find(education).map(|m| m.as_str().to_string())
    }
}

/// `first+last` query string; hyphenated last names pass through unchanged.
fn build_query(name: &FacultyName) -> String {
    format!(
        "{}+{}",
        urlencoding::encode(&name.first),
        urlencoding::encode(&name.last)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct MockDirectoryClient {
        search_html: String,
        profiles: HashMap<String, String>,
        fail_search: bool,
        fetched: Arc<tokio::sync::Mutex<Vec<String>>>,
    }

    impl MockDirectoryClient {
        fn new(search_html: &str) -> Self {
            Self {
                search_html: search_html.to_string(),
                profiles: HashMap::new(),
                fail_search: false,
                fetched: Arc::new(tokio::sync::Mutex::new(Vec::new())),
            }
        }

        fn with_profile(mut self, unix_id: &str, html: &str) -> Self {
            self.profiles.insert(unix_id.to_string(), html.to_string());
            self
        }

        fn failing() -> Self {
            let mut mock = Self::new("");
            mock.fail_search = true;
            mock
        }
    }

    #[async_trait]
    impl DirectoryClient for MockDirectoryClient {
        async fn search_page(&self, _query: &str) -> Result<String> {
            if self.fail_search {
                return Err(ScraperError::Config("connection refused".to_string()));
            }
            Ok(self.search_html.clone())
        }

        async fn profile_page(&self, unix_id: &str) -> Result<String> {
            self.fetched.lock().await.push(unix_id.to_string());
            Ok(self
                .profiles
                .get(unix_id)
                .cloned()
                .unwrap_or_else(|| "<html><body></body></html>".to_string()))
        }
    }

    fn test_config() -> DirectoryConfig {
        DirectoryConfig {
            search_url: "https://directory.example.edu/search?q={query}".to_string(),
            profile_url: "https://directory.example.edu/people/{unix_id}".to_string(),
            timeout_seconds: 10,
            search_selector: "td.phone + td a[href^='mailto:']".to_string(),
            education_selector: "div.education".to_string(),
        }
    }

    fn search_row(unix_id: &str) -> String {
        format!(
            "<tr><td class=\"phone\">413-597-1234</td><td><a href=\"mailto:{}@example.edu\">email</a></td></tr>",
            unix_id
        )
    }

    fn search_page(rows: &[&str]) -> String {
        let body: String = rows.iter().map(|id| search_row(id)).collect();
        format!("<html><body><table>{}</table></body></html>", body)
    }

    fn profile_page(education: &str) -> String {
        format!(
            "<html><body><div class=\"education\"><p>{}</p></div></body></html>",
            education
        )
    }

    fn lookup_with(client: MockDirectoryClient) -> (DirectoryLookup, Arc<tokio::sync::Mutex<Vec<String>>>) {
        let fetched = client.fetched.clone();
        let lookup = DirectoryLookup::new(Box::new(client), &test_config()).unwrap();
        (lookup, fetched)
    }

    fn adams() -> FacultyName {
        FacultyName::new("Colin C.", "Adams")
    }

    #[tokio::test]
    async fn zero_search_results_is_missing_not_an_error() {
        let (lookup, fetched) = lookup_with(MockDirectoryClient::new(
            "<html><body><table></table></body></html>",
        ));

        let outcome = lookup.lookup(&adams()).await;

        assert_eq!(outcome, RecordOutcome::Missing);
        assert!(fetched.lock().await.is_empty());
    }

    #[tokio::test]
    async fn single_identifier_resolves_to_a_found_record() {
        let client = MockDirectoryClient::new(&search_page(&["cadams"])).with_profile(
            "cadams",
            &profile_page("1978, B.S., Massachusetts Institute of Technology"),
        );
        let (lookup, _) = lookup_with(client);

        let outcome = lookup.lookup(&adams()).await;

        assert_eq!(
            outcome,
            RecordOutcome::Found {
                text: "1978, B.S., Massachusetts Institute of Technology".to_string(),
                source: RecordSource::Directory,
            }
        );
    }

    #[tokio::test]
    async fn profile_without_education_section_is_missing() {
        let client = MockDirectoryClient::new(&search_page(&["sblair"]))
            .with_profile("sblair", "<html><body><div class=\"office\">Hopkins Hall</div></body></html>");
        let (lookup, _) = lookup_with(client);

        let outcome = lookup.lookup(&FacultyName::new("Susan", "Blair")).await;
        assert_eq!(outcome, RecordOutcome::Missing);
    }

    #[tokio::test]
    async fn ambiguity_takes_the_first_identifier_and_never_fetches_the_second() {
        let client = MockDirectoryClient::new(&search_page(&["cadams", "cadams2"])).with_profile(
            "cadams",
            &profile_page("1990, B.A., Yale University"),
        );
        let (lookup, fetched) = lookup_with(client);

        let outcome = lookup.lookup(&adams()).await;

        match outcome {
            RecordOutcome::Ambiguous { text, chosen, discarded } => {
                assert_eq!(chosen, "cadams");
                assert_eq!(discarded, vec!["cadams2".to_string()]);
                assert_eq!(text.as_deref(), Some("1990, B.A., Yale University"));
            }
            other => panic!("expected ambiguous outcome, got {:?}", other),
        }
        assert_eq!(*fetched.lock().await, vec!["cadams".to_string()]);
    }

    #[tokio::test]
    async fn tie_break_is_stable_across_repeated_calls() {
        let page = search_page(&["cadams", "cadams2"]);
        for _ in 0..3 {
            let client = MockDirectoryClient::new(&page)
                .with_profile("cadams", &profile_page("1990, B.A., Yale University"));
            let (lookup, _) = lookup_with(client);

            match lookup.lookup(&adams()).await {
                RecordOutcome::Ambiguous { chosen, .. } => assert_eq!(chosen, "cadams"),
                other => panic!("expected ambiguous outcome, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn transport_failure_becomes_a_failed_outcome() {
        let (lookup, _) = lookup_with(MockDirectoryClient::failing());

        let outcome = lookup.lookup(&adams()).await;

        match outcome {
            RecordOutcome::Failed { reason } => assert!(reason.contains("connection refused")),
            other => panic!("expected failed outcome, got {:?}", other),
        }
    }

    #[test]
    fn query_is_first_plus_last_with_encoding() {
        assert_eq!(build_query(&adams()), "Colin%20C.+Adams");
        assert_eq!(
            build_query(&FacultyName::new("Ana", "Silva-Costa")),
            "Ana+Silva-Costa"
        );
    }
}
