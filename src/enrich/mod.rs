//! Detail page enrichment
//!
//! Fetches each deduplicated item's detail page, extracts structured fields,
//! and merges in the precomputed classification labels. Missing optional
//! fields never fail an item; only the detail fetch itself can.

mod extract;

pub use extract::{clean_text, normalize_listed_date, salary_from_description};

use crate::classify::ClassificationMaps;
use crate::crawler::SiteClient;
use crate::model::{DetailRecord, ItemReference, Location};
use crate::EnrichError;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

const TITLE_SELECTOR: &str = "h1.job-title";
const ORG_SELECTOR: &str = ".job-info__company";
const DATE_SELECTOR: &str = ".job-info__listed-date";
const CITY_SELECTOR: &str = ".job-info__location .location__city";
const SUBURB_SELECTOR: &str = ".job-info__location .location__suburb";
const REGION_SELECTOR: &str = ".job-info__location .location__region";
const EMPLOYMENT_TYPE_SELECTOR: &str = ".job-info__employment-type li";
const WORK_STYLE_SELECTOR: &str = ".job-info__work-style";
const SALARY_SELECTOR: &str = ".job-info__salary";
const DESCRIPTION_SELECTOR: &str = ".job-description";
const HARD_SKILLS_SELECTOR: &str = ".job-skills__hard li";
const SOFT_SKILLS_SELECTOR: &str = ".job-skills__soft li";

/// Enriches item references into detail records
///
/// Holds the classification maps for the whole run; lookups are local and
/// never touch the network.
pub struct Enricher<'a> {
    client: &'a SiteClient,
    maps: &'a ClassificationMaps,
    dimension_names: Vec<String>,
}

impl<'a> Enricher<'a> {
    pub fn new(
        client: &'a SiteClient,
        maps: &'a ClassificationMaps,
        dimension_names: Vec<String>,
    ) -> Self {
        Self {
            client,
            maps,
            dimension_names,
        }
    }

    /// Fetches and extracts one detail page
    ///
    /// Raises only on transport/HTTP failure of the detail fetch; everything
    /// extracted from the markup is best-effort.
    pub async fn enrich(&self, item: &ItemReference) -> Result<DetailRecord, EnrichError> {
        let body = self
            .client
            .fetch_detail(&item.url)
            .await
            .map_err(|source| EnrichError::Detail {
                id: item.id.clone(),
                source,
            })?;

        Ok(self.build_record(item, &body))
    }

    /// Builds a record from fetched detail markup; no network access
    pub fn build_record(&self, item: &ItemReference, body: &str) -> DetailRecord {
        let document = Html::parse_document(body);

        let description = select_text(&document, DESCRIPTION_SELECTOR).unwrap_or_default();

        // Explicit salary field first, then the first currency pattern in
        // the description.
        let salary = select_text(&document, SALARY_SELECTOR)
            .or_else(|| salary_from_description(&description));

        let mut classifications = BTreeMap::new();
        for dimension in &self.dimension_names {
            classifications.insert(
                dimension.clone(),
                self.maps.label_for(dimension, &item.id).to_string(),
            );
        }

        DetailRecord {
            id: item.id.clone(),
            title: select_text(&document, TITLE_SELECTOR).unwrap_or_else(|| item.title.clone()),
            url: item.url.clone(),
            listed_date: select_text(&document, DATE_SELECTOR)
                .and_then(|raw| normalize_listed_date(&raw)),
            organization: select_text(&document, ORG_SELECTOR),
            organization_id: select_attr(&document, ORG_SELECTOR, "data-company-id"),
            location: Location {
                city: select_text(&document, CITY_SELECTOR),
                suburb: select_text(&document, SUBURB_SELECTOR),
                region: select_text(&document, REGION_SELECTOR),
            },
            employment_types: select_texts(&document, EMPLOYMENT_TYPE_SELECTOR),
            work_style: select_text(&document, WORK_STYLE_SELECTOR),
            description,
            salary,
            hard_skills: select_texts(&document, HARD_SKILLS_SELECTOR),
            soft_skills: select_texts(&document, SOFT_SKILLS_SELECTOR),
            classifications,
        }
    }
}

/// First match's cleaned text, `None` when absent or blank
fn select_text(document: &Html, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    document
        .select(&parsed)
        .next()
        .map(|element| clean_text(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

/// Cleaned text of every match, blanks dropped
fn select_texts(document: &Html, selector: &str) -> Vec<String> {
    let Ok(parsed) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&parsed)
        .map(|element| clean_text(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect()
}

/// First match's attribute value, `None` when absent
fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    document
        .select(&parsed)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::NOT_FOUND_LABEL;
    use crate::config::{
        Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig,
    };
    use crate::crawler::TerminationMode;

    fn test_client() -> SiteClient {
        let config = Config {
            crawler: CrawlerConfig {
                listing_concurrency: 5,
                detail_concurrency: 10,
                termination_mode: TerminationMode::NoNewItems,
                max_pages: None,
                fetch_retries: 0,
                retry_delay_ms: 0,
            },
            site: SiteConfig {
                base_url: "https://jobs.example.com".to_string(),
                scope: "auckland".to_string(),
                has_next_affordance: true,
            },
            user_agent: UserAgentConfig {
                crawler_name: "jobtrawl".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            output: OutputConfig {
                results_path: "./results.json".to_string(),
                listing_path: "./listing.json".to_string(),
            },
            dimensions: Vec::new(),
        };
        SiteClient::new(&config).unwrap()
    }

    fn item() -> ItemReference {
        ItemReference {
            id: "clerk-1".to_string(),
            title: "Clerk (listing)".to_string(),
            url: "https://jobs.example.com/job/clerk-1".to_string(),
        }
    }

    const DETAIL_HTML: &str = r#"
        <html><body>
        <h1 class="job-title">Senior   Clerk</h1>
        <div class="job-info__company" data-company-id="org-77">Acme Ltd</div>
        <span class="job-info__listed-date">Listed 4 Aug 2026</span>
        <div class="job-info__location">
            <span class="location__city">Auckland</span>
            <span class="location__suburb">Newmarket</span>
            <span class="location__region">Auckland Region</span>
        </div>
        <ul class="job-info__employment-type"><li>Full time</li><li>Permanent</li></ul>
        <span class="job-info__work-style">Hybrid</span>
        <div class="job-description">Keep the books.
            Salary: $80,000 - $95,000 per annum. Apply now.</div>
        <ul class="job-skills__hard"><li>Bookkeeping</li><li>Excel</li></ul>
        <ul class="job-skills__soft"><li>Attention to detail</li></ul>
        </body></html>
    "#;

    #[test]
    fn test_build_record_extracts_fields() {
        let client = test_client();
        let mut maps = ClassificationMaps::new();
        maps.record("seniority", "clerk-1", "Senior");

        let enricher = Enricher::new(
            &client,
            &maps,
            vec!["seniority".to_string(), "industry".to_string()],
        );
        let record = enricher.build_record(&item(), DETAIL_HTML);

        assert_eq!(record.title, "Senior Clerk");
        assert_eq!(record.organization.as_deref(), Some("Acme Ltd"));
        assert_eq!(record.organization_id.as_deref(), Some("org-77"));
        assert_eq!(record.listed_date.as_deref(), Some("2026-08-04"));
        assert_eq!(record.location.city.as_deref(), Some("Auckland"));
        assert_eq!(record.location.suburb.as_deref(), Some("Newmarket"));
        assert_eq!(record.employment_types, vec!["Full time", "Permanent"]);
        assert_eq!(record.work_style.as_deref(), Some("Hybrid"));
        assert_eq!(record.hard_skills, vec!["Bookkeeping", "Excel"]);
        assert_eq!(record.soft_skills, vec!["Attention to detail"]);
    }

    #[test]
    fn test_salary_falls_back_to_description() {
        let client = test_client();
        let maps = ClassificationMaps::new();
        let enricher = Enricher::new(&client, &maps, Vec::new());

        let record = enricher.build_record(&item(), DETAIL_HTML);
        assert_eq!(record.salary.as_deref(), Some("$80,000 - $95,000 per annum"));
    }

    #[test]
    fn test_explicit_salary_wins_over_description() {
        let client = test_client();
        let maps = ClassificationMaps::new();
        let enricher = Enricher::new(&client, &maps, Vec::new());

        let html = DETAIL_HTML.replace(
            r#"<span class="job-info__work-style">Hybrid</span>"#,
            r#"<span class="job-info__work-style">Hybrid</span><div class="job-info__salary">$100,000 package</div>"#,
        );
        let record = enricher.build_record(&item(), &html);
        assert_eq!(record.salary.as_deref(), Some("$100,000 package"));
    }

    #[test]
    fn test_classification_defaults_to_not_found() {
        let client = test_client();
        let mut maps = ClassificationMaps::new();
        maps.record("seniority", "clerk-1", "Senior");

        let enricher = Enricher::new(
            &client,
            &maps,
            vec!["seniority".to_string(), "industry".to_string()],
        );
        let record = enricher.build_record(&item(), DETAIL_HTML);

        assert_eq!(record.classifications["seniority"], "Senior");
        assert_eq!(record.classifications["industry"], NOT_FOUND_LABEL);
    }

    #[test]
    fn test_missing_fields_never_fail() {
        let client = test_client();
        let maps = ClassificationMaps::new();
        let enricher = Enricher::new(&client, &maps, Vec::new());

        let record = enricher.build_record(&item(), "<html><body></body></html>");

        // Title falls back to the listing title; everything else is empty.
        assert_eq!(record.title, "Clerk (listing)");
        assert!(record.organization.is_none());
        assert!(record.salary.is_none());
        assert!(record.employment_types.is_empty());
        assert_eq!(record.description, "");
    }
}
