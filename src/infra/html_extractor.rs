use crate::app::ports::MarkupExtractor;
use crate::error::{FetchError, Result};
use crate::types::RawRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

static LD_JSON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("Failed to compile LD_JSON_SELECTOR")
});

static JOB_CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[data-job-id], .job-listing, .job, .posting, .opening")
        .expect("Failed to compile JOB_CARD_SELECTOR")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".job-title, .posting-title, h2, h3, h4, a")
        .expect("Failed to compile TITLE_SELECTOR")
});

static DEPARTMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".department, .job-department, .team")
        .expect("Failed to compile DEPARTMENT_SELECTOR")
});

static LOCATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".location, .job-location, .posting-location")
        .expect("Failed to compile LOCATION_SELECTOR")
});

static EMPLOYMENT_TYPE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".employment-type, .job-type, .commitment")
        .expect("Failed to compile EMPLOYMENT_TYPE_SELECTOR")
});

static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".description, .job-description, .summary")
        .expect("Failed to compile DESCRIPTION_SELECTOR")
});

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE"));

/// Pulls postings out of a careers page.
///
/// Structured `JobPosting` JSON-LD wins when present; otherwise job cards are
/// read from common careers-page markup.
#[derive(Debug, Default, Clone)]
pub struct HtmlJobExtractor;

impl HtmlJobExtractor {
    pub fn new() -> Self {
        Self
    }

    fn clean_text(raw: &str) -> String {
        WHITESPACE_RE.replace_all(raw, " ").trim().to_string()
    }

    fn element_text(element: ElementRef<'_>) -> String {
        Self::clean_text(&element.text().collect::<String>())
    }

    fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
        card.select(selector)
            .map(Self::element_text)
            .find(|text| !text.is_empty())
    }

    fn resolve_link(base: Option<&Url>, href: &str) -> String {
        match base.and_then(|b| b.join(href).ok()) {
            Some(url) => url.to_string(),
            None => href.to_string(),
        }
    }

    fn insert_text(record: &mut Map<String, Value>, key: &str, value: Option<String>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            record.insert(key.to_string(), Value::String(value));
        }
    }

    fn extract_json_ld(document: &Html) -> Vec<RawRecord> {
        let mut records = Vec::new();
        for script in document.select(&LD_JSON_SELECTOR) {
            let text = script.text().collect::<String>();
            let value = match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(e) => {
                    debug!("Skipping unparseable JSON-LD block: {}", e);
                    continue;
                }
            };

            let mut postings = Vec::new();
            Self::collect_job_postings(&value, &mut postings);
            records.extend(
                postings
                    .into_iter()
                    .map(Self::json_ld_to_raw)
                    .filter(|record| !record.is_empty())
                    .map(Value::Object),
            );
        }
        records
    }

    fn collect_job_postings<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
        match value {
            Value::Array(items) => {
                for item in items {
                    Self::collect_job_postings(item, out);
                }
            }
            Value::Object(map) => {
                let is_posting = match map.get("@type") {
                    Some(Value::String(t)) => t == "JobPosting",
                    Some(Value::Array(types)) => types.iter().any(|t| t == "JobPosting"),
                    _ => false,
                };
                if is_posting {
                    out.push(value);
                } else if let Some(graph) = map.get("@graph") {
                    Self::collect_job_postings(graph, out);
                }
            }
            _ => {}
        }
    }

    fn json_ld_to_raw(posting: &Value) -> Map<String, Value> {
        let mut record = Map::new();
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(Self::clean_text);

        let identifier = match posting.get("identifier") {
            Some(Value::Object(id)) => text(id.get("value")),
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self::insert_text(&mut record, "id", identifier);
        Self::insert_text(&mut record, "title", text(posting.get("title")));

        let description = posting
            .get("description")
            .and_then(Value::as_str)
            .map(|html| Self::element_text(Html::parse_fragment(html).root_element()));
        Self::insert_text(&mut record, "description", description);

        Self::insert_text(&mut record, "date_posted", text(posting.get("datePosted")));
        Self::insert_text(&mut record, "department", text(posting.get("occupationalCategory")));
        Self::insert_text(&mut record, "apply_url", text(posting.get("url")));

        let employment_type = match posting.get("employmentType") {
            Some(Value::String(t)) => Some(t.clone()),
            Some(Value::Array(types)) => Some(
                types
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        };
        Self::insert_text(&mut record, "employment_type", employment_type);

        let job_location = match posting.get("jobLocation") {
            Some(Value::Array(locations)) => locations.first(),
            other => other,
        };
        let locality = job_location
            .and_then(|loc| loc.get("address"))
            .and_then(|addr| {
                text(addr.get("addressLocality")).or_else(|| text(addr.get("addressRegion")))
            });
        Self::insert_text(&mut record, "location", locality);

        record
    }

    fn extract_cards(document: &Html, base: Option<&Url>) -> Vec<RawRecord> {
        let cards: Vec<ElementRef<'_>> = document.select(&JOB_CARD_SELECTOR).collect();
        let card_ids: HashSet<_> = cards.iter().map(|c| c.id()).collect();

        let mut records = Vec::new();
        for card in cards {
            // A card nested in another card is part of the outer posting
            if card.ancestors().any(|a| card_ids.contains(&a.id())) {
                continue;
            }

            let mut record = Map::new();
            let value = card.value();
            let id = value
                .attr("data-job-id")
                .or_else(|| value.attr("data-id"))
                .map(str::to_string);
            Self::insert_text(&mut record, "id", id);
            Self::insert_text(&mut record, "title", Self::first_text(card, &TITLE_SELECTOR));

            let department = value
                .attr("data-department")
                .map(str::to_string)
                .or_else(|| Self::first_text(card, &DEPARTMENT_SELECTOR));
            Self::insert_text(&mut record, "department", department);
            Self::insert_text(&mut record, "location", Self::first_text(card, &LOCATION_SELECTOR));
            Self::insert_text(
                &mut record,
                "employment_type",
                Self::first_text(card, &EMPLOYMENT_TYPE_SELECTOR),
            );
            Self::insert_text(
                &mut record,
                "description",
                Self::first_text(card, &DESCRIPTION_SELECTOR),
            );
            Self::insert_text(&mut record, "posted_date", value.attr("data-posted").map(str::to_string));

            let link = card
                .select(&LINK_SELECTOR)
                .filter_map(|a| a.value().attr("href"))
                .next()
                .or_else(|| value.attr("href"))
                .map(|href| Self::resolve_link(base, href));
            Self::insert_text(&mut record, "apply_url", link);

            if !record.is_empty() {
                records.push(Value::Object(record));
            }
        }
        records
    }
}

impl MarkupExtractor for HtmlJobExtractor {
    fn parse_from_markup(&self, markup: &str, base_url: &str) -> Result<Vec<RawRecord>> {
        if markup.trim().is_empty() {
            return Err(FetchError::Extraction(format!("empty document from {base_url}")));
        }

        let document = Html::parse_document(markup);

        let structured = Self::extract_json_ld(&document);
        if !structured.is_empty() {
            debug!("Found {} JSON-LD JobPosting entries", structured.len());
            return Ok(structured);
        }

        let base = Url::parse(base_url).ok();
        let cards = Self::extract_cards(&document, base.as_ref());
        debug!("Found {} job cards in markup", cards.len());
        Ok(cards)
    }
}
