use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Selector};
use serde::de::DeserializeOwned;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("valid number regex"));
static DAY_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    // "30.–31. August 2025", "30-31 August 2025"
    Regex::new(r"(?i)^(\d{1,2})\.?\s*[–—-]\s*(\d{1,2})\.?\s+(\p{L}+)\s+(\d{4})$")
        .expect("valid day range regex")
});

fn client() -> &'static Client {
    static CLIENT: Lazy<Client> = Lazy::new(|| {
        Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent("VeloScout/0.1 (+https://github.com/mike/velo-scout)")
            .build()
            .expect("http client")
    });
    &CLIENT
}

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|node| {
            let cleaned = inner_text(node);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
        .flatten()
}

pub fn first_attr(element: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

pub fn absolute_url(base: &str, href: Option<String>) -> Option<String> {
    let href = href?;
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href);
    }
    let base_url = reqwest::Url::parse(base).ok()?;
    base_url.join(&href).ok().map(|u| u.to_string())
}

pub fn fetch_html(url: &str) -> Result<String> {
    let response = client()
        .get(url)
        .send()
        .with_context(|| format!("request failed for {url}"))?;
    let response = response
        .error_for_status()
        .with_context(|| format!("non-success status for {url}"))?;
    response
        .text()
        .with_context(|| format!("unable to read response body for {url}"))
}

pub fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T> {
    let response = client()
        .get(url)
        .header("Accept", "application/json")
        .send()
        .with_context(|| format!("request failed for {url}"))?;
    let response = response
        .error_for_status()
        .with_context(|| format!("non-success status for {url}"))?;
    response
        .json::<T>()
        .with_context(|| format!("unexpected payload from {url}"))
}

/// Parses a single date in the formats the covered sites actually use.
/// Month-name formats without a year get the current year, rolled forward
/// when the date has already passed.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let cleaned = clean_text(input);
    if cleaned.is_empty() {
        return None;
    }
    let formats = [
        "%Y-%m-%d",
        "%d.%m.%Y",
        "%d/%m/%Y",
        "%d %B %Y",
        "%d. %B %Y",
        "%B %d, %Y",
        "%b %d, %Y",
    ];
    for fmt in formats.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(date);
        }
    }

    // Month-name dates without a year ("15 June") get the current year,
    // rolled forward once the date has passed.
    let current_year = Local::now().year();
    let with_year = format!("{cleaned} {current_year}");
    for fmt in ["%d %B %Y", "%d. %B %Y", "%B %d %Y", "%b %d %Y"] {
        if let Ok(mut date) = NaiveDate::parse_from_str(&with_year, fmt) {
            if date < Local::now().date_naive() {
                date = date.with_year(current_year + 1)?;
            }
            return Some(date);
        }
    }

    None
}

/// Parses either a single date or a range like "30.–31. August 2025" /
/// "15 June 2026 – 17 June 2026" into (start, end).
pub fn parse_date_range(input: &str) -> Option<(NaiveDate, NaiveDate)> {
    let cleaned = clean_text(input);

    if let Some(caps) = DAY_RANGE_RE.captures(&cleaned) {
        let first = format!("{} {} {}", &caps[1], &caps[3], &caps[4]);
        let second = format!("{} {} {}", &caps[2], &caps[3], &caps[4]);
        let start = parse_date(&first)?;
        let end = parse_date(&second)?;
        return Some((start, end));
    }

    for sep in ['–', '—'] {
        if let Some((left, right)) = cleaned.split_once(sep) {
            if let (Some(start), Some(end)) = (parse_date(left), parse_date(right)) {
                return Some((start, end));
            }
        }
    }
    if let Some((left, right)) = cleaned.split_once(" - ") {
        if let (Some(start), Some(end)) = (parse_date(left), parse_date(right)) {
            return Some((start, end));
        }
    }

    parse_date(&cleaned).map(|date| (date, date))
}

/// First numeric value in a text fragment ("270 km", "CHF 1'200.50").
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(['\'', '\u{2009}'], "");
    NUMBER_RE
        .captures(&cleaned)
        .and_then(|caps| caps[1].replace(',', ".").parse().ok())
}

/// "CHF 1200 – 1800" style price fragments into (min, max).
pub fn parse_price_range(text: &str) -> (Option<f64>, Option<f64>) {
    let cleaned = text.replace(['\'', '\u{2009}'], "");
    let mut numbers = NUMBER_RE
        .captures_iter(&cleaned)
        .filter_map(|caps| caps[1].replace(',', ".").parse::<f64>().ok());
    let min = numbers.next();
    let max = numbers.next().or(min);
    (min, max)
}
