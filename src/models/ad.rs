//! Sponsored ad listing records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::error::ScraperError;

/// Position of a sponsored listing on the results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdPosition {
    /// Above the organic results
    Top,
    /// Right-hand column
    Sidebar,
    /// Below the organic results
    Bottom,
    /// Position could not be determined
    #[default]
    Unknown,
}

impl AdPosition {
    /// Map a 1-based slot index reported by the DOM layer.
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Self::Top,
            2 => Self::Sidebar,
            3 => Self::Bottom,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for AdPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdPosition::Top => "top",
            AdPosition::Sidebar => "sidebar",
            AdPosition::Bottom => "bottom",
            AdPosition::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Contact and metadata extracted from one sponsored listing and its
/// landing page.
///
/// Construct through [`AdData::builder`], which trims and normalizes the
/// fields and validates the landing URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdData {
    /// Search keyword that triggered the ad.
    pub keyword: String,
    /// Geographic location targeted by the search.
    pub location: String,
    /// Landing page URL.
    pub website_url: String,
    /// Ad title as shown on the results page.
    pub title: String,
    /// Ad description text.
    pub description: Option<String>,
    /// Contact phone number, normalized to digits.
    pub phone_number: Option<String>,
    /// Price information if shown.
    pub price: Option<String>,
    /// Contact email address, lowercased.
    pub email: Option<String>,
    /// Social media links keyed by platform name.
    #[serde(default)]
    pub social_links: HashMap<String, String>,
    /// Meta tags harvested from the landing page.
    #[serde(default)]
    pub meta_tags: HashMap<String, String>,
    /// Slot position of the ad in the results.
    #[serde(default)]
    pub ad_position: AdPosition,
    /// When the listing was scraped.
    #[serde(with = "time::serde::rfc3339")]
    pub scraped_at: OffsetDateTime,
    /// Product categories mentioned by the listing.
    #[serde(default)]
    pub product_categories: Vec<String>,
    /// Car brand, when detected.
    pub brand: Option<String>,
    /// Car model, when detected.
    pub model: Option<String>,
    /// Condition of the advertised parts (new, used, refurbished).
    pub part_condition: Option<String>,
}

impl AdData {
    /// Start building a record from the four required fields.
    pub fn builder(
        keyword: impl Into<String>,
        location: impl Into<String>,
        website_url: impl Into<String>,
        title: impl Into<String>,
    ) -> AdDataBuilder {
        AdDataBuilder::new(keyword, location, website_url, title)
    }

    /// Strip everything but digits from a phone number.
    ///
    /// Returns the input unchanged when it contains no digits at all.
    pub fn clean_phone_number(phone: &str) -> String {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            phone.to_string()
        } else {
            digits
        }
    }

    fn validate_url(url: &str) -> Result<(), ScraperError> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidRecord(format!(
                "invalid URL scheme: {}",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ScraperError::InvalidRecord(
                "URL has no host".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for AdData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.title, self.website_url, self.ad_position
        )
    }
}

/// Builder for [`AdData`] that owns validation and normalization.
#[derive(Debug, Clone)]
pub struct AdDataBuilder {
    keyword: String,
    location: String,
    website_url: String,
    title: String,
    description: Option<String>,
    phone_number: Option<String>,
    price: Option<String>,
    email: Option<String>,
    social_links: HashMap<String, String>,
    meta_tags: HashMap<String, String>,
    ad_position: AdPosition,
    product_categories: Vec<String>,
    brand: Option<String>,
    model: Option<String>,
    part_condition: Option<String>,
}

impl AdDataBuilder {
    fn new(
        keyword: impl Into<String>,
        location: impl Into<String>,
        website_url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            location: location.into(),
            website_url: website_url.into(),
            title: title.into(),
            description: None,
            phone_number: None,
            price: None,
            email: None,
            social_links: HashMap::new(),
            meta_tags: HashMap::new(),
            ad_position: AdPosition::Unknown,
            product_categories: Vec::new(),
            brand: None,
            model: None,
            part_condition: None,
        }
    }

    /// Set the ad description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the contact phone number (normalized on build).
    pub fn phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    /// Set the price text.
    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Set the contact email (lowercased on build).
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Add a social media link.
    pub fn social_link(mut self, platform: impl Into<String>, url: impl Into<String>) -> Self {
        self.social_links.insert(platform.into(), url.into());
        self
    }

    /// Add a landing page meta tag.
    pub fn meta_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta_tags.insert(name.into(), value.into());
        self
    }

    /// Set the slot position.
    pub fn ad_position(mut self, position: AdPosition) -> Self {
        self.ad_position = position;
        self
    }

    /// Add a product category.
    pub fn product_category(mut self, category: impl Into<String>) -> Self {
        self.product_categories.push(category.into());
        self
    }

    /// Set the detected car brand.
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the detected car model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the part condition.
    pub fn part_condition(mut self, condition: impl Into<String>) -> Self {
        self.part_condition = Some(condition.into());
        self
    }

    /// Validate and normalize into an [`AdData`].
    ///
    /// Fails with [`ScraperError::InvalidRecord`] for empty required fields
    /// and [`ScraperError::Url`]/[`ScraperError::InvalidRecord`] for a
    /// malformed landing URL.
    pub fn build(self) -> Result<AdData, ScraperError> {
        let keyword = self.keyword.trim().to_string();
        let location = self.location.trim().to_string();
        let website_url = self.website_url.trim().to_string();
        let title = self.title.trim().to_string();

        if keyword.is_empty() {
            return Err(ScraperError::InvalidRecord("keyword cannot be empty".into()));
        }
        if location.is_empty() {
            return Err(ScraperError::InvalidRecord("location cannot be empty".into()));
        }
        if website_url.is_empty() {
            return Err(ScraperError::InvalidRecord(
                "website_url cannot be empty".into(),
            ));
        }
        if title.is_empty() {
            return Err(ScraperError::InvalidRecord("title cannot be empty".into()));
        }
        AdData::validate_url(&website_url)?;

        Ok(AdData {
            keyword,
            location,
            website_url,
            title,
            description: self.description.map(|d| d.trim().to_string()),
            phone_number: self
                .phone_number
                .map(|p| AdData::clean_phone_number(&p)),
            price: self.price,
            email: self.email.map(|e| e.trim().to_lowercase()),
            social_links: self.social_links,
            meta_tags: self.meta_tags,
            ad_position: self.ad_position,
            scraped_at: OffsetDateTime::now_utc(),
            product_categories: self.product_categories,
            brand: self.brand,
            model: self.model,
            part_condition: self.part_condition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> AdDataBuilder {
        AdData::builder(
            "mercedes engine parts",
            "Germany",
            "https://example.com/parts",
            "OEM Mercedes Parts",
        )
    }

    #[test]
    fn test_build_minimal_record() {
        let ad = builder().build().unwrap();
        assert_eq!(ad.keyword, "mercedes engine parts");
        assert_eq!(ad.ad_position, AdPosition::Unknown);
        assert!(ad.social_links.is_empty());
    }

    #[test]
    fn test_required_fields_rejected_when_empty() {
        let result = AdData::builder("", "Germany", "https://example.com", "Title").build();
        assert!(matches!(result, Err(ScraperError::InvalidRecord(_))));

        let result = AdData::builder("kw", "Germany", "   ", "Title").build();
        assert!(matches!(result, Err(ScraperError::InvalidRecord(_))));
    }

    #[test]
    fn test_url_validation() {
        let result = AdData::builder("kw", "UK", "not-a-url", "Title").build();
        assert!(matches!(result, Err(ScraperError::Url(_))));

        let result = AdData::builder("kw", "UK", "ftp://example.com", "Title").build();
        assert!(matches!(result, Err(ScraperError::InvalidRecord(_))));
    }

    #[test]
    fn test_normalization() {
        let ad = builder()
            .email("  Sales@Example.COM ")
            .phone_number("+49 (0) 30 1234-567")
            .description("  Quality parts  ")
            .build()
            .unwrap();

        assert_eq!(ad.email.as_deref(), Some("sales@example.com"));
        assert_eq!(ad.phone_number.as_deref(), Some("490301234567"));
        assert_eq!(ad.description.as_deref(), Some("Quality parts"));
    }

    #[test]
    fn test_clean_phone_number_without_digits() {
        assert_eq!(AdData::clean_phone_number("call us"), "call us");
        assert_eq!(AdData::clean_phone_number("030-123"), "030123");
    }

    #[test]
    fn test_position_from_index() {
        assert_eq!(AdPosition::from_index(1), AdPosition::Top);
        assert_eq!(AdPosition::from_index(2), AdPosition::Sidebar);
        assert_eq!(AdPosition::from_index(3), AdPosition::Bottom);
        assert_eq!(AdPosition::from_index(7), AdPosition::Unknown);
    }

    #[test]
    fn test_serde_round_trip() {
        let ad = builder()
            .ad_position(AdPosition::Top)
            .brand("Mercedes")
            .social_link("facebook", "https://facebook.com/parts")
            .build()
            .unwrap();

        let json = serde_json::to_string(&ad).unwrap();
        let parsed: AdData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ad);
    }
}
