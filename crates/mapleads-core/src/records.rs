use serde::{Deserialize, Serialize};

/// Business category searched on every run.
pub const DEFAULT_CATEGORY: &str = "Dentist";

/// Column headers of the persisted lead file, in [`BusinessRecord`] field order.
pub const RECORD_HEADERS: [&str; 5] = [
    "Business Name",
    "Phone Number",
    "Website URL",
    "Rating",
    "Review Count",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    category: String,
    city: String,
}

impl SearchQuery {
    #[must_use]
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            city: city.into(),
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Text typed into the map search box, e.g. `"Dentist in Istanbul"`.
    #[must_use]
    pub fn search_text(&self) -> String {
        format!("{} in {}", self.category, self.city.trim())
    }
}

/// One extracted business listing.
///
/// Every field is a plain string; a value that could not be resolved is the
/// empty string. An empty `review_count` means "unknown", never zero reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    #[serde(rename = "Business Name")]
    pub name: String,
    #[serde(rename = "Phone Number")]
    pub phone: String,
    #[serde(rename = "Website URL")]
    pub website: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Review Count")]
    pub review_count: String,
}

/// Destination for the records of one run.
///
/// Implementations receive the complete record set once, after extraction
/// has finished, and either persist all of it or fail.
pub trait RecordSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persists `records` and returns how many rows were written.
    ///
    /// # Errors
    ///
    /// Returns the sink's error type if the records cannot be persisted.
    fn write_all(&mut self, records: &[BusinessRecord]) -> Result<usize, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_combines_category_and_city() {
        let query = SearchQuery::new("Izmir ");
        assert_eq!(query.category(), "Dentist");
        assert_eq!(query.search_text(), "Dentist in Izmir");
    }

    #[test]
    fn default_record_has_only_empty_fields() {
        let record = BusinessRecord::default();
        assert!(record.name.is_empty());
        assert!(record.phone.is_empty());
        assert!(record.website.is_empty());
        assert!(record.rating.is_empty());
        assert!(record.review_count.is_empty());
    }
}
