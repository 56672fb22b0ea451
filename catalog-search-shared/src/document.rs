//! Product document type.

use std::collections::BTreeMap;
use std::num::ParseFloatError;

use serde::{Deserialize, Deserializer, Serialize};

/// Fields returned in `_source` by catalog searches.
pub const PRODUCT_SOURCE_FIELDS: [&str; 6] = ["name", "brand", "category", "price", "url", "store"];

/// A product as stored in the catalog index.
///
/// The known catalog fields are typed. Any other tag found in the source
/// catalog is carried in `extra` and indexed as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    /// Product display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Brand or manufacturer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Catalog category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Price in the store's currency.
    ///
    /// Indexed prices may be stored as text; those are read back as numbers
    /// when they parse, and as `None` otherwise.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_price"
    )]
    pub price: Option<f64>,

    /// Product page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Store the product is sold in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,

    /// Tags without a dedicated field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ProductDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field by its catalog tag name.
    ///
    /// `price` must parse as a number; on error the document is left unchanged.
    pub fn set_field(&mut self, tag: &str, value: impl Into<String>) -> Result<(), ParseFloatError> {
        let value = value.into();
        match tag {
            "name" => self.name = Some(value),
            "brand" => self.brand = Some(value),
            "category" => self.category = Some(value),
            "price" => self.price = Some(value.trim().parse::<f64>()?),
            "url" => self.url = Some(value),
            "store" => self.store = Some(value),
            _ => {
                self.extra.insert(tag.to_string(), value);
            }
        }
        Ok(())
    }

    /// Set the product name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Check whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.url.is_none()
            && self.store.is_none()
            && self.extra.is_empty()
    }
}

/// Accept a price as a JSON number or as numeric text.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Price>::deserialize(deserializer)? {
        Some(Price::Number(value)) => Some(value),
        Some(Price::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}
