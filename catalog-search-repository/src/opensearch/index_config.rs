//! OpenSearch index configuration and mappings.
//!
//! This module defines the analyzers and mappings for the product catalog index.

use serde_json::{json, Value};

/// Default name of the catalog index.
pub const DEFAULT_INDEX_NAME: &str = "catalog_products";

/// Identifies the index a client operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Index name.
    pub name: String,
}

impl IndexConfig {
    /// Create a config for the given index name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

/// Mapping shared by the searchable text fields.
///
/// The main field is analyzed with `default_analyzer`. `autocomplete` holds
/// edge n-grams of the whole value for prefix matching, and `keyword` keeps
/// the raw value for exact lookups and aggregations.
fn text_field_mapping() -> Value {
    json!({
        "type": "text",
        "analyzer": "default_analyzer",
        "fields": {
            "autocomplete": {
                "type": "text",
                "analyzer": "autocomplete_analyzer"
            },
            "keyword": {
                "type": "keyword",
                "ignore_above": 256
            }
        }
    })
}

/// Get the index settings and mappings for the catalog index.
///
/// Only analyzers and filters built into OpenSearch are used, so the index
/// can be created on a stock cluster without plugins:
/// - **default_analyzer**: standard tokens, lowercased, English stopwords and
///   snowball stemming, with HTML stripped first
/// - **autocomplete_analyzer**: the whole value lowercased and split into
///   edge n-grams of 1 to 20 letters
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 0 replicas (single node)
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0,
            "analysis": {
                "analyzer": {
                    "default_analyzer": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "stop", "snowball"],
                        "char_filter": ["html_strip"]
                    },
                    "autocomplete_analyzer": {
                        "type": "custom",
                        "tokenizer": "keyword",
                        "filter": ["lowercase", "edge_ngram_filter"]
                    }
                },
                "filter": {
                    "edge_ngram_filter": {
                        "type": "edge_ngram",
                        "min_gram": 1,
                        "max_gram": 20,
                        "token_chars": ["letter"]
                    },
                    // Russian needs a plugin on most clusters
                    "stop": {
                        "type": "stop",
                        "stopwords": "_english_"
                    },
                    "snowball": {
                        "type": "snowball",
                        "language": "English"
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "name": text_field_mapping(),
                "brand": text_field_mapping(),
                "category": text_field_mapping(),
                "price": {
                    "type": "double"
                },
                "url": {
                    "type": "keyword"
                },
                "store": {
                    "type": "keyword"
                }
            }
        }
    })
}
