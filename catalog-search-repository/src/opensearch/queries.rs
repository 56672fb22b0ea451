//! OpenSearch query builders.
//!
//! This module builds the catalog prefix query from a `SearchQuery`.

use serde_json::{json, Value};

use catalog_search_shared::{SearchQuery, PRODUCT_SOURCE_FIELDS};

/// Fields carrying edge n-grams of the whole value.
const AUTOCOMPLETE_FIELDS: [&str; 3] = [
    "name.autocomplete",
    "brand.autocomplete",
    "category.autocomplete",
];

/// Fields analyzed with the default analyzer.
const TEXT_FIELDS: [&str; 3] = ["name", "brand", "category"];

/// Build an OpenSearch query from a SearchQuery.
///
/// Either clause may match:
/// - `multi_match` over the autocomplete sub-fields with AUTO fuzziness, so a
///   prefix with a typo still hits; the first character must match exactly
/// - `multi_match` over the analyzed fields, for whole words
///
/// Only the product fields are returned in `_source`.
pub fn build_search_query(query: &SearchQuery) -> Value {
    json!({
        "query": {
            "bool": {
                "should": [
                    {
                        "multi_match": {
                            "query": query.prefix,
                            "fields": AUTOCOMPLETE_FIELDS,
                            "type": "best_fields",
                            "fuzziness": "AUTO",
                            "prefix_length": 1
                        }
                    },
                    {
                        "multi_match": {
                            "query": query.prefix,
                            "fields": TEXT_FIELDS,
                            "type": "best_fields"
                        }
                    }
                ]
            }
        },
        "size": query.top_k,
        "_source": PRODUCT_SOURCE_FIELDS
    })
}
