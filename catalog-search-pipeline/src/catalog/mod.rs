//! Catalog module for the setup pipeline.
//!
//! Reads products from the XML catalog. The expected layout is a single root
//! element whose `<product>` children each hold one element per field:
//!
//! ```xml
//! <catalog>
//!   <product>
//!     <name>Молоко 3.2%</name>
//!     <brand>Простоквашино</brand>
//!     <price>89.90</price>
//!   </product>
//! </catalog>
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::{info, instrument, warn};

use catalog_search_shared::ProductDocument;

/// Tag of the elements holding one product each.
const PRODUCT_TAG: &[u8] = b"product";

/// Errors that can occur while reading the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file does not exist.
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not well-formed XML.
    #[error("Failed to parse catalog XML: {0}")]
    Parse(String),

    /// The catalog holds no products.
    #[error("Catalog contains no products")]
    Empty,
}

impl CatalogError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Field currently being read: its tag and the text collected so far.
struct OpenField {
    tag: String,
    text: String,
}

/// Parse the products out of a catalog document.
///
/// Every direct `<product>` child of the root becomes one document, with one
/// field per child element. Elements without text are left out, as are
/// prices that are not numbers. Other children of the root are ignored.
pub fn parse_catalog(xml: &str) -> Result<Vec<ProductDocument>, CatalogError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut products = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut product: Option<ProductDocument> = None;
    let mut field: Option<OpenField> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            CatalogError::parse(format!("at position {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => {
                        if seen_root {
                            return Err(CatalogError::parse("more than one root element"));
                        }
                        seen_root = true;
                    }
                    2 if e.name().as_ref() == PRODUCT_TAG => {
                        product = Some(ProductDocument::new());
                    }
                    3 if product.is_some() => {
                        field = Some(OpenField {
                            tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                            text: String::new(),
                        });
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => match depth + 1 {
                1 => {
                    if seen_root {
                        return Err(CatalogError::parse("more than one root element"));
                    }
                    seen_root = true;
                }
                2 if e.name().as_ref() == PRODUCT_TAG => {
                    products.push(ProductDocument::new());
                }
                _ => {}
            },
            Event::Text(e) if depth == 3 => {
                if let Some(open) = field.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| CatalogError::parse(e.to_string()))?;
                    open.text.push_str(&text);
                }
            }
            Event::CData(e) if depth == 3 => {
                if let Some(open) = field.as_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let (Some(doc), Some(open)) = (product.as_mut(), field.take()) {
                            if !open.text.is_empty() {
                                if let Err(e) = doc.set_field(&open.tag, open.text.as_str()) {
                                    warn!(
                                        field = %open.tag,
                                        value = %open.text,
                                        error = %e,
                                        "Dropping field with invalid number"
                                    );
                                }
                            }
                        }
                    }
                    2 => {
                        if let Some(doc) = product.take() {
                            products.push(doc);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(CatalogError::parse("no element found"));
    }
    if depth != 0 {
        return Err(CatalogError::parse("unexpected end of document"));
    }

    Ok(products)
}

/// Read and parse the catalog file at `path`.
///
/// A catalog without products is an error: there would be nothing to index.
#[instrument]
pub async fn read_catalog(path: &Path) -> Result<Vec<ProductDocument>, CatalogError> {
    info!("Reading catalog");

    let xml = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            CatalogError::NotFound(path.to_path_buf())
        } else {
            CatalogError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let products = parse_catalog(&xml)?;
    if products.is_empty() {
        return Err(CatalogError::Empty);
    }

    info!(count = products.len(), "Catalog read");
    Ok(products)
}
