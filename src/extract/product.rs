//! Listing product-card extractor
//!
//! Field locators follow the listing's `data-testid` and class conventions.
//! Brand and name are mandatory; every other field is looked up on its own
//! and falls back to the sentinel when its node or nested structure is missing.

use super::normalize::{join_promotions, normalize_rating_count, normalize_rating_score};
use super::{ExtractError, FieldExtractor, ProductRecord, RawFragment, NOT_AVAILABLE};
use scraper::{ElementRef, Html, Selector};

const BRAND: &str = r#"span[data-testid="product-brand"]"#;
const NAME: &str = r#"span[data-testid="product-name-text"]"#;
const PRICE: &str = "p.selling-price";
const CART_COUNT: &str = r#"div[data-testid="social-proof-content-basketCount"]"#;
const FAVORITE_COUNT: &str = r#"div[data-testid="social-proof-content-favoriteCount"]"#;
const COUNTER_VALUE: &str = "span";
const RATING_SCORE: &str = "div.p-rating-full";
const RATING_COUNT: &str = "span.p-total-rating-count";
const PROMOTION: &str = "div.promotion";
const PROMOTION_NAME: &str = "span.promotion-name";

/// Record-shape options
#[derive(Debug, Clone, Copy)]
pub struct ExtractorOptions {
    /// Prefix the name with the brand (`"<brand> <name>"`), as the legacy
    /// listing schema did; the brand column is filled either way
    pub merge_brand_into_name: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            merge_brand_into_name: true,
        }
    }
}

struct Selectors {
    brand: Selector,
    name: Selector,
    price: Selector,
    cart_count: Selector,
    favorite_count: Selector,
    counter_value: Selector,
    rating_score: Selector,
    rating_count: Selector,
    promotion: Selector,
    promotion_name: Selector,
}

impl Selectors {
    fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            brand: compile(BRAND)?,
            name: compile(NAME)?,
            price: compile(PRICE)?,
            cart_count: compile(CART_COUNT)?,
            favorite_count: compile(FAVORITE_COUNT)?,
            counter_value: compile(COUNTER_VALUE)?,
            rating_score: compile(RATING_SCORE)?,
            rating_count: compile(RATING_COUNT)?,
            promotion: compile(PROMOTION)?,
            promotion_name: compile(PROMOTION_NAME)?,
        })
    }
}

/// Compiles a CSS selector, mapping the parser error to [`ExtractError`]
pub(crate) fn compile(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts [`ProductRecord`]s from listing product cards
pub struct ProductExtractor {
    selectors: Selectors,
    options: ExtractorOptions,
}

impl ProductExtractor {
    /// Creates an extractor, compiling all field selectors once
    pub fn new(options: ExtractorOptions) -> Result<Self, ExtractError> {
        Ok(Self {
            selectors: Selectors::compile()?,
            options,
        })
    }

    /// Extracts one record, reporting why a fragment was rejected
    pub fn try_extract(&self, fragment: &RawFragment) -> Result<ProductRecord, ExtractError> {
        if fragment.html().trim().is_empty() {
            return Err(ExtractError::Malformed("empty fragment".to_string()));
        }

        let document = Html::parse_fragment(fragment.html());
        let root = document.root_element();
        let s = &self.selectors;

        let brand = first(root, &s.brand)
            .map(text_of)
            .ok_or(ExtractError::MissingField("brand"))?;
        let name = first(root, &s.name)
            .map(text_of)
            .ok_or(ExtractError::MissingField("name"))?;

        let name = if self.options.merge_brand_into_name && !brand.is_empty() {
            format!("{} {}", brand, name)
        } else {
            name
        };
        let brand = if brand.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            brand
        };

        let promotions: Vec<String> = root
            .select(&s.promotion)
            .filter_map(|block| first(block, &s.promotion_name))
            .map(text_of)
            .collect();

        Ok(ProductRecord {
            name,
            brand,
            price: first(root, &s.price).map(text_of).unwrap_or_else(sentinel),
            cart_count: self.counter(root, &s.cart_count),
            favorite_count: self.counter(root, &s.favorite_count),
            rating_score: normalize_rating_score(
                first(root, &s.rating_score).and_then(|e| e.value().attr("style")),
            ),
            rating_count: first(root, &s.rating_count)
                .map(|e| normalize_rating_count(&text_of(e)))
                .unwrap_or_else(sentinel),
            promotions: join_promotions(&promotions),
        })
    }

    /// Social-proof counters keep their value in a nested span
    fn counter(&self, root: ElementRef<'_>, container: &Selector) -> String {
        first(root, container)
            .and_then(|block| first(block, &self.selectors.counter_value))
            .map(text_of)
            .unwrap_or_else(sentinel)
    }
}

impl FieldExtractor for ProductExtractor {
    fn extract(&self, fragment: &RawFragment) -> Option<ProductRecord> {
        match self.try_extract(fragment) {
            Ok(record) => Some(record),
            Err(ExtractError::MissingField(field)) => {
                tracing::debug!("Skipping fragment without {}", field);
                None
            }
            Err(e) => {
                tracing::warn!("Error extracting data for a product: {}", e);
                None
            }
        }
    }
}

fn first<'a>(root: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    root.select(selector).next()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn sentinel() -> String {
    NOT_AVAILABLE.to_string()
}
