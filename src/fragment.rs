use scraper::{Html, Selector};
use tracing::warn;

/// Inner markup of the first element matching `selector` in a full HTML
/// page, or `None` when the page has no such element.
pub fn extract_region(page: &str, selector: &str) -> Option<String> {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(err) => {
            warn!("invalid region selector `{selector}`: {err:?}");
            return None;
        }
    };

    let document = Html::parse_document(page);
    document
        .select(&selector)
        .next()
        .map(|region| region.inner_html())
}
