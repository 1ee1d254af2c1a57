//! Downloadable CSV template with the column layout the importer documents.

/// File name offered for the template download.
pub const TEMPLATE_FILE_NAME: &str = "reviewdb_reviews_template.csv";

/// Header row plus two example rows: one tied to a product with media and a
/// reply, one store-level review with no product.
pub const TEMPLATE_CSV: &str = "\
product_url,rating,review_text,customer_name,email,picture_urls,reply,date
https://yourstore.com/products/black-t-shirt,5,I love this quality!,John Doe,john@example.com,https://link-to-image.jpg,Thanks John!,2023-10-25
,5,Great shop overall!,Jane Smith,jane@example.com,,,2023-10-26";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderMap;
    use crate::normalize::{normalize_grid, NormalizeOptions};
    use crate::tokenize::tokenize;

    #[test]
    fn every_template_column_is_recognized() {
        let grid = tokenize(TEMPLATE_CSV);
        let headers = HeaderMap::from_header_row(grid.header().unwrap());
        assert!(headers.unmapped().is_empty(), "{:?}", headers.unmapped());
    }

    #[test]
    fn template_rows_import_cleanly() {
        let outcome = normalize_grid(&tokenize(TEMPLATE_CSV), &NormalizeOptions::default());
        assert_eq!(outcome.reviews.len(), 2);
        assert_eq!(outcome.skipped_count(), 0);
        assert!(outcome.reviews[0].is_complex());
        assert!(!outcome.reviews[1].is_complex());
        assert_eq!(outcome.reviews[1].body, "Great shop overall!");
    }
}
