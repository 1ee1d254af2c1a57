//! Header normalization and the synonym table that maps arbitrary export
//! column names onto review fields.

use serde::Serialize;

/// Review field a CSV column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTag {
    Rating,
    Body,
    CustomerName,
    Email,
    Title,
    Date,
    Reply,
    MediaUrls,
    /// Explicit catalog id (numeric or `gid://`).
    ProductId,
    /// Handle, product URL, or product title; classified per value.
    ProductIdentifier,
}

/// Known header spellings after [`normalize_header`], per field.
pub const SYNONYMS: &[(FieldTag, &[&str])] = &[
    (
        FieldTag::Rating,
        &["rating", "stars", "star", "score", "reviewrating", "reviewscore"],
    ),
    (
        FieldTag::Body,
        &[
            "body",
            "content",
            "review",
            "comment",
            "text",
            "reviews",
            "reviewtext",
            "reviewcontent",
            "reviewbody",
            "message",
        ],
    ),
    (
        FieldTag::CustomerName,
        &[
            "name",
            "author",
            "customer",
            "reviewer",
            "reviewername",
            "customername",
            "authorname",
        ],
    ),
    (
        FieldTag::Email,
        &["email", "revieweremail", "customeremail", "authoremail"],
    ),
    (
        FieldTag::Title,
        &["title", "reviewtitle", "headline", "subject"],
    ),
    (
        FieldTag::Date,
        &["date", "createdat", "reviewdate", "timestamp", "submittedat"],
    ),
    (
        FieldTag::Reply,
        &["reply", "response", "ownerreply", "storereply"],
    ),
    (
        FieldTag::MediaUrls,
        &["pictureurls", "images", "photos", "media", "imageurls", "photourls"],
    ),
    (FieldTag::ProductId, &["productid", "id", "shopifyproductid"]),
    (
        FieldTag::ProductIdentifier,
        &[
            "producthandle",
            "handle",
            "producturl",
            "product",
            "productlink",
            "productname",
            "producttitle",
        ],
    ),
];

/// Lowercases `raw` and drops every character outside `a-z0-9`.
///
/// `"Review Body"` → `"reviewbody"`, `"picture_urls"` → `"pictureurls"`.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Looks up a normalized header token in [`SYNONYMS`].
#[must_use]
pub fn tag_for(token: &str) -> Option<FieldTag> {
    SYNONYMS
        .iter()
        .find(|(_, aliases)| aliases.contains(&token))
        .map(|(tag, _)| *tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    /// Header text as it appeared in the file.
    pub raw: String,
    pub token: String,
    /// `None` for columns no synonym matched.
    pub tag: Option<FieldTag>,
}

/// Per-column field mapping built once from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: Vec<HeaderColumn>,
}

impl HeaderMap {
    #[must_use]
    pub fn from_header_row(row: &[String]) -> Self {
        let columns = row
            .iter()
            .map(|raw| {
                let token = normalize_header(raw);
                let tag = tag_for(&token);
                HeaderColumn {
                    raw: raw.trim().to_owned(),
                    token,
                    tag,
                }
            })
            .collect();
        Self { columns }
    }

    #[must_use]
    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    /// Normalized tokens in column order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.token.clone()).collect()
    }

    #[must_use]
    pub fn has_tag(&self, tag: FieldTag) -> bool {
        self.columns.iter().any(|c| c.tag == Some(tag))
    }

    /// Raw names of columns no synonym matched.
    #[must_use]
    pub fn unmapped(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.tag.is_none())
            .map(|c| c.raw.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn normalize_header_strips_case_and_punctuation() {
        assert_eq!(normalize_header("Review Body"), "reviewbody");
        assert_eq!(normalize_header("picture_urls"), "pictureurls");
        assert_eq!(normalize_header("  \"Created-At\" "), "createdat");
        assert_eq!(normalize_header("Stars (1-5)"), "stars15");
    }

    #[test]
    fn normalize_header_drops_byte_order_mark_and_non_ascii() {
        assert_eq!(normalize_header("\u{feff}rating"), "rating");
        assert_eq!(normalize_header("Évaluation"), "valuation");
    }

    #[test]
    fn every_synonym_is_already_normalized() {
        for (tag, aliases) in SYNONYMS {
            for alias in *aliases {
                assert_eq!(
                    normalize_header(alias),
                    *alias,
                    "alias {alias:?} for {tag:?} would never match"
                );
            }
        }
    }

    #[test]
    fn no_alias_maps_to_two_fields() {
        let mut seen = std::collections::HashSet::new();
        for (_, aliases) in SYNONYMS {
            for alias in *aliases {
                assert!(seen.insert(*alias), "duplicate alias {alias:?}");
            }
        }
    }

    #[test]
    fn tag_for_known_aliases() {
        assert_eq!(tag_for("stars"), Some(FieldTag::Rating));
        assert_eq!(tag_for("reviewtext"), Some(FieldTag::Body));
        assert_eq!(tag_for("customername"), Some(FieldTag::CustomerName));
        assert_eq!(tag_for("pictureurls"), Some(FieldTag::MediaUrls));
        assert_eq!(tag_for("producturl"), Some(FieldTag::ProductIdentifier));
        assert_eq!(tag_for("productid"), Some(FieldTag::ProductId));
        assert_eq!(tag_for("favouritecolour"), None);
    }

    #[test]
    fn header_map_tags_columns_in_order() {
        let map = HeaderMap::from_header_row(&header_row(&[
            "Product URL",
            "Rating",
            "Review Text",
            "Internal Notes",
        ]));
        let tags: Vec<Option<FieldTag>> = map.columns().iter().map(|c| c.tag).collect();
        assert_eq!(
            tags,
            vec![
                Some(FieldTag::ProductIdentifier),
                Some(FieldTag::Rating),
                Some(FieldTag::Body),
                None
            ]
        );
        assert_eq!(
            map.tokens(),
            vec!["producturl", "rating", "reviewtext", "internalnotes"]
        );
        assert_eq!(map.unmapped(), vec!["Internal Notes"]);
        assert!(map.has_tag(FieldTag::Body));
        assert!(!map.has_tag(FieldTag::Reply));
    }
}
