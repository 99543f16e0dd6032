//! Font metric databases.
//!
//! A database is one JSON document with a table per array:
//!
//! ```json
//! {
//!   "font_info":     [{ "font_id": 1, "name": "sans", "pages": 1, ... }],
//!   "font_glyphs":   [{ "font_id": 1, "code": 65, "page": 0, "frame_x": 2.0, ... }],
//!   "font_kernings": [{ "font_id": 1, "first_code": 65, "second_code": 86, "amount": -1.5 }],
//!   "font_pages":    [{ "font_id": 1, "page": 0, "material": "fonts/sans_0" }]
//! }
//! ```
//!
//! Rows reference their font through `font_id`, so one database can hold
//! several fonts.

use serde::de::Error as _;
use serde::Deserialize;

/// Upper bound on a font's page count.
pub const MAX_FONT_PAGES: u32 = 256;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontInfoRow {
    pub font_id:      i64,
    pub name:         String,
    pub pages:        u32,
    #[serde(default)]
    pub num_glyphs:   u32,
    #[serde(default)]
    pub num_kernings: u32,
    pub line_height:  f32,
    #[serde(default)]
    pub leading:      f32,
    pub ascent:       f32,
    pub descent:      f32,
    pub page_width:   u32,
    pub page_height:  u32,
    #[serde(default)]
    pub bbox_min_x:   f32,
    #[serde(default)]
    pub bbox_max_x:   f32,
    #[serde(default)]
    pub bbox_min_y:   f32,
    #[serde(default)]
    pub bbox_max_y:   f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GlyphRow {
    pub font_id:      i64,
    pub code:         u32,
    /// Negative for glyphs with nothing to draw (spaces).
    pub page:         i32,
    pub frame_x:      f32,
    pub frame_y:      f32,
    pub frame_width:  f32,
    pub frame_height: f32,
    pub advance_x:    f32,
    #[serde(default)]
    pub advance_y:    f32,
    #[serde(default)]
    pub offset_x:     f32,
    #[serde(default)]
    pub offset_y:     f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KerningRow {
    pub font_id:     i64,
    pub first_code:  u32,
    pub second_code: u32,
    pub amount:      f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageRow {
    pub font_id:  i64,
    pub page:     u32,
    pub material: String,
}

/// One parsed font database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontDatabase {
    #[serde(default)]
    font_info:     Vec<FontInfoRow>,
    #[serde(default)]
    font_glyphs:   Vec<GlyphRow>,
    #[serde(default)]
    font_kernings: Vec<KerningRow>,
    #[serde(default)]
    font_pages:    Vec<PageRow>,
}

impl FontDatabase {
    /// Parses a database and checks that page numbers stay within each
    /// font's declared page count.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let db: Self = serde_json::from_slice(bytes)?;
        db.check_pages()?;
        Ok(db)
    }

    fn check_pages(&self) -> serde_json::Result<()> {
        for info in &self.font_info {
            if info.pages > MAX_FONT_PAGES {
                return Err(serde_json::Error::custom(format!(
                    "font '{}' declares {} pages, at most {MAX_FONT_PAGES} are supported",
                    info.name, info.pages
                )));
            }
        }
        for row in &self.font_pages {
            let Some(info) = self.font_info.iter().find(|info| info.font_id == row.font_id) else {
                continue;
            };
            if row.page >= info.pages {
                return Err(serde_json::Error::custom(format!(
                    "font '{}' has {} pages but lists a material for page {}",
                    info.name, info.pages, row.page
                )));
            }
        }
        Ok(())
    }

    pub fn font_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.font_info.iter().map(|row| row.name.as_str())
    }

    /// First info row with this name.
    pub fn font_info(&self, name: &str) -> Option<&FontInfoRow> {
        self.font_info.iter().find(|row| row.name == name)
    }

    pub fn glyphs(&self, font_id: i64) -> impl Iterator<Item = &GlyphRow> + '_ {
        self.font_glyphs.iter().filter(move |row| row.font_id == font_id)
    }

    pub fn kernings(&self, font_id: i64) -> impl Iterator<Item = &KerningRow> + '_ {
        self.font_kernings.iter().filter(move |row| row.font_id == font_id)
    }

    pub fn pages(&self, font_id: i64) -> impl Iterator<Item = &PageRow> + '_ {
        self.font_pages.iter().filter(move |row| row.font_id == font_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SANS: &str = r#"{
        "font_info": [
            { "font_id": 1, "name": "sans", "pages": 1, "line_height": 20, "leading": 2,
              "ascent": 16, "descent": -4, "page_width": 256, "page_height": 128 },
            { "font_id": 2, "name": "mono", "pages": 1, "line_height": 18,
              "ascent": 14, "descent": -4, "page_width": 64, "page_height": 64 }
        ],
        "font_glyphs": [
            { "font_id": 1, "code": 65, "page": 0, "frame_x": 10.5, "frame_y": 4.2,
              "frame_width": 8.0, "frame_height": 12.1, "advance_x": 9, "offset_x": 1, "offset_y": 2 },
            { "font_id": 1, "code": 32, "page": -1, "frame_x": 0, "frame_y": 0,
              "frame_width": 0, "frame_height": 0, "advance_x": 5 },
            { "font_id": 2, "code": 65, "page": 0, "frame_x": 0, "frame_y": 0,
              "frame_width": 8, "frame_height": 8, "advance_x": 8 }
        ],
        "font_kernings": [
            { "font_id": 1, "first_code": 65, "second_code": 65, "amount": -1.5 }
        ],
        "font_pages": [
            { "font_id": 1, "page": 0, "material": "fonts/sans_0" }
        ]
    }"#;

    #[test]
    fn queries_by_font() {
        let db = FontDatabase::from_slice(SANS.as_bytes()).unwrap();
        assert_eq!(db.font_names().collect::<Vec<_>>(), ["sans", "mono"]);
        let info = db.font_info("sans").unwrap();
        assert_eq!(info.page_width, 256);
        assert_eq!(db.glyphs(info.font_id).count(), 2);
        assert_eq!(db.kernings(info.font_id).count(), 1);
        assert_eq!(db.pages(2).count(), 0);
        assert!(db.font_info("serif").is_none());
    }

    #[test]
    fn empty_document() {
        let db = FontDatabase::from_slice(b"{}").unwrap();
        assert_eq!(db.font_names().count(), 0);
    }

    #[test]
    fn rejects_missing_columns() {
        assert!(FontDatabase::from_slice(br#"{ "font_info": [{ "name": "x" }] }"#).is_err());
    }

    #[test]
    fn rejects_page_past_count() {
        let json = SANS.replace(r#""page": 0, "material""#, r#""page": 4000000000, "material""#);
        let err = FontDatabase::from_slice(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("page 4000000000"));
    }

    #[test]
    fn rejects_huge_page_count() {
        let json = SANS.replace(r#""pages": 1, "line_height": 20"#, r#""pages": 4000000000, "line_height": 20"#);
        assert!(FontDatabase::from_slice(json.as_bytes()).is_err());
    }
}
