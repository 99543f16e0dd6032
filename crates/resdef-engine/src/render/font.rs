use std::collections::HashMap;

use crate::fontdb::{FontDatabase, MAX_FONT_PAGES};
use crate::handle::Handle;

use super::pass::Material;

/// One glyph's placement on its page.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Page index, negative when there is nothing to draw.
    pub page:    i32,
    /// Frame size in pixels, rounded outward to whole pixels.
    pub size:    [f32; 2],
    pub uv_min:  [f32; 2],
    pub uv_max:  [f32; 2],
    pub advance: [f32; 2],
    pub offset:  [f32; 2],
}

/// A textured quad produced by [`Font::layout_text`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub page:   usize,
    pub pos:    [f32; 2],
    pub size:   [f32; 2],
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

/// Bitmap font metrics and glyph pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    name:        String,
    line_height: f32,
    leading:     f32,
    ascent:      f32,
    descent:     f32,
    bbox_min:    [f32; 2],
    bbox_max:    [f32; 2],
    page_size:   [u32; 2],
    glyphs:      HashMap<u32, Glyph>,
    kerns:       HashMap<(u32, u32), f32>,
    pages:       Vec<Option<Handle<Material>>>,
    page_names:  Vec<Option<String>>,
}

impl Font {
    /// Reads `name`'s metrics, glyphs and kernings. Page materials are not
    /// loaded; see [`Font::page_material_name`].
    pub fn from_database(db: &FontDatabase, name: &str) -> Option<Self> {
        let info = db.font_info(name)?;
        let scale = [
            1.0 / info.page_width.max(1) as f32,
            1.0 / info.page_height.max(1) as f32,
        ];

        let glyphs = db
            .glyphs(info.font_id)
            .map(|row| {
                let min = [row.frame_x.floor(), row.frame_y.floor()];
                let max = [
                    (row.frame_x + row.frame_width).ceil(),
                    (row.frame_y + row.frame_height).ceil(),
                ];
                // Flip to bottom-up texture space; the flip swaps which
                // corner holds the smaller v.
                let glyph = Glyph {
                    page:    row.page,
                    size:    [max[0] - min[0], max[1] - min[1]],
                    uv_min:  [min[0] * scale[0], 1.0 - max[1] * scale[1]],
                    uv_max:  [max[0] * scale[0], 1.0 - min[1] * scale[1]],
                    advance: [row.advance_x, row.advance_y],
                    offset:  [row.offset_x, row.offset_y],
                };
                (row.code, glyph)
            })
            .collect();

        let kerns = db
            .kernings(info.font_id)
            .map(|row| ((row.first_code, row.second_code), row.amount))
            .collect();

        let mut page_names = vec![None; info.pages.min(MAX_FONT_PAGES) as usize];
        for row in db.pages(info.font_id) {
            match page_names.get_mut(row.page as usize) {
                Some(slot) => *slot = Some(row.material.clone()),
                None => log::warn!("font '{name}': ignoring material for out-of-range page {}", row.page),
            }
        }

        Some(Self {
            name: name.to_string(),
            line_height: info.line_height,
            leading: info.leading,
            ascent: info.ascent,
            descent: info.descent,
            bbox_min: [info.bbox_min_x, info.bbox_min_y],
            bbox_max: [info.bbox_max_x, info.bbox_max_y],
            page_size: [info.page_width, info.page_height],
            glyphs,
            kerns,
            pages: vec![None; page_names.len()],
            page_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn leading(&self) -> f32 {
        self.leading
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn descent(&self) -> f32 {
        self.descent
    }

    pub fn bbox(&self) -> ([f32; 2], [f32; 2]) {
        (self.bbox_min, self.bbox_max)
    }

    pub fn page_size(&self) -> [u32; 2] {
        self.page_size
    }

    pub fn glyph(&self, code: u32) -> Option<&Glyph> {
        self.glyphs.get(&code)
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Horizontal adjustment between two consecutive characters.
    pub fn kern_for(&self, first: u32, second: u32) -> f32 {
        self.kerns.get(&(first, second)).copied().unwrap_or(0.0)
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// Material name the database assigns to `page`.
    pub fn page_material_name(&self, page: usize) -> Option<&str> {
        self.page_names.get(page)?.as_deref()
    }

    pub fn page(&self, page: usize) -> Option<Handle<Material>> {
        self.pages.get(page).copied().flatten()
    }

    /// Sets a page's material, growing the page list if needed. Returns the
    /// handle it replaced.
    pub fn set_page(&mut self, page: usize, material: Option<Handle<Material>>) -> Option<Handle<Material>> {
        if page >= self.pages.len() {
            self.pages.resize(page + 1, None);
        }
        std::mem::replace(&mut self.pages[page], material)
    }

    pub(crate) fn take_pages(&mut self) -> Vec<Handle<Material>> {
        self.pages.iter_mut().filter_map(Option::take).collect()
    }

    /// Lays `text` out starting at `baseline` (y up). Newlines move down one
    /// line height; characters without a glyph are skipped.
    pub fn layout_text(&self, baseline: [f32; 2], text: &str, scale: f32) -> Vec<GlyphQuad> {
        let mut quads = Vec::new();
        let mut line_start = [baseline[0], baseline[1] - self.ascent * scale];
        let mut pen = line_start;
        let mut last: Option<u32> = None;

        for ch in text.chars() {
            if ch == '\n' {
                line_start[1] -= self.line_height * scale;
                pen = line_start;
                last = None;
                continue;
            }
            if ch < ' ' {
                continue;
            }
            let code = ch as u32;
            let Some(glyph) = self.glyphs.get(&code) else {
                continue;
            };

            if let Some(prev) = last {
                pen[0] += self.kern_for(prev, code) * scale;
            }
            if glyph.page >= 0 && glyph.size[0] * glyph.size[1] > 0.0 {
                quads.push(GlyphQuad {
                    page:   glyph.page as usize,
                    pos:    [pen[0] + glyph.offset[0] * scale, pen[1] + glyph.offset[1] * scale],
                    size:   [glyph.size[0] * scale, glyph.size[1] * scale],
                    uv_min: glyph.uv_min,
                    uv_max: glyph.uv_max,
                });
            }
            pen[0] += glyph.advance[0] * scale;
            pen[1] += glyph.advance[1] * scale;
            last = Some(code);
        }
        quads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fontdb::tests::SANS;

    fn sans() -> Font {
        let db = FontDatabase::from_slice(SANS.as_bytes()).unwrap();
        Font::from_database(&db, "sans").unwrap()
    }

    #[test]
    fn metrics() {
        let font = sans();
        assert_eq!(font.line_height(), 20.0);
        assert_eq!(font.ascent(), 16.0);
        assert_eq!(font.page_size(), [256, 128]);
        assert_eq!(font.num_glyphs(), 2);
        assert_eq!(font.num_pages(), 1);
        assert_eq!(font.page_material_name(0), Some("fonts/sans_0"));
    }

    #[test]
    fn glyph_frames_round_outward() {
        let font = sans();
        let a = font.glyph('A' as u32).unwrap();
        // frame 10.5,4.2 + 8x12.1 → pixels 10..19, 4..17
        assert_eq!(a.size, [9.0, 13.0]);
        assert_eq!(a.uv_min, [10.0 / 256.0, 1.0 - 17.0 / 128.0]);
        assert_eq!(a.uv_max, [19.0 / 256.0, 1.0 - 4.0 / 128.0]);
        assert!(a.uv_min[1] < a.uv_max[1]);
    }

    #[test]
    fn kerning() {
        let font = sans();
        assert_eq!(font.kern_for('A' as u32, 'A' as u32), -1.5);
        assert_eq!(font.kern_for('A' as u32, ' ' as u32), 0.0);
    }

    #[test]
    fn layout_applies_kerning_and_newlines() {
        let font = sans();
        let quads = font.layout_text([0.0, 100.0], "A A\nAA?", 1.0);
        // spaces and unknown glyphs produce no quads
        assert_eq!(quads.len(), 4);
        assert_eq!(quads[0].pos, [1.0, 86.0]);
        assert_eq!(quads[1].pos, [15.0, 86.0]);
        assert_eq!(quads[2].pos, [1.0, 66.0]);
        assert_eq!(quads[3].pos, [8.5, 66.0]);
    }

    #[test]
    fn unknown_font() {
        let db = FontDatabase::from_slice(SANS.as_bytes()).unwrap();
        assert!(Font::from_database(&db, "serif").is_none());
    }

    #[test]
    fn pages_grow_on_set() {
        let mut font = sans();
        let h = Handle::new(crate::handle::RawHandle { index: 3, generation: 1 });
        assert_eq!(font.set_page(2, Some(h)), None);
        assert_eq!(font.num_pages(), 3);
        assert_eq!(font.page(2), Some(h));
        assert_eq!(font.take_pages(), [h]);
        assert_eq!(font.page(2), None);
    }
}
