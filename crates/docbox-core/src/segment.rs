//! Segmentation of character telemetry into styled line-runs.
//!
//! The input is one page's worth of [`Glyph`] telemetry in the decoder's
//! native character order. Characters are filtered, converted to top-down
//! coordinates, tagged with an interned style, and then grouped into maximal
//! runs that share a style, sit on one line, and are separated by
//! intra-word-sized gaps. Each run becomes one [`BBox`].

use crate::glyph::Glyph;
use crate::intern::{FontTable, FontWeight, StyleTable};
use crate::model::BBox;

/// Fraction of the previous character's font size that separates intra-word
/// spacing from an inter-column gap.
const GAP_EM_FRACTION: f64 = 0.35;

/// Fraction of the run's line height tolerated as baseline jitter.
const LINE_JITTER_FRACTION: f64 = 0.5;

/// A filtered character in top-down coordinates, tagged with its style.
#[derive(Debug, Clone)]
struct StyledChar {
    ch: char,
    style_id: u32,
    font_size: f64,
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

fn is_skippable(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

fn same_line(first: &StyledChar, cur: &StyledChar) -> bool {
    let line_height = (first.bottom - first.top).max(first.font_size);
    (first.top - cur.top).abs() < line_height * LINE_JITTER_FRACTION
}

fn gap_ok(prev: &StyledChar, cur: &StyledChar) -> bool {
    cur.left - prev.right < prev.font_size * GAP_EM_FRACTION
}

/// Segment one page of glyph telemetry into bounding boxes.
///
/// `page_height` is the page height in points, used to convert the decoder's
/// bottom-up glyph boxes into top-down coordinates. Fonts and styles are
/// interned into the supplied tables in character order, so ids are
/// deterministic for a given input. Runs are emitted in character-scan order,
/// each trimmed of trailing ASCII space/tab; runs whose trimmed text is empty
/// produce nothing.
pub fn segment_page(
    page_height: f64,
    glyphs: &[Glyph],
    fonts: &mut FontTable,
    styles: &mut StyleTable,
    page_id: u32,
) -> Vec<BBox> {
    let mut chars = Vec::with_capacity(glyphs.len());
    for glyph in glyphs {
        if matches!(glyph.codepoint, 0 | 0xFFFE | 0xFFFF) {
            continue;
        }
        let Some(ch) = char::from_u32(glyph.codepoint) else {
            continue;
        };

        let font_id = fonts.intern(&glyph.font_name);
        let weight = if glyph.is_bold() {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        let style_id = styles.intern(
            font_id,
            glyph.font_size,
            &glyph.fill.to_css(),
            weight,
            glyph.is_italic(),
            false,
        );

        chars.push(StyledChar {
            ch,
            style_id,
            font_size: glyph.font_size,
            left: glyph.left,
            top: page_height - glyph.top,
            right: glyph.right,
            bottom: page_height - glyph.bottom,
        });
    }

    let mut bboxes = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let first = &chars[i];
        if is_skippable(first.ch) {
            i += 1;
            continue;
        }

        let mut left = first.left;
        let mut top = first.top;
        let mut right = first.right;
        let mut bottom = first.bottom;
        let mut text = String::new();
        text.push(first.ch);

        let mut j = i + 1;
        while j < chars.len() {
            let cur = &chars[j];
            if cur.style_id != first.style_id || !same_line(first, cur) {
                break;
            }
            if !gap_ok(&chars[j - 1], cur) {
                break;
            }
            text.push(cur.ch);
            left = left.min(cur.left);
            top = top.min(cur.top);
            right = right.max(cur.right);
            bottom = bottom.max(cur.bottom);
            j += 1;
        }

        while text.ends_with(' ') || text.ends_with('\t') {
            text.pop();
        }

        if !text.is_empty() {
            bboxes.push(BBox {
                page_id,
                style_id: first.style_id,
                x: left,
                y: top,
                w: right - left,
                h: bottom - top,
                text,
                formula: None,
            });
        }

        i = j;
    }

    bboxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    const PAGE_HEIGHT: f64 = 800.0;

    /// Helper: a 12pt black glyph with the given codepoint and bottom-up box.
    fn glyph(cp: char, left: f64, right: f64, bottom: f64, top: f64) -> Glyph {
        Glyph {
            codepoint: cp as u32,
            left,
            right,
            bottom,
            top,
            font_name: "Helvetica".to_string(),
            font_flags: 0,
            font_size: 12.0,
            fill: Rgba::black(),
        }
    }

    fn segment(glyphs: &[Glyph]) -> (Vec<BBox>, FontTable, StyleTable) {
        let mut fonts = FontTable::new();
        let mut styles = StyleTable::new();
        let bboxes = segment_page(PAGE_HEIGHT, glyphs, &mut fonts, &mut styles, 0);
        (bboxes, fonts, styles)
    }

    #[test]
    fn empty_telemetry_yields_nothing() {
        let (bboxes, fonts, styles) = segment(&[]);
        assert!(bboxes.is_empty());
        assert_eq!(fonts.len(), 0);
        assert_eq!(styles.len(), 0);
    }

    #[test]
    fn adjacent_chars_form_one_run() {
        // "Hi": boxes (10,20,700,720) and (21,31,700,720), page height 800.
        // Converted tops are 80, bottoms 100; the gap is 1.0 < 0.35 * 12.
        let glyphs = vec![
            glyph('H', 10.0, 20.0, 700.0, 720.0),
            glyph('i', 21.0, 31.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        let b = &bboxes[0];
        assert_eq!(b.text, "Hi");
        assert_eq!(b.x, 10.0);
        assert_eq!(b.y, 80.0);
        assert_eq!(b.w, 21.0);
        assert_eq!(b.h, 20.0);
        assert!(b.formula.is_none());
    }

    #[test]
    fn wide_gap_splits_runs() {
        // Second char at left=60: gap = 40 > 0.35 * 12.
        let glyphs = vec![
            glyph('H', 10.0, 20.0, 700.0, 720.0),
            glyph('i', 60.0, 70.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 2);
        assert_eq!(bboxes[0].text, "H");
        assert_eq!(bboxes[1].text, "i");
    }

    #[test]
    fn gap_threshold_scales_with_font_size() {
        // A 4-point gap is under the 12pt threshold (4.2) but over the
        // 10pt threshold (3.5).
        let mut small = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 24.0, 34.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&small);
        assert_eq!(bboxes.len(), 1, "4pt gap joins at 12pt");

        for g in &mut small {
            g.font_size = 10.0;
        }
        let (bboxes, _, _) = segment(&small);
        assert_eq!(bboxes.len(), 2, "4pt gap splits at 10pt");
    }

    #[test]
    fn different_line_splits_runs() {
        // Line height is 20; the second char sits 15 lower, past 0.5 * 20.
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 21.0, 31.0, 685.0, 705.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 2);
    }

    #[test]
    fn baseline_jitter_within_half_line_height_joins() {
        // 5 points of jitter against a 20-point line height.
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 21.0, 31.0, 695.0, 715.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "ab");
    }

    #[test]
    fn line_comparison_is_against_run_start() {
        // Each char drifts 4 points down from the previous one; against the
        // first char the third is 8 points off, still under 10 (half of 20).
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 21.0, 31.0, 696.0, 716.0),
            glyph('c', 32.0, 42.0, 692.0, 712.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "abc");
    }

    #[test]
    fn zero_height_box_uses_font_size_for_line_height() {
        // Zero-height boxes: the 12pt font size wins the max, so 5 points of
        // jitter still joins (5 < 6).
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 700.0),
            glyph('b', 21.0, 31.0, 695.0, 695.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
    }

    #[test]
    fn short_box_still_uses_font_size_for_line_height() {
        // A 2-point box height loses the max against the 12pt font size, so
        // 5 points of jitter joins (5 < 6) instead of splitting on the
        // squashed box.
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 718.0, 720.0),
            glyph('b', 21.0, 31.0, 713.0, 715.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "ab");
    }

    #[test]
    fn style_change_splits_runs() {
        let mut glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 21.0, 31.0, 700.0, 720.0),
        ];
        glyphs[1].font_flags = crate::glyph::FONT_FLAG_FORCE_BOLD;
        let (bboxes, _, styles) = segment(&glyphs);
        assert_eq!(bboxes.len(), 2);
        assert_ne!(bboxes[0].style_id, bboxes[1].style_id);
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn fill_color_participates_in_style() {
        let mut glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 21.0, 31.0, 700.0, 720.0),
        ];
        glyphs[1].fill = Rgba::new(255, 0, 0, 255);
        let (bboxes, _, styles) = segment(&glyphs);
        assert_eq!(bboxes.len(), 2);
        assert_eq!(styles.entries()[1].color, "rgba(255,0,0,255)");
    }

    #[test]
    fn font_change_splits_runs_and_interns_both_fonts() {
        let mut glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 21.0, 31.0, 700.0, 720.0),
        ];
        glyphs[1].font_name = "Times".to_string();
        let (bboxes, fonts, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 2);
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts.entries()[0].name, "Helvetica");
        assert_eq!(fonts.entries()[1].name, "Times");
    }

    #[test]
    fn leading_whitespace_never_starts_a_run() {
        let glyphs = vec![
            glyph(' ', 5.0, 10.0, 700.0, 720.0),
            glyph('a', 10.0, 20.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "a");
        assert_eq!(bboxes[0].x, 10.0);
    }

    #[test]
    fn interior_space_stays_inside_the_run() {
        let glyphs = vec![
            glyph('a', 10.0, 16.0, 700.0, 720.0),
            glyph(' ', 16.0, 19.0, 700.0, 720.0),
            glyph('b', 19.0, 25.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "a b");
    }

    #[test]
    fn trailing_space_and_tab_are_trimmed() {
        let glyphs = vec![
            glyph('a', 10.0, 16.0, 700.0, 720.0),
            glyph(' ', 16.0, 19.0, 700.0, 720.0),
            glyph('\t', 19.0, 22.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "a");
        // The trimmed characters still contributed to the geometry.
        assert_eq!(bboxes[0].w, 12.0);
    }

    #[test]
    fn whitespace_only_telemetry_emits_nothing() {
        let glyphs = vec![
            glyph(' ', 10.0, 16.0, 700.0, 720.0),
            glyph('\n', 16.0, 19.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert!(bboxes.is_empty());
    }

    #[test]
    fn control_sentinels_are_discarded() {
        let mut glyphs = vec![
            glyph('a', 10.0, 16.0, 700.0, 720.0),
            glyph('b', 16.0, 22.0, 700.0, 720.0),
        ];
        glyphs[1].codepoint = 0xFFFE;
        glyphs.push({
            let mut g = glyph('c', 22.0, 28.0, 700.0, 720.0);
            g.codepoint = 0xFFFF;
            g
        });
        glyphs.push({
            let mut g = glyph('d', 28.0, 34.0, 700.0, 720.0);
            g.codepoint = 0;
            g
        });
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "a");
    }

    #[test]
    fn non_scalar_codepoints_are_discarded() {
        let mut glyphs = vec![glyph('a', 10.0, 16.0, 700.0, 720.0)];
        glyphs.push({
            let mut g = glyph('x', 16.0, 22.0, 700.0, 720.0);
            g.codepoint = 0xD800; // unpaired surrogate
            g
        });
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "a");
    }

    #[test]
    fn run_box_is_min_max_over_characters() {
        // Second char is taller than the first; the run box covers both.
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 702.0, 718.0),
            glyph('T', 21.0, 31.0, 700.0, 722.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        let b = &bboxes[0];
        assert_eq!(b.x, 10.0);
        assert_eq!(b.y, PAGE_HEIGHT - 722.0);
        assert_eq!(b.w, 21.0);
        assert_eq!(b.h, 22.0);
    }

    #[test]
    fn overlapping_chars_join() {
        // Negative gap (kerned overlap) is always under the threshold.
        let glyphs = vec![
            glyph('f', 10.0, 20.0, 700.0, 720.0),
            glyph('i', 18.0, 25.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "fi");
    }

    #[test]
    fn style_ids_point_into_the_tables() {
        let mut glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 60.0, 70.0, 700.0, 720.0),
        ];
        glyphs[1].font_name = "Times".to_string();
        glyphs[1].font_flags = crate::glyph::FONT_FLAG_ITALIC;
        let (bboxes, fonts, styles) = segment(&glyphs);
        for b in &bboxes {
            let style = &styles.entries()[b.style_id as usize];
            assert!((style.font_id as usize) < fonts.len());
        }
        assert!(styles.entries()[bboxes[1].style_id as usize].italic);
    }

    #[test]
    fn unicode_text_is_preserved() {
        let glyphs = vec![
            glyph('é', 10.0, 20.0, 700.0, 720.0),
            glyph('中', 21.0, 31.0, 700.0, 720.0),
        ];
        let (bboxes, _, _) = segment(&glyphs);
        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].text, "é中");
    }

    #[test]
    fn page_id_is_stamped_on_every_bbox() {
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 60.0, 70.0, 700.0, 720.0),
        ];
        let mut fonts = FontTable::new();
        let mut styles = StyleTable::new();
        let bboxes = segment_page(PAGE_HEIGHT, &glyphs, &mut fonts, &mut styles, 7);
        assert!(bboxes.iter().all(|b| b.page_id == 7));
    }

    #[test]
    fn resegmenting_the_same_input_is_deterministic() {
        let glyphs = vec![
            glyph('a', 10.0, 20.0, 700.0, 720.0),
            glyph('b', 21.0, 31.0, 700.0, 720.0),
            glyph('c', 60.0, 70.0, 700.0, 720.0),
        ];
        let (b1, _, _) = segment(&glyphs);
        let (b2, _, _) = segment(&glyphs);
        assert_eq!(b1, b2);
    }
}
