//! Unit conversion shared by the renderers.
//!
//! Style rules are kept in points and character widths; page geometry in
//! millimetres. DOCX wants half-points and twips, PDF wants points, CSS gets
//! point and em values.

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// A4 width in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
/// A4 height in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Page size and margins, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
    pub right_mm: f32,
}

impl PageGeometry {
    /// A4 with GB/T 9704 margins.
    pub fn official() -> Self {
        Self {
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            top_mm: 37.0,
            bottom_mm: 35.0,
            left_mm: 28.0,
            right_mm: 26.0,
        }
    }

    /// Width of the text block in points.
    pub fn text_width_pt(&self) -> f32 {
        mm_to_pt(self.width_mm - self.left_mm - self.right_mm)
    }
}

/// Millimetres to points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Millimetres to twips (1/20 pt), rounded.
pub fn mm_to_twips(mm: f32) -> i32 {
    pt_to_twips(mm_to_pt(mm))
}

/// Points to twips, rounded.
pub fn pt_to_twips(pt: f32) -> i32 {
    (pt * 20.0).round() as i32
}

/// Points to half-points, rounded.
pub fn half_points(pt: f32) -> usize {
    (pt * 2.0).round().max(1.0) as usize
}

/// Width of `chars` full-width characters at `font_pt`, in points.
pub fn chars_to_pt(chars: f32, font_pt: f32) -> f32 {
    chars * font_pt
}

/// Width of `chars` full-width characters at `font_pt`, in twips.
pub fn chars_to_twips(chars: f32, font_pt: f32) -> i32 {
    pt_to_twips(chars_to_pt(chars, font_pt))
}

/// CSS length in points, without a trailing `.0`.
pub fn css_pt(pt: f32) -> String {
    format!("{}pt", trim_number(pt))
}

/// CSS length in em.
pub fn css_em(em: f32) -> String {
    format!("{}em", trim_number(em))
}

fn trim_number(v: f32) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
