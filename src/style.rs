//! Per-node colors and label sizing derived from depth and top-level branch.

use std::collections::HashMap;

use eframe::egui::Color32;

use crate::config::VisualConfig;
use crate::hierarchy::{Hierarchy, NodeId};

/// The ten-color categorical scheme.
pub const CATEGORY10: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

const DEFAULT_FALLBACK: Color32 = Color32::from_rgb(0x00, 0x99, 0xcc);
const LIGHTNESS_STEP: f32 = 0.1;

pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Hsl {
    h: f32,
    s: f32,
    l: f32,
}

impl Hsl {
    fn from_color(color: Color32) -> Self {
        let r = f32::from(color.r()) / 255.0;
        let g = f32::from(color.g()) / 255.0;
        let b = f32::from(color.b()) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;
        if delta <= f32::EPSILON {
            return Self { h: 0.0, s: 0.0, l };
        }

        let s = if l < 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let sector = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        Self {
            h: sector * 60.0,
            s,
            l,
        }
    }

    fn to_color(self) -> Color32 {
        let l = self.l.clamp(0.0, 1.0);
        let s = self.s.clamp(0.0, 1.0);
        let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let m1 = 2.0 * l - m2;
        let channel = |hue: f32| {
            let hue = hue.rem_euclid(360.0);
            let value = if hue < 60.0 {
                m1 + (m2 - m1) * hue / 60.0
            } else if hue < 180.0 {
                m2
            } else if hue < 240.0 {
                m1 + (m2 - m1) * (240.0 - hue) / 60.0
            } else {
                m1
            };
            (value * 255.0).round().clamp(0.0, 255.0) as u8
        };
        Color32::from_rgb(
            channel(self.h + 120.0),
            channel(self.h),
            channel(self.h - 120.0),
        )
    }
}

/// Name to color assignment for the top-level branches, fixed at startup.
#[derive(Clone, Debug, Default)]
pub struct Palette {
    by_name: HashMap<String, Color32>,
}

impl Palette {
    pub fn from_top_level(hierarchy: &Hierarchy) -> Self {
        let mut by_name = HashMap::new();
        for child in &hierarchy.node(hierarchy.root()).children {
            let next = CATEGORY10[by_name.len() % CATEGORY10.len()];
            by_name
                .entry(hierarchy.node(*child).name.clone())
                .or_insert(next);
        }
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<Color32> {
        self.by_name.get(name).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle {
    pub color: Color32,
    pub shadow: Option<Color32>,
    pub bold: bool,
}

pub struct NodeStyler {
    palette: Palette,
    multicolor: bool,
    fallback: Color32,
    top_level_font_size: f32,
    nested_font_size: f32,
    label: LabelStyle,
}

impl NodeStyler {
    pub fn new(hierarchy: &Hierarchy, config: &VisualConfig) -> Self {
        let (text, shadow) = if config.black_text {
            (Color32::BLACK, Color32::WHITE)
        } else {
            (Color32::WHITE, Color32::BLACK)
        };

        Self {
            palette: Palette::from_top_level(hierarchy),
            multicolor: config.multicolor,
            fallback: parse_hex_color(&config.fallback_color).unwrap_or(DEFAULT_FALLBACK),
            top_level_font_size: config.top_level_font_size,
            nested_font_size: config.nested_font_size,
            label: LabelStyle {
                color: text,
                shadow: config.text_shadow.then_some(shadow),
                bold: config.bold,
            },
        }
    }

    pub fn top_ancestor(hierarchy: &Hierarchy, id: NodeId) -> NodeId {
        let mut cursor = id;
        while hierarchy.node(cursor).depth > 1 {
            match hierarchy.node(cursor).parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        cursor
    }

    fn base_color(&self, hierarchy: &Hierarchy, id: NodeId) -> Color32 {
        if !self.multicolor {
            return self.fallback;
        }
        let top = Self::top_ancestor(hierarchy, id);
        self.palette
            .get(&hierarchy.node(top).name)
            .unwrap_or(self.fallback)
    }

    pub fn fill_color(&self, hierarchy: &Hierarchy, id: NodeId) -> Color32 {
        let base = self.base_color(hierarchy, id);
        let depth = hierarchy.node(id).depth;
        if depth <= 1 {
            return base;
        }
        let mut hsl = Hsl::from_color(base);
        hsl.l += (depth - 1) as f32 * LIGHTNESS_STEP;
        hsl.to_color()
    }

    pub fn stroke_color(&self, hierarchy: &Hierarchy, id: NodeId) -> Color32 {
        self.base_color(hierarchy, id)
    }

    pub fn hover_stroke_color(hierarchy: &Hierarchy, id: NodeId) -> Color32 {
        if hierarchy.node(id).depth == 1 {
            Color32::YELLOW
        } else {
            Color32::WHITE
        }
    }

    pub fn stroke_width(hierarchy: &Hierarchy, id: NodeId) -> f32 {
        if hierarchy.node(id).depth == 1 { 3.0 } else { 1.0 }
    }

    /// Depth 1 and depth 3 anchor the scale; depths between interpolate,
    /// depths outside clamp.
    pub fn font_size(&self, depth: usize) -> f32 {
        let t = ((depth as f32 - 1.0) / 2.0).clamp(0.0, 1.0);
        self.top_level_font_size + (self.nested_font_size - self.top_level_font_size) * t
    }

    pub fn label_style(&self) -> LabelStyle {
        self.label
    }
}
