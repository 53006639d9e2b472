//! Persistent visual elements bound one-to-one to tree nodes.
//!
//! Elements are created once by [`Scene::draw_initial`] and only ever have
//! their screen transform, hover flag and label visibility changed afterwards.
//! Screen coordinates are offsets from the viewport center.

mod paint;

use eframe::egui::{Color32, Vec2, vec2};

use crate::hierarchy::{Hierarchy, NodeId};
use crate::style::{LabelStyle, NodeStyler};
use crate::zoom::ViewWindow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelDisplay {
    Shown,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct LayoutCircle {
    x: f64,
    y: f64,
    r: f64,
}

#[derive(Clone, Debug)]
pub struct CircleElement {
    pub node: NodeId,
    pub fill: Color32,
    pub stroke: Color32,
    pub hover_stroke: Color32,
    pub stroke_width: f32,
    /// Leaves let the pointer through to the circle beneath.
    pub pointer_target: bool,
    pub hovered: bool,
    pub center: Vec2,
    pub radius: f32,
    layout: LayoutCircle,
}

impl CircleElement {
    pub fn current_stroke(&self) -> Color32 {
        if self.hovered {
            self.hover_stroke
        } else {
            self.stroke
        }
    }
}

#[derive(Clone, Debug)]
pub struct LabelElement {
    pub node: NodeId,
    pub parent: Option<NodeId>,
    pub text: String,
    pub font_size: f32,
    pub opacity: f32,
    pub display: LabelDisplay,
    pub position: Vec2,
    layout: LayoutCircle,
}

impl LabelElement {
    pub fn is_displayed(&self) -> bool {
        self.display == LabelDisplay::Shown
    }
}

pub struct Scene {
    viewport: Vec2,
    circles: Vec<CircleElement>,
    labels: Vec<LabelElement>,
    circle_by_node: Vec<Option<usize>>,
    label_style: LabelStyle,
}

impl Scene {
    /// Creates every element once, breadth-first so parents paint before
    /// their children. Only the root's children start with a visible label.
    pub fn draw_initial(hierarchy: &Hierarchy, styler: &NodeStyler, viewport: Vec2) -> Self {
        let order = hierarchy.descendants();
        let root = hierarchy.root();
        let mut circles = Vec::with_capacity(order.len().saturating_sub(1));
        let mut labels = Vec::with_capacity(order.len());
        let mut circle_by_node = vec![None; hierarchy.len()];

        for id in order {
            let node = hierarchy.node(id);
            let layout = LayoutCircle {
                x: node.x,
                y: node.y,
                r: node.r,
            };

            if id != root {
                circle_by_node[id.index()] = Some(circles.len());
                circles.push(CircleElement {
                    node: id,
                    fill: styler.fill_color(hierarchy, id),
                    stroke: styler.stroke_color(hierarchy, id),
                    hover_stroke: NodeStyler::hover_stroke_color(hierarchy, id),
                    stroke_width: NodeStyler::stroke_width(hierarchy, id),
                    pointer_target: !node.is_leaf(),
                    hovered: false,
                    center: Vec2::ZERO,
                    radius: 0.0,
                    layout,
                });
            }

            let visible = node.parent == Some(root);
            labels.push(LabelElement {
                node: id,
                parent: node.parent,
                text: node.name.clone(),
                font_size: styler.font_size(node.depth),
                opacity: if visible { 1.0 } else { 0.0 },
                display: if visible {
                    LabelDisplay::Shown
                } else {
                    LabelDisplay::Hidden
                },
                position: Vec2::ZERO,
                layout,
            });
        }

        Self {
            viewport,
            circles,
            labels,
            circle_by_node,
            label_style: styler.label_style(),
        }
    }

    /// Maps every element from layout space into the viewport for `view`.
    pub fn update(&mut self, view: &ViewWindow) {
        let scale = if view.diameter > 0.0 {
            f64::from(self.viewport.x) / view.diameter
        } else {
            0.0
        };
        let project = |layout: LayoutCircle| {
            vec2(
                ((layout.x - view.cx) * scale) as f32,
                ((layout.y - view.cy) * scale) as f32,
            )
        };

        for circle in &mut self.circles {
            circle.center = project(circle.layout);
            circle.radius = (circle.layout.r * scale) as f32;
        }
        for label in &mut self.labels {
            label.position = project(label.layout) + vec2(0.0, label.font_size / 4.0);
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn labels_mut(&mut self) -> &mut [LabelElement] {
        &mut self.labels
    }

    /// Topmost pointer target under `point` (an offset from the viewport center).
    pub fn hit_test(&self, point: Vec2) -> Option<NodeId> {
        self.circles
            .iter()
            .rev()
            .filter(|circle| circle.pointer_target && circle.radius > 0.0)
            .find(|circle| (point - circle.center).length() <= circle.radius)
            .map(|circle| circle.node)
    }

    /// Moves the hover highlight; returns whether anything changed.
    pub fn set_hovered(&mut self, node: Option<NodeId>) -> bool {
        let target = node.and_then(|node| self.circle_by_node.get(node.index()).copied().flatten());
        let mut changed = false;
        for (index, circle) in self.circles.iter_mut().enumerate() {
            let hovered = target == Some(index) && circle.pointer_target;
            if circle.hovered != hovered {
                circle.hovered = hovered;
                changed = true;
            }
        }
        changed
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.circles
            .iter()
            .find(|circle| circle.hovered)
            .map(|circle| circle.node)
    }
}

#[cfg(test)]
impl Scene {
    pub fn circles(&self) -> &[CircleElement] {
        &self.circles
    }

    pub fn labels(&self) -> &[LabelElement] {
        &self.labels
    }

    pub fn circle(&self, node: NodeId) -> Option<&CircleElement> {
        self.circle_by_node
            .get(node.index())
            .copied()
            .flatten()
            .map(|index| &self.circles[index])
    }

    pub fn label(&self, node: NodeId) -> Option<&LabelElement> {
        self.labels.iter().find(|label| label.node == node)
    }
}
