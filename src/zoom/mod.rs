//! Focus state machine: which node the view is zoomed to, and the animated
//! transition between view windows when that changes.

mod interpolate;

use std::time::Duration;

use eframe::egui::Vec2;
use tracing::debug;

use crate::hierarchy::{Hierarchy, NodeId, TreeNode};
use crate::scene::{LabelDisplay, Scene};

pub use interpolate::{ZoomPath, ease_cubic_in_out};

/// Focused node diameter multiplier; keeps breathing room around the focus.
pub const FOCUS_MARGIN: f64 = 4.0;

/// Visible region of layout space: center plus the diameter spanning the
/// viewport width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewWindow {
    pub cx: f64,
    pub cy: f64,
    pub diameter: f64,
}

impl ViewWindow {
    pub fn focused_on(node: &TreeNode) -> Self {
        Self {
            cx: node.x,
            cy: node.y,
            diameter: node.r * FOCUS_MARGIN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusState {
    pub focus: NodeId,
    pub view: ViewWindow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A transition started.
    Zoomed,
    /// Nothing to do; the click is still consumed by the node.
    Ignored,
}

#[derive(Clone, Copy, Debug)]
struct LabelFade {
    label: usize,
    from: f32,
    to: f32,
}

#[derive(Clone, Debug)]
struct Transition {
    path: ZoomPath,
    started_at: f64,
    duration: f64,
    fades: Vec<LabelFade>,
}

impl Transition {
    fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
enum Phase {
    Idle,
    Transitioning(Transition),
}

#[derive(Clone, Copy, Debug)]
pub struct TransitionTiming {
    pub normal: Duration,
    pub slow: Duration,
}

pub struct ZoomController {
    state: FocusState,
    root: NodeId,
    phase: Phase,
    timing: TransitionTiming,
}

impl ZoomController {
    /// Focuses the root and applies the matching view to the scene.
    pub fn new(hierarchy: &Hierarchy, scene: &mut Scene, timing: TransitionTiming) -> Self {
        let root = hierarchy.root();
        let state = FocusState {
            focus: root,
            view: ViewWindow::focused_on(hierarchy.node(root)),
        };
        scene.update(&state.view);

        Self {
            state,
            root,
            phase: Phase::Idle,
            timing,
        }
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn focus(&self) -> NodeId {
        self.state.focus
    }

    pub fn view(&self) -> ViewWindow {
        self.state.view
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning(_))
    }

    /// Zooms to `node` unless it is a leaf or already the focus.
    pub fn on_node_clicked(
        &mut self,
        hierarchy: &Hierarchy,
        scene: &mut Scene,
        node: NodeId,
        slow: bool,
        now: f64,
    ) -> ClickOutcome {
        if node == self.state.focus || hierarchy.node(node).is_leaf() {
            return ClickOutcome::Ignored;
        }
        self.zoom_to(hierarchy, scene, node, slow, now);
        ClickOutcome::Zoomed
    }

    pub fn on_background_clicked(
        &mut self,
        hierarchy: &Hierarchy,
        scene: &mut Scene,
        slow: bool,
        now: f64,
    ) -> ClickOutcome {
        if self.state.focus == self.root {
            return ClickOutcome::Ignored;
        }
        self.zoom_to(hierarchy, scene, self.root, slow, now);
        ClickOutcome::Zoomed
    }

    pub fn on_resize(&mut self, scene: &mut Scene, width: f32, height: f32) {
        scene.set_viewport(Vec2::new(width, height));
        scene.update(&self.state.view);
    }

    fn zoom_to(
        &mut self,
        hierarchy: &Hierarchy,
        scene: &mut Scene,
        target: NodeId,
        slow: bool,
        now: f64,
    ) {
        if self.is_transitioning() {
            debug!(next = %hierarchy.node(target).name, "overriding in-flight transition");
        }

        self.state.focus = target;
        let path = ZoomPath::new(self.state.view, ViewWindow::focused_on(hierarchy.node(target)));
        let duration = if slow {
            self.timing.slow
        } else {
            self.timing.normal
        };

        let mut fades = Vec::new();
        for (index, label) in scene.labels_mut().iter_mut().enumerate() {
            let child_of_focus = label.parent == Some(target);
            if !child_of_focus && !label.is_displayed() {
                continue;
            }
            if child_of_focus {
                label.display = LabelDisplay::Shown;
            }
            fades.push(LabelFade {
                label: index,
                from: label.opacity,
                to: if child_of_focus { 1.0 } else { 0.0 },
            });
        }

        debug!(
            focus = %hierarchy.node(target).name,
            duration_ms = duration.as_millis() as u64,
            fading_labels = fades.len(),
            "starting zoom transition"
        );
        self.phase = Phase::Transitioning(Transition {
            path,
            started_at: now,
            duration: duration.as_secs_f64(),
            fades,
        });
    }

    /// Frame driver. Returns `true` while a transition is still running.
    pub fn advance(&mut self, scene: &mut Scene, now: f64) -> bool {
        let Phase::Transitioning(transition) = &self.phase else {
            return false;
        };

        let t = transition.progress(now);
        let eased = ease_cubic_in_out(t);
        self.state.view = transition.path.at(eased);

        let labels = scene.labels_mut();
        for fade in &transition.fades {
            if let Some(label) = labels.get_mut(fade.label) {
                label.opacity = fade.from + (fade.to - fade.from) * eased as f32;
            }
        }

        if t < 1.0 {
            scene.update(&self.state.view);
            return true;
        }

        self.state.view = transition.path.to();
        let focus = self.state.focus;
        for label in scene.labels_mut() {
            if label.parent != Some(focus) {
                label.display = LabelDisplay::Hidden;
            }
        }
        scene.update(&self.state.view);
        self.phase = Phase::Idle;
        debug!("zoom transition finished");
        false
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use serde_json::json;

    use super::*;
    use crate::config::VisualConfig;
    use crate::hierarchy::RawNode;
    use crate::style::NodeStyler;

    const TIMING: TransitionTiming = TransitionTiming {
        normal: Duration::from_millis(750),
        slow: Duration::from_millis(7500),
    };

    struct Fixture {
        hierarchy: Hierarchy,
        scene: Scene,
        zoom: ZoomController,
    }

    impl Fixture {
        fn new() -> Self {
            let raw: RawNode = serde_json::from_value(json!({
                "name": "root",
                "children": [
                    {"name": "a", "children": [
                        {"name": "a1", "size": 10},
                        {"name": "a2", "children": [
                            {"name": "a2x", "size": 3},
                            {"name": "a2y", "size": 4}
                        ]}
                    ]},
                    {"name": "b", "children": [
                        {"name": "b1", "size": 30}
                    ]},
                    {"name": "c", "size": 5}
                ]
            }))
            .unwrap();
            let mut hierarchy = Hierarchy::build(&raw).unwrap();
            let config = VisualConfig::default();
            config.pack_layout().apply(&mut hierarchy);
            let styler = NodeStyler::new(&hierarchy, &config);
            let mut scene = Scene::draw_initial(&hierarchy, &styler, vec2(1000.0, 700.0));
            let zoom = ZoomController::new(&hierarchy, &mut scene, TIMING);
            Self {
                hierarchy,
                scene,
                zoom,
            }
        }

        fn id(&self, name: &str) -> NodeId {
            self.hierarchy
                .iter()
                .find(|(_, node)| node.name == name)
                .map(|(id, _)| id)
                .unwrap()
        }

        fn click(&mut self, name: &str, now: f64) -> ClickOutcome {
            let node = self.id(name);
            self.zoom
                .on_node_clicked(&self.hierarchy, &mut self.scene, node, false, now)
        }

        fn click_background(&mut self, now: f64) -> ClickOutcome {
            self.zoom
                .on_background_clicked(&self.hierarchy, &mut self.scene, false, now)
        }

        fn run_to_end(&mut self, from: f64) {
            let mut now = from;
            while self.zoom.advance(&mut self.scene, now) {
                now += 1.0 / 60.0;
            }
        }

        fn label(&self, name: &str) -> &crate::scene::LabelElement {
            self.scene.label(self.id(name)).unwrap()
        }
    }

    #[test]
    fn starts_idle_on_root() {
        let fixture = Fixture::new();
        let root = fixture.hierarchy.root();
        assert_eq!(fixture.zoom.focus(), root);
        assert_eq!(
            fixture.zoom.view(),
            ViewWindow::focused_on(fixture.hierarchy.node(root))
        );
        assert!(!fixture.zoom.is_transitioning());
    }

    #[test]
    fn completed_transition_lands_exactly_on_target() {
        let mut fixture = Fixture::new();
        assert_eq!(fixture.click("a", 0.0), ClickOutcome::Zoomed);
        assert!(fixture.zoom.is_transitioning());
        fixture.run_to_end(0.0);

        let a = fixture.id("a");
        assert_eq!(fixture.zoom.focus(), a);
        assert_eq!(
            fixture.zoom.view(),
            ViewWindow::focused_on(fixture.hierarchy.node(a))
        );
        assert!(!fixture.zoom.is_transitioning());
    }

    #[test]
    fn clicking_focus_is_a_no_op() {
        let mut fixture = Fixture::new();
        fixture.click("a", 0.0);
        fixture.run_to_end(0.0);
        let before = *fixture.zoom.state();

        assert_eq!(fixture.click("a", 5.0), ClickOutcome::Ignored);
        assert!(!fixture.zoom.is_transitioning());
        assert_eq!(*fixture.zoom.state(), before);
    }

    #[test]
    fn background_on_root_is_a_no_op() {
        let mut fixture = Fixture::new();
        let before = *fixture.zoom.state();
        assert_eq!(fixture.click_background(0.0), ClickOutcome::Ignored);
        assert_eq!(*fixture.zoom.state(), before);
    }

    #[test]
    fn leaves_cannot_take_focus() {
        let mut fixture = Fixture::new();
        assert_eq!(fixture.click("c", 0.0), ClickOutcome::Ignored);
        assert_eq!(fixture.zoom.focus(), fixture.hierarchy.root());
    }

    #[test]
    fn labels_follow_the_focus() {
        let mut fixture = Fixture::new();
        fixture.click("a", 0.0);

        // Children of the new focus are displayed immediately so they can fade in.
        assert_eq!(fixture.label("a1").display, LabelDisplay::Shown);
        assert_eq!(fixture.label("a1").opacity, 0.0);
        assert_eq!(fixture.label("b").display, LabelDisplay::Shown);

        fixture.run_to_end(0.0);

        for name in ["a1", "a2"] {
            assert_eq!(fixture.label(name).display, LabelDisplay::Shown, "{name}");
            assert_eq!(fixture.label(name).opacity, 1.0, "{name}");
        }
        for name in ["a", "b", "c"] {
            assert_eq!(fixture.label(name).display, LabelDisplay::Hidden, "{name}");
            assert_eq!(fixture.label(name).opacity, 0.0, "{name}");
        }
        assert_eq!(fixture.label("a2x").display, LabelDisplay::Hidden);
    }

    #[test]
    fn labels_fade_midway() {
        let mut fixture = Fixture::new();
        fixture.click("a", 0.0);
        assert!(fixture.zoom.advance(&mut fixture.scene, 0.375));

        let incoming = fixture.label("a1").opacity;
        let outgoing = fixture.label("b").opacity;
        assert!((incoming - 0.5).abs() < 1e-6);
        assert!((outgoing - 0.5).abs() < 1e-6);
    }

    #[test]
    fn background_click_restores_initial_view() {
        let mut fixture = Fixture::new();
        let initial = *fixture.zoom.state();

        fixture.click("a", 0.0);
        fixture.run_to_end(0.0);
        fixture.click("a2", 1.0);
        fixture.run_to_end(1.0);
        assert_eq!(fixture.zoom.focus(), fixture.id("a2"));

        assert_eq!(fixture.click_background(2.0), ClickOutcome::Zoomed);
        fixture.run_to_end(2.0);

        assert_eq!(*fixture.zoom.state(), initial);
        for name in ["a", "b", "c"] {
            assert_eq!(fixture.label(name).display, LabelDisplay::Shown, "{name}");
            assert_eq!(fixture.label(name).opacity, 1.0, "{name}");
        }
        for name in ["a2x", "a2y", "a1", "a2"] {
            assert_eq!(fixture.label(name).display, LabelDisplay::Hidden, "{name}");
        }
    }

    #[test]
    fn new_click_overrides_in_flight_transition() {
        let mut fixture = Fixture::new();
        fixture.click("a", 0.0);
        assert!(fixture.zoom.advance(&mut fixture.scene, 0.3));
        let midway = fixture.zoom.view();
        let a_label_midway = fixture.label("a1").opacity;

        assert_eq!(fixture.click("b", 0.3), ClickOutcome::Zoomed);
        assert_eq!(fixture.zoom.focus(), fixture.id("b"));

        // The new path starts from the partially animated view.
        assert!(fixture.zoom.advance(&mut fixture.scene, 0.3));
        assert_eq!(fixture.zoom.view(), midway);
        assert_eq!(fixture.label("a1").opacity, a_label_midway);

        fixture.run_to_end(0.3);
        let b = fixture.id("b");
        assert_eq!(
            fixture.zoom.view(),
            ViewWindow::focused_on(fixture.hierarchy.node(b))
        );
        assert_eq!(fixture.label("b1").display, LabelDisplay::Shown);
        assert_eq!(fixture.label("a1").display, LabelDisplay::Hidden);
        assert_eq!(fixture.label("a1").opacity, 0.0);
    }

    #[test]
    fn clicking_the_target_mid_flight_keeps_running() {
        let mut fixture = Fixture::new();
        fixture.click("a", 0.0);
        fixture.zoom.advance(&mut fixture.scene, 0.2);
        assert_eq!(fixture.click("a", 0.2), ClickOutcome::Ignored);
        assert!(fixture.zoom.is_transitioning());
    }

    #[test]
    fn slow_mode_stretches_duration() {
        let mut fixture = Fixture::new();
        let a = fixture.id("a");
        fixture
            .zoom
            .on_node_clicked(&fixture.hierarchy, &mut fixture.scene, a, true, 0.0);
        assert!(fixture.zoom.advance(&mut fixture.scene, 1.0));
        assert!(fixture.zoom.advance(&mut fixture.scene, 7.0));
        assert!(!fixture.zoom.advance(&mut fixture.scene, 7.5));
    }

    #[test]
    fn resize_reprojects_current_view() {
        let mut fixture = Fixture::new();
        let a = fixture.id("a");
        let before = fixture.scene.circle(a).unwrap().radius;
        fixture.zoom.on_resize(&mut fixture.scene, 500.0, 700.0);
        let after = fixture.scene.circle(a).unwrap().radius;
        assert!((after * 2.0 - before).abs() < 1e-3);
        assert_eq!(fixture.scene.viewport(), vec2(500.0, 700.0));
    }

    #[test]
    fn idle_advance_does_nothing() {
        let mut fixture = Fixture::new();
        let before = *fixture.zoom.state();
        assert!(!fixture.zoom.advance(&mut fixture.scene, 10.0));
        assert_eq!(*fixture.zoom.state(), before);
    }
}
