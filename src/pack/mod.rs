//! Hierarchical circle packing.
//!
//! Leaves get a radius of `sqrt(value)`, every parent is packed bottom-up
//! around its children with the front-chain sibling packing, and the finished
//! tree is scaled so the root circle fits the requested extent, centered on
//! the origin.

mod enclose;
mod siblings;

use tracing::debug;

use crate::hierarchy::{Hierarchy, NodeId, TreeNode};

use self::enclose::Lcg;
use self::siblings::pack_siblings;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Circle {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) r: f64,
}

/// Layout extent and the padding rule between nested circles.
#[derive(Clone, Copy, Debug)]
pub struct PackLayout {
    pub width: f64,
    pub height: f64,
    pub root_padding: f64,
    pub nested_padding: f64,
}

impl PackLayout {
    /// Gap kept around the children of `node`, in output units.
    pub fn padding(&self, node: &TreeNode) -> f64 {
        if node.depth == 0 {
            self.root_padding
        } else {
            self.nested_padding
        }
    }

    pub fn apply(&self, hierarchy: &mut Hierarchy) {
        pack(hierarchy, self.width, self.height, |node| self.padding(node));
    }
}

/// Assigns `x`, `y` and `r` to every node so the root is centered on the
/// origin with radius `min(width, height) / 2`.
pub fn pack<P>(hierarchy: &mut Hierarchy, width: f64, height: f64, padding: P)
where
    P: Fn(&TreeNode) -> f64,
{
    let extent = width.min(height).max(0.0);
    let root = hierarchy.root();

    for id in hierarchy.ids() {
        let node = hierarchy.node_mut(id);
        node.x = 0.0;
        node.y = 0.0;
        node.r = if node.is_leaf() {
            node.value.max(0.0).sqrt()
        } else {
            0.0
        };
    }

    let mut rng = Lcg::new();
    pack_children(hierarchy, &mut rng, |_| 0.0);

    let unpadded = hierarchy.node(root).r;
    if unpadded <= 0.0 || extent <= 0.0 {
        for id in hierarchy.ids() {
            let node = hierarchy.node_mut(id);
            node.x = 0.0;
            node.y = 0.0;
            node.r = 0.0;
        }
        hierarchy.node_mut(root).r = extent / 2.0;
        debug!(extent, "degenerate hierarchy collapsed to the root circle");
        return;
    }

    let k = unpadded / extent;
    pack_children(hierarchy, &mut rng, |node| (padding(node) * k).max(0.0));

    let scale = extent / (2.0 * hierarchy.node(root).r);
    for id in hierarchy.ids() {
        let parent = hierarchy.node(id).parent.map(|parent| {
            let parent = hierarchy.node(parent);
            (parent.x, parent.y)
        });
        let node = hierarchy.node_mut(id);
        node.r *= scale;
        match parent {
            Some((px, py)) => {
                node.x = px + scale * node.x;
                node.y = py + scale * node.y;
            }
            None => {
                node.x = 0.0;
                node.y = 0.0;
            }
        }
    }

    debug!(
        nodes = hierarchy.len(),
        root_radius = hierarchy.node(root).r,
        "packed hierarchy"
    );
}

// Bottom-up: each parent packs its children, grown by the parent's padding,
// and becomes their enclosing circle plus that padding.
fn pack_children<P>(hierarchy: &mut Hierarchy, rng: &mut Lcg, padding: P)
where
    P: Fn(&TreeNode) -> f64,
{
    let ids = hierarchy.ids().rev().collect::<Vec<NodeId>>();
    let mut circles = Vec::new();

    for id in ids {
        let node = hierarchy.node(id);
        if node.is_leaf() {
            continue;
        }
        let pad = padding(node);

        circles.clear();
        circles.extend(node.children.iter().map(|child| {
            let child = hierarchy.node(*child);
            Circle {
                x: child.x,
                y: child.y,
                r: child.r + pad,
            }
        }));

        let enclosing = pack_siblings(&mut circles, rng);

        let children = hierarchy.node(id).children.clone();
        for (child, circle) in children.into_iter().zip(&circles) {
            let child = hierarchy.node_mut(child);
            child.x = circle.x;
            child.y = circle.y;
            child.r = circle.r - pad;
        }
        hierarchy.node_mut(id).r = enclosing + pad;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::hierarchy::RawNode;

    const LAYOUT: PackLayout = PackLayout {
        width: 960.0,
        height: 720.0,
        root_padding: 20.0,
        nested_padding: 5.0,
    };

    fn build(value: serde_json::Value) -> Hierarchy {
        let raw: RawNode = serde_json::from_value(value).unwrap();
        Hierarchy::build(&raw).unwrap()
    }

    fn find(hierarchy: &Hierarchy, name: &str) -> NodeId {
        hierarchy
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
            .unwrap()
    }

    fn nested() -> Hierarchy {
        build(json!({
            "name": "root",
            "children": [
                {"name": "docs", "children": [
                    {"name": "guide", "size": 120},
                    {"name": "api", "size": 340},
                    {"name": "faq", "size": 15}
                ]},
                {"name": "src", "children": [
                    {"name": "core", "children": [
                        {"name": "lib", "size": 900},
                        {"name": "util", "size": 75},
                        {"name": "io", "size": 410}
                    ]},
                    {"name": "cli", "size": 260},
                    {"name": "tiny", "size": 1}
                ]},
                {"name": "assets", "size": 640},
                {"name": "empty", "size": 0},
                {"name": "single", "children": [{"name": "only", "size": 50}]}
            ]
        }))
    }

    // Absolute slack scaled to the layout so large trees get the same relative precision.
    fn tolerance(hierarchy: &Hierarchy) -> f64 {
        1e-6 * hierarchy.node(hierarchy.root()).r.max(1.0)
    }

    fn assert_contained(hierarchy: &Hierarchy) {
        let eps = tolerance(hierarchy);
        for (_, node) in hierarchy.iter() {
            let Some(parent) = node.parent else {
                continue;
            };
            let parent = hierarchy.node(parent);
            let distance = (node.x - parent.x).hypot(node.y - parent.y);
            assert!(
                distance + node.r <= parent.r + eps,
                "{} escapes {}",
                node.name,
                parent.name
            );
        }
    }

    fn assert_siblings_disjoint(hierarchy: &Hierarchy) {
        let eps = tolerance(hierarchy);
        for (_, node) in hierarchy.iter() {
            for (index, a) in node.children.iter().enumerate() {
                for b in &node.children[index + 1..] {
                    let (a, b) = (hierarchy.node(*a), hierarchy.node(*b));
                    let distance = (a.x - b.x).hypot(a.y - b.y);
                    assert!(
                        distance >= a.r + b.r - eps,
                        "{} overlaps {}",
                        a.name,
                        b.name
                    );
                }
            }
        }
    }

    #[test]
    fn root_fits_extent() {
        let mut hierarchy = nested();
        LAYOUT.apply(&mut hierarchy);
        let root = hierarchy.node(hierarchy.root());
        assert_eq!((root.x, root.y), (0.0, 0.0));
        assert!((root.r - 360.0).abs() < 1e-9);
    }

    #[test]
    fn children_are_contained_and_siblings_disjoint() {
        let mut hierarchy = nested();
        LAYOUT.apply(&mut hierarchy);
        assert_contained(&hierarchy);
        assert_siblings_disjoint(&hierarchy);
    }

    /// xorshift64*, enough to spread tree shapes deterministically.
    struct TreeRng(u64);

    impl TreeRng {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 >> 12;
            self.0 ^= self.0 << 25;
            self.0 ^= self.0 >> 27;
            self.0.wrapping_mul(0x2545_f491_4f6c_dd1d)
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.next() % bound
        }
    }

    fn random_tree(rng: &mut TreeRng, name: String, depth: usize) -> serde_json::Value {
        let fan_out = if depth >= 4 { 0 } else { rng.below(7) };
        if depth > 0 && fan_out == 0 {
            let size = match rng.below(10) {
                0 => 0,
                1 => rng.below(100_000),
                _ => 1 + rng.below(1_000),
            };
            return json!({"name": name, "size": size});
        }
        let children = (0..fan_out.max(1))
            .map(|index| random_tree(rng, format!("{name}.{index}"), depth + 1))
            .collect::<Vec<_>>();
        json!({"name": name, "children": children})
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(42)]
    #[case(1_234)]
    #[case(98_765)]
    #[case(0xdead_beef)]
    fn random_trees_are_contained_and_disjoint(#[case] seed: u64) {
        let mut rng = TreeRng(seed);
        for round in 0..20 {
            let mut hierarchy = build(random_tree(&mut rng, format!("root{round}"), 0));
            LAYOUT.apply(&mut hierarchy);
            assert_contained(&hierarchy);
            assert_siblings_disjoint(&hierarchy);

            let mut unpadded = hierarchy.clone();
            pack(&mut unpadded, 800.0, 800.0, |_| 0.0);
            assert_contained(&unpadded);
            assert_siblings_disjoint(&unpadded);
        }
    }

    #[test]
    fn bundled_sample_packs_cleanly() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample.json");
        let mut hierarchy = crate::hierarchy::load_hierarchy(&path).unwrap();
        LAYOUT.apply(&mut hierarchy);
        assert!((hierarchy.node(hierarchy.root()).r - 360.0).abs() < 1e-9);
        assert_contained(&hierarchy);
        assert_siblings_disjoint(&hierarchy);
    }

    #[test]
    fn unpadded_layout_is_also_valid() {
        let mut hierarchy = nested();
        pack(&mut hierarchy, 500.0, 500.0, |_| 0.0);
        assert_contained(&hierarchy);
        assert_siblings_disjoint(&hierarchy);
    }

    #[test]
    fn two_leaves_have_area_proportional_radii() {
        let mut hierarchy = build(json!({
            "name": "root",
            "children": [{"name": "a", "size": 10}, {"name": "b", "size": 30}]
        }));
        LAYOUT.apply(&mut hierarchy);

        let a = hierarchy.node(find(&hierarchy, "a"));
        let b = hierarchy.node(find(&hierarchy, "b"));
        assert!(b.r > a.r);
        assert!((b.r / a.r - 3.0_f64.sqrt()).abs() < 1e-9);
        assert_contained(&hierarchy);
        assert_siblings_disjoint(&hierarchy);
    }

    #[test]
    fn single_child_fills_parent_interior() {
        let mut hierarchy = nested();
        LAYOUT.apply(&mut hierarchy);
        let parent = hierarchy.node(find(&hierarchy, "single"));
        let child = hierarchy.node(find(&hierarchy, "only"));
        assert!((child.x - parent.x).abs() < 1e-9);
        assert!((child.y - parent.y).abs() < 1e-9);
        assert!(child.r < parent.r);
        assert!(child.r > 0.0);
    }

    #[test]
    fn zero_value_leaf_has_zero_radius() {
        let mut hierarchy = nested();
        LAYOUT.apply(&mut hierarchy);
        let empty = hierarchy.node(find(&hierarchy, "empty"));
        assert_eq!(empty.r, 0.0);
        assert!(empty.x.is_finite() && empty.y.is_finite());
    }

    #[test]
    fn all_zero_tree_does_not_divide_by_zero() {
        let mut hierarchy = build(json!({
            "name": "root",
            "children": [{"name": "a", "size": 0}, {"name": "b"}]
        }));
        LAYOUT.apply(&mut hierarchy);
        let root = hierarchy.node(hierarchy.root());
        assert_eq!(root.r, 360.0);
        for (_, node) in hierarchy.iter() {
            assert!(node.x.is_finite() && node.y.is_finite() && node.r.is_finite());
            assert!(node.r >= 0.0);
        }
        assert_contained(&hierarchy);
    }

    #[test]
    fn layout_is_idempotent() {
        let mut first = nested();
        LAYOUT.apply(&mut first);
        let mut second = first.clone();
        LAYOUT.apply(&mut second);

        for ((_, a), (_, b)) in first.iter().zip(second.iter()) {
            assert_eq!((a.x, a.y, a.r), (b.x, b.y, b.r), "{}", a.name);
        }
    }

    #[test]
    fn root_padding_separates_top_level_clusters() {
        let mut hierarchy = nested();
        LAYOUT.apply(&mut hierarchy);
        let docs = hierarchy.node(find(&hierarchy, "docs"));
        let src = hierarchy.node(find(&hierarchy, "src"));
        let gap = (docs.x - src.x).hypot(docs.y - src.y) - docs.r - src.r;
        assert!(gap > 0.0);
    }
}
