use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::hierarchy::{Hierarchy, NodeId};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Best fuzzy match for `query`, resolved to something zoomable: a leaf
/// match yields its parent. Shallower nodes win ties.
pub(super) fn jump_target(hierarchy: &Hierarchy, query: &str) -> Option<NodeId> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let matcher = SkimMatcherV2::default();
    let (best, _) = hierarchy
        .iter()
        .filter_map(|(id, node)| {
            fuzzy_match_score(&matcher, &node.name, query).map(|score| (id, (score, node.depth)))
        })
        .max_by(|(_, (a, a_depth)), (_, (b, b_depth))| a.cmp(b).then(b_depth.cmp(a_depth)))?;

    let node = hierarchy.node(best);
    if node.is_leaf() {
        node.parent
    } else {
        Some(best)
    }
}
