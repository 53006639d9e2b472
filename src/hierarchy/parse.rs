use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::InvalidDataError;

use super::Hierarchy;

/// One record of the source tree, as supplied by the data file.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
    pub name: String,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    pub fn children(&self) -> &[RawNode] {
        self.children.as_deref().unwrap_or_default()
    }
}

pub fn parse_raw_node(raw: &str) -> Result<RawNode, InvalidDataError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn load_hierarchy(path: &Path) -> Result<Hierarchy> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read hierarchy from {}", path.display()))?;
    let root = parse_raw_node(&raw)
        .with_context(|| format!("failed to decode hierarchy in {}", path.display()))?;
    let hierarchy = Hierarchy::build(&root)
        .with_context(|| format!("invalid hierarchy in {}", path.display()))?;
    Ok(hierarchy)
}
