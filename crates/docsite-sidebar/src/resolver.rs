//! Sidebar resolution against a validated site configuration.
//!
//! [`SidebarSet::resolve`] is the second half of the load pipeline: it takes
//! the raw sidebar definitions and the already-validated
//! [`SiteConfig`], confirms every registration's sidebar reference names a
//! defined tree, and walks each tree depth-first to reject duplicate sibling
//! documents. The result is the full ordered tree set or an error, never a
//! partial set.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use docsite_config::SiteConfig;
use serde::{Deserialize, Serialize};

use crate::node::{SidebarNode, Walk};

/// Raw sidebar definitions: a mapping from tree name to node list.
///
/// This is the top-level shape of `sidebars.yaml`:
///
/// ```yaml
/// mySidebar:
///   - type: doc
///     id: welcome
/// ```
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSidebars(pub BTreeMap<String, Vec<SidebarNode>>);

impl RawSidebars {
    /// Parse raw sidebar definitions from YAML content.
    ///
    /// Empty content yields an empty definition set.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError::Parse`] if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, SidebarError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(trimmed)?)
    }
}

/// Sidebar error.
///
/// Like configuration errors, all variants are load-time and terminal.
#[derive(Debug, thiserror::Error)]
pub enum SidebarError {
    /// File not found.
    #[error("Sidebar file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A plugin registration references a sidebar that is not defined.
    #[error("Plugin \"{plugin}\" references sidebar \"{sidebar}\" which is not defined")]
    UnresolvedSidebarRef {
        /// Id of the referencing registration.
        plugin: String,
        /// The sidebar name that did not resolve.
        sidebar: String,
    },
    /// Two sibling nodes under one parent reference the same document.
    #[error("Duplicate sibling doc \"{doc_id}\" in {parent}")]
    DuplicateSiblingNode {
        /// The duplicated document identifier.
        doc_id: String,
        /// The parent holding both siblings, e.g. `category "How To"` or
        /// `sidebar "mySidebar"` for top-level nodes.
        parent: String,
    },
}

/// Resolved, ordered set of named sidebar trees.
///
/// Produced by [`SidebarSet::resolve`]; immutable for the duration of a
/// build. Re-serializing the set preserves node order exactly.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct SidebarSet {
    trees: BTreeMap<String, Vec<SidebarNode>>,
}

impl SidebarSet {
    /// Load sidebar definitions from a YAML file and resolve them.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError::NotFound`] if the file does not exist, and
    /// any error from [`SidebarSet::resolve`].
    pub fn load(path: &Path, config: &SiteConfig) -> Result<Self, SidebarError> {
        if !path.exists() {
            return Err(SidebarError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let raw = RawSidebars::from_yaml(&content)?;
        Self::resolve(raw, config)
    }

    /// Resolve raw sidebar definitions against a validated configuration.
    ///
    /// Confirms every registration's `sidebar_ref` names a defined tree,
    /// then walks each tree depth-first in pre-order to reject duplicate
    /// sibling documents. The same document id under *different* parents is
    /// legal.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError::UnresolvedSidebarRef`] or
    /// [`SidebarError::DuplicateSiblingNode`]; on error no tree set is
    /// returned.
    pub fn resolve(raw: RawSidebars, config: &SiteConfig) -> Result<Self, SidebarError> {
        for plugin in &config.plugins {
            if !raw.0.contains_key(&plugin.sidebar_ref) {
                return Err(SidebarError::UnresolvedSidebarRef {
                    plugin: plugin.id.clone(),
                    sidebar: plugin.sidebar_ref.clone(),
                });
            }
        }

        for (name, items) in &raw.0 {
            check_siblings(items, &format!("sidebar \"{name}\""))?;
        }

        tracing::info!(trees = raw.0.len(), "Resolved sidebar trees");

        Ok(Self { trees: raw.0 })
    }

    /// Get a tree's top-level nodes by name.
    #[must_use]
    pub fn tree(&self, name: &str) -> Option<&[SidebarNode]> {
        self.trees.get(name).map(Vec::as_slice)
    }

    /// Iterate over defined tree names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Depth-first pre-order walk over a named tree.
    ///
    /// The iteration order is the rendered navigation order.
    #[must_use]
    pub fn walk(&self, name: &str) -> Option<Walk<'_>> {
        self.tree(name).map(Walk::new)
    }

    /// Document identifiers of a named tree, in pre-order.
    #[must_use]
    pub fn doc_ids(&self, name: &str) -> Option<Vec<&str>> {
        self.walk(name)
            .map(|walk| walk.filter_map(SidebarNode::doc_id).collect())
    }

    /// Number of defined trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether no trees are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Serialize the resolved set back to YAML.
    ///
    /// Node order within each tree is preserved exactly as declared.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError::Parse`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, SidebarError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Reject duplicate sibling document ids, depth-first in pre-order.
fn check_siblings(items: &[SidebarNode], parent: &str) -> Result<(), SidebarError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    for node in items {
        if let Some(id) = node.doc_id()
            && !seen.insert(id)
        {
            return Err(SidebarError::DuplicateSiblingNode {
                doc_id: id.to_owned(),
                parent: parent.to_owned(),
            });
        }
        if let SidebarNode::Category { label, items } = node {
            check_siblings(items, &format!("category \"{label}\""))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsite_config::{PluginRegistration, SiteConfig};
    use pretty_assertions::assert_eq;

    fn doc(id: &str) -> SidebarNode {
        SidebarNode::Doc {
            id: id.to_owned(),
            label: None,
        }
    }

    fn category(label: &str, items: Vec<SidebarNode>) -> SidebarNode {
        SidebarNode::Category {
            label: label.to_owned(),
            items,
        }
    }

    /// Configuration with one registration per (id, sidebar_ref) pair.
    fn config_with(plugins: &[(&str, &str)]) -> SiteConfig {
        SiteConfig {
            plugins: plugins
                .iter()
                .map(|(id, sidebar)| PluginRegistration {
                    id: (*id).to_owned(),
                    content_path: PathBuf::from("/docs"),
                    route_base_path: (*id).to_owned(),
                    sidebar_ref: (*sidebar).to_owned(),
                    edit_url: None,
                    versions: BTreeMap::new(),
                })
                .collect(),
            static_directories: Vec::new(),
            config_path: None,
        }
    }

    fn indexer_sidebars() -> RawSidebars {
        RawSidebars(BTreeMap::from([(
            "mySidebar".to_owned(),
            vec![
                doc("welcome"),
                category("How To", vec![doc("how_to/query_outputs")]),
            ],
        )]))
    }

    #[test]
    fn test_resolve_preserves_declared_order() {
        let config = config_with(&[("docs", "mySidebar")]);
        let set = SidebarSet::resolve(indexer_sidebars(), &config).unwrap();

        assert_eq!(
            set.doc_ids("mySidebar"),
            Some(vec!["welcome", "how_to/query_outputs"])
        );
        let labels: Vec<Option<&str>> = set
            .walk("mySidebar")
            .unwrap()
            .map(SidebarNode::label)
            .collect();
        assert_eq!(labels, vec![None, Some("How To"), None]);
    }

    #[test]
    fn test_reserialization_preserves_order() {
        let config = config_with(&[("docs", "mySidebar")]);
        let raw = RawSidebars(BTreeMap::from([(
            "mySidebar".to_owned(),
            vec![
                doc("zeta"),
                doc("alpha"),
                category("Middle", vec![doc("omega"), doc("beta")]),
                doc("gamma"),
            ],
        )]));
        let set = SidebarSet::resolve(raw, &config).unwrap();

        let yaml = set.to_yaml().unwrap();
        let reparsed = RawSidebars::from_yaml(&yaml).unwrap();
        let reparsed_ids: Vec<&str> = Walk::new(&reparsed.0["mySidebar"])
            .filter_map(SidebarNode::doc_id)
            .collect();
        assert_eq!(reparsed_ids, vec!["zeta", "alpha", "omega", "beta", "gamma"]);
    }

    #[test]
    fn test_unresolved_sidebar_ref() {
        let config = config_with(&[("docs", "missingSidebar")]);
        let err = SidebarSet::resolve(indexer_sidebars(), &config).unwrap_err();
        match err {
            SidebarError::UnresolvedSidebarRef { plugin, sidebar } => {
                assert_eq!(plugin, "docs");
                assert_eq!(sidebar, "missingSidebar");
            }
            other => panic!("Expected UnresolvedSidebarRef, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_ref_message_names_sidebar() {
        let config = config_with(&[("docs", "missingSidebar")]);
        let err = SidebarSet::resolve(indexer_sidebars(), &config).unwrap_err();
        assert!(err.to_string().contains("missingSidebar"));
    }

    #[test]
    fn test_empty_definitions_with_registration_fail() {
        let config = config_with(&[("docs", "mySidebar")]);
        let err = SidebarSet::resolve(RawSidebars::default(), &config).unwrap_err();
        assert!(matches!(err, SidebarError::UnresolvedSidebarRef { .. }));
    }

    #[test]
    fn test_duplicate_siblings_in_category() {
        let config = config_with(&[("docs", "mySidebar")]);
        let raw = RawSidebars(BTreeMap::from([(
            "mySidebar".to_owned(),
            vec![category("How To", vec![doc("a"), doc("b"), doc("a")])],
        )]));
        let err = SidebarSet::resolve(raw, &config).unwrap_err();
        match err {
            SidebarError::DuplicateSiblingNode { doc_id, parent } => {
                assert_eq!(doc_id, "a");
                assert_eq!(parent, "category \"How To\"");
            }
            other => panic!("Expected DuplicateSiblingNode, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_siblings_at_top_level() {
        let config = config_with(&[("docs", "mySidebar")]);
        let raw = RawSidebars(BTreeMap::from([(
            "mySidebar".to_owned(),
            vec![doc("welcome"), doc("welcome")],
        )]));
        let err = SidebarSet::resolve(raw, &config).unwrap_err();
        match err {
            SidebarError::DuplicateSiblingNode { doc_id, parent } => {
                assert_eq!(doc_id, "welcome");
                assert_eq!(parent, "sidebar \"mySidebar\"");
            }
            other => panic!("Expected DuplicateSiblingNode, got {other:?}"),
        }
    }

    #[test]
    fn test_same_doc_in_different_categories_allowed() {
        let config = config_with(&[("docs", "mySidebar")]);
        let raw = RawSidebars(BTreeMap::from([(
            "mySidebar".to_owned(),
            vec![
                category("Guides", vec![doc("shared")]),
                category("Reference", vec![doc("shared")]),
            ],
        )]));
        assert!(SidebarSet::resolve(raw, &config).is_ok());
    }

    #[test]
    fn test_unreferenced_trees_are_still_validated() {
        // Only "main" is referenced; the orphan tree still fails the walk
        let config = config_with(&[("docs", "main")]);
        let raw = RawSidebars(BTreeMap::from([
            ("main".to_owned(), vec![doc("welcome")]),
            ("orphan".to_owned(), vec![doc("dup"), doc("dup")]),
        ]));
        let err = SidebarSet::resolve(raw, &config).unwrap_err();
        assert!(matches!(err, SidebarError::DuplicateSiblingNode { .. }));
    }

    #[test]
    fn test_multiple_plugins_share_one_tree() {
        let config = config_with(&[("api", "main"), ("guides", "main")]);
        let raw = RawSidebars(BTreeMap::from([("main".to_owned(), vec![doc("welcome")])]));
        let set = SidebarSet::resolve(raw, &config).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["main"]);
    }

    #[test]
    fn test_tree_lookup_unknown_name() {
        let config = config_with(&[]);
        let raw = RawSidebars::default();
        let set = SidebarSet::resolve(raw, &config).unwrap();
        assert!(set.is_empty());
        assert!(set.tree("missing").is_none());
        assert!(set.walk("missing").is_none());
        assert!(set.doc_ids("missing").is_none());
    }

    #[test]
    fn test_from_yaml_empty_content() {
        let raw = RawSidebars::from_yaml("  \n\t ").unwrap();
        assert!(raw.0.is_empty());
    }

    #[test]
    fn test_from_yaml_malformed() {
        let err = RawSidebars::from_yaml("mySidebar: [unclosed").unwrap_err();
        assert!(matches!(err, SidebarError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let config = config_with(&[]);
        let err =
            SidebarSet::load(Path::new("/nonexistent/sidebars.yaml"), &config).unwrap_err();
        assert!(matches!(err, SidebarError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sidebars.yaml");
        std::fs::write(
            &path,
            r"
mySidebar:
  - type: doc
    id: welcome
  - type: category
    label: How To
    items:
      - type: doc
        id: how_to/query_outputs
        label: Query the Indexer for Outputs
",
        )
        .unwrap();

        let config = config_with(&[("docs", "mySidebar")]);
        let set = SidebarSet::load(&path, &config).unwrap();
        assert_eq!(
            set.doc_ids("mySidebar"),
            Some(vec!["welcome", "how_to/query_outputs"])
        );
    }

    #[test]
    fn test_config_validation_precedes_resolution() {
        // Two registrations with the same id fail during config load, so
        // resolution over the sidebar definitions is never reachable.
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        let config_path = dir.path().join("docsite.toml");
        std::fs::write(
            &config_path,
            r#"
[[plugins]]
id = "docs"
path = "docs"
route_base_path = "a"
sidebar = "mySidebar"

[[plugins]]
id = "docs"
path = "docs"
route_base_path = "b"
sidebar = "missingSidebar"
"#,
        )
        .unwrap();

        let err = SiteConfig::load(Some(&config_path)).unwrap_err();
        assert!(matches!(
            err,
            docsite_config::ConfigError::DuplicateId { ref id } if id == "docs"
        ));
    }
}
