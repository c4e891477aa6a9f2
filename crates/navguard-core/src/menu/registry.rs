//! Static menu registry.
//!
//! Holds one `MenuNode` per `MenuType` in a slot table indexed by
//! `MenuType::index()`, plus the exact-match label table. Built once at
//! startup and never mutated. Construction validates the parent chains
//! (fatal) and reachability from the root (reported, not fatal).

use std::collections::{BTreeMap, VecDeque};

use navguard_types::error::{NavError, RegistryError};
use navguard_types::menu::{ButtonAction, MenuNode, MenuType};

use super::catalog;

/// Labels starting with this prefix navigate to the current menu's parent.
pub const BACK_LABEL_PREFIX: &str = "⬅️";

/// Non-fatal findings from registry validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryReport {
    /// Non-root menus that no chain of button labels leads to.
    pub unreachable: Vec<MenuType>,
    /// Grid labels that are neither in the label table nor back labels.
    pub dangling_labels: Vec<String>,
}

impl RegistryReport {
    pub fn is_clean(&self) -> bool {
        self.unreachable.is_empty() && self.dangling_labels.is_empty()
    }
}

/// Immutable menu table with label resolution.
#[derive(Debug, Clone)]
pub struct MenuRegistry {
    nodes: Vec<MenuNode>,
    labels: BTreeMap<String, ButtonAction>,
}

impl MenuRegistry {
    /// Build and validate a registry.
    ///
    /// Fails if any variant lacks a node, a variant is declared twice, the
    /// root has a parent, or some parent chain does not terminate at the
    /// root. Unreachable menus and dangling labels are logged at `warn` and
    /// returned in the report.
    pub fn new(
        nodes: Vec<MenuNode>,
        labels: BTreeMap<String, ButtonAction>,
    ) -> Result<(Self, RegistryReport), RegistryError> {
        let mut slots: Vec<Option<MenuNode>> = vec![None; MenuType::ALL.len()];
        for node in nodes {
            let slot = &mut slots[node.menu_type.index()];
            if slot.is_some() {
                return Err(RegistryError::DuplicateNode(node.menu_type));
            }
            *slot = Some(node);
        }

        let mut table = Vec::with_capacity(slots.len());
        for (menu, slot) in MenuType::ALL.into_iter().zip(slots) {
            table.push(slot.ok_or(RegistryError::MissingNode(menu))?);
        }

        let registry = Self {
            nodes: table,
            labels,
        };
        registry.check_parents()?;

        let report = registry.report();
        for menu in &report.unreachable {
            tracing::warn!(menu = %menu, "menu is unreachable from the root via button labels");
        }
        for label in &report.dangling_labels {
            tracing::warn!(label = %label, "button label has no action");
        }

        Ok((registry, report))
    }

    /// The built-in menu table.
    pub fn builtin() -> Result<(Self, RegistryReport), RegistryError> {
        Self::new(catalog::default_nodes(), catalog::default_labels())
    }

    pub fn get(&self, menu: MenuType) -> &MenuNode {
        &self.nodes[menu.index()]
    }

    /// Look up a node by its string tag (durable rows, callback payloads).
    pub fn get_by_tag(&self, tag: &str) -> Result<&MenuNode, NavError> {
        let menu: MenuType = tag.parse()?;
        Ok(self.get(menu))
    }

    pub fn root(&self) -> &MenuNode {
        self.get(MenuType::ROOT)
    }

    /// The parent of `menu`, or the root when it has none (including the
    /// root itself).
    pub fn resolve_back(&self, menu: MenuType) -> &MenuNode {
        match self.get(menu).parent {
            Some(parent) => self.get(parent),
            None => self.root(),
        }
    }

    /// Resolve a button label. Back labels win over the exact-match table;
    /// unknown labels return None.
    pub fn resolve_label(&self, label: &str) -> Option<ButtonAction> {
        if is_back_label(label) {
            return Some(ButtonAction::Back);
        }
        self.labels.get(label).cloned()
    }

    /// Declared ancestors of `menu`, nearest first. The walk stops at the
    /// first node without a parent, whose effective parent is the root.
    pub fn parent_chain(&self, menu: MenuType) -> Vec<MenuType> {
        let mut chain = Vec::new();
        let mut current = menu;
        while let Some(parent) = self.get(current).parent {
            if chain.len() >= MenuType::ALL.len() {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MenuNode> {
        self.nodes.iter()
    }

    /// Label table in label order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &ButtonAction)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn check_parents(&self) -> Result<(), RegistryError> {
        let root = self.root();
        if root.parent.is_some() {
            return Err(RegistryError::RootHasParent(MenuType::ROOT));
        }

        for node in &self.nodes {
            if node.menu_type.is_root() {
                continue;
            }
            // A parentless node hangs off the root, so any chain that ends
            // is fine. A chain longer than the number of menus must revisit one.
            let mut current = node.menu_type;
            let mut hops = 0;
            while let Some(parent) = self.get(current).parent {
                hops += 1;
                if hops > MenuType::ALL.len() {
                    return Err(RegistryError::ParentCycle(node.menu_type));
                }
                current = parent;
            }
        }

        Ok(())
    }

    /// Breadth-first walk from the root over every node's button grid.
    fn report(&self) -> RegistryReport {
        let mut visited = vec![false; MenuType::ALL.len()];
        let mut queue = VecDeque::from([MenuType::ROOT]);
        visited[MenuType::ROOT.index()] = true;

        let mut dangling = Vec::new();

        while let Some(menu) = queue.pop_front() {
            for label in self.get(menu).labels() {
                let next = match self.resolve_label(label) {
                    Some(ButtonAction::Menu(target)) => target,
                    Some(ButtonAction::Back) => self.resolve_back(menu).menu_type,
                    Some(_) => continue,
                    None => {
                        if !dangling.iter().any(|d: &String| d == label) {
                            dangling.push(label.to_string());
                        }
                        continue;
                    }
                };
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }

        RegistryReport {
            unreachable: MenuType::ALL
                .into_iter()
                .filter(|m| !visited[m.index()])
                .collect(),
            dangling_labels: dangling,
        }
    }
}

/// Whether a label follows the back-button convention.
pub fn is_back_label(label: &str) -> bool {
    label.starts_with(BACK_LABEL_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> MenuRegistry {
        MenuRegistry::builtin().unwrap().0
    }

    /// A minimal valid node set: every menu hangs directly off the root.
    fn flat_nodes() -> Vec<MenuNode> {
        MenuType::ALL
            .into_iter()
            .map(|m| {
                let node = MenuNode::new(m, m.as_tag());
                if m.is_root() { node } else { node.with_parent(MenuType::ROOT) }
            })
            .collect()
    }

    #[test]
    fn test_builtin_registry_is_clean() {
        let (_, report) = MenuRegistry::builtin().unwrap();
        assert!(report.is_clean(), "unexpected findings: {report:?}");
    }

    #[test]
    fn test_every_non_root_menu_reachable() {
        let (_, report) = MenuRegistry::builtin().unwrap();
        assert!(report.unreachable.is_empty());
    }

    #[test]
    fn test_unreachable_menu_is_flagged() {
        let mut labels = catalog::default_labels();
        labels.remove("🪙 Tokens");
        let (_, report) = MenuRegistry::new(catalog::default_nodes(), labels).unwrap();
        assert_eq!(report.unreachable, vec![MenuType::Tokens]);
        assert_eq!(report.dangling_labels, vec!["🪙 Tokens".to_string()]);
    }

    #[test]
    fn test_flat_registry_without_labels_flags_everything_but_root() {
        let (_, report) = MenuRegistry::new(flat_nodes(), BTreeMap::new()).unwrap();
        assert_eq!(report.unreachable.len(), MenuType::ALL.len() - 1);
        assert!(!report.unreachable.contains(&MenuType::ROOT));
    }

    #[test]
    fn test_missing_node_is_rejected() {
        let nodes: Vec<MenuNode> = flat_nodes()
            .into_iter()
            .filter(|n| n.menu_type != MenuType::Help)
            .collect();
        let err = MenuRegistry::new(nodes, BTreeMap::new()).unwrap_err();
        assert_eq!(err, RegistryError::MissingNode(MenuType::Help));
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let mut nodes = flat_nodes();
        nodes.push(MenuNode::new(MenuType::Pools, "again").with_parent(MenuType::ROOT));
        let err = MenuRegistry::new(nodes, BTreeMap::new()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateNode(MenuType::Pools));
    }

    #[test]
    fn test_root_with_parent_is_rejected() {
        let mut nodes = flat_nodes();
        nodes[0] = MenuNode::new(MenuType::Main, "main").with_parent(MenuType::Help);
        let err = MenuRegistry::new(nodes, BTreeMap::new()).unwrap_err();
        assert_eq!(err, RegistryError::RootHasParent(MenuType::Main));
    }

    #[test]
    fn test_parentless_menu_backs_out_to_root() {
        let mut nodes = flat_nodes();
        nodes[MenuType::Wallet.index()] = MenuNode::new(MenuType::Wallet, "wallet");
        nodes[MenuType::Portfolio.index()] =
            MenuNode::new(MenuType::Portfolio, "portfolio").with_parent(MenuType::Wallet);
        let (registry, _) = MenuRegistry::new(nodes, BTreeMap::new()).unwrap();

        assert_eq!(registry.resolve_back(MenuType::Wallet).menu_type, MenuType::ROOT);
        assert_eq!(registry.resolve_back(MenuType::Portfolio).menu_type, MenuType::Wallet);
        assert_eq!(registry.parent_chain(MenuType::Portfolio), vec![MenuType::Wallet]);
    }

    #[test]
    fn test_parent_cycle_is_rejected() {
        let mut nodes = flat_nodes();
        nodes[MenuType::Pools.index()] =
            MenuNode::new(MenuType::Pools, "pools").with_parent(MenuType::Tokens);
        nodes[MenuType::Tokens.index()] =
            MenuNode::new(MenuType::Tokens, "tokens").with_parent(MenuType::Pools);
        let err = MenuRegistry::new(nodes, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, RegistryError::ParentCycle(_)));
    }

    #[test]
    fn test_resolve_back_returns_declared_parent_or_root() {
        let registry = builtin();
        for node in registry.nodes() {
            let back = registry.resolve_back(node.menu_type).menu_type;
            assert_eq!(back, node.parent.unwrap_or(MenuType::ROOT));
        }
    }

    #[test]
    fn test_repeated_back_reaches_root_within_bound() {
        let registry = builtin();
        for start in MenuType::ALL {
            let mut current = start;
            let mut steps = 0;
            while !current.is_root() {
                current = registry.resolve_back(current).menu_type;
                steps += 1;
                assert!(steps <= MenuType::ALL.len(), "no root from {start}");
            }
        }
    }

    #[test]
    fn test_root_back_is_root() {
        let registry = builtin();
        assert_eq!(registry.resolve_back(MenuType::Main).menu_type, MenuType::Main);
    }

    #[test]
    fn test_parent_chain() {
        let registry = builtin();
        assert_eq!(
            registry.parent_chain(MenuType::Pools),
            vec![MenuType::Explore, MenuType::Main]
        );
        assert!(registry.parent_chain(MenuType::Main).is_empty());
    }

    #[test]
    fn test_resolve_label_exact_match_only() {
        let registry = builtin();
        assert_eq!(
            registry.resolve_label("🔍 Explore"),
            Some(ButtonAction::Menu(MenuType::Explore))
        );
        assert_eq!(registry.resolve_label("🔍 explore"), None);
        assert_eq!(registry.resolve_label("Explore"), None);
        assert_eq!(
            registry.resolve_label("📈 Trending"),
            Some(ButtonAction::Command("/trending".to_string()))
        );
    }

    #[test]
    fn test_back_labels_resolve_by_prefix() {
        let registry = builtin();
        assert_eq!(registry.resolve_label("⬅️ Back"), Some(ButtonAction::Back));
        assert_eq!(
            registry.resolve_label("⬅️ Back to Explore"),
            Some(ButtonAction::Back)
        );
        assert_eq!(registry.resolve_label("⬅️"), Some(ButtonAction::Back));
    }

    #[test]
    fn test_get_by_tag() {
        let registry = builtin();
        assert_eq!(registry.get_by_tag("pools").unwrap().menu_type, MenuType::Pools);
        assert!(matches!(
            registry.get_by_tag("lottery"),
            Err(NavError::UnknownMenu(_))
        ));
    }
}
