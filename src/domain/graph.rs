//! Dependency graph and target resolution.
//!
//! The graph keeps, for every declared container, the edges to the
//! containers it depends on and the implicit reverse edges to the containers
//! depending on it. References to undeclared containers never become edges.

use super::{ContainerMap, DependencyKind, Groups};
use crate::error::{DerrickError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which edges a cascading traversal may follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cascade {
    #[default]
    None,
    All,
    Only(DependencyKind),
}

impl Cascade {
    fn follows(&self, kind: DependencyKind) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Only(only) => *only == kind,
        }
    }
}

impl fmt::Display for Cascade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::All => f.write_str("all"),
            Self::Only(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for Cascade {
    type Err = DerrickError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "none" => Ok(Self::None),
            "all" => Ok(Self::All),
            other => other
                .parse()
                .map(Self::Only)
                .map_err(|value| DerrickError::InvalidCascade { value }),
        }
    }
}

/// What a command should act on before cascading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelection {
    /// A group or container name; empty selects the `default` group or everything.
    pub target: String,
    /// Forward traversal: what the target depends on.
    pub cascade_dependencies: Cascade,
    /// Reverse traversal: what depends on the target.
    pub cascade_affected: Cascade,
}

#[derive(Debug, Clone, Copy)]
enum Traversal {
    Dependencies,
    Dependents,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependencies: BTreeMap<String, Vec<(DependencyKind, String)>>,
    dependents: BTreeMap<String, Vec<(DependencyKind, String)>>,
}

impl DependencyGraph {
    pub fn build(containers: &ContainerMap) -> Self {
        let mut graph = Self::default();

        for container in containers {
            let deps = container.dependencies();
            for kind in DependencyKind::ALL {
                for target in deps.for_kind(kind) {
                    if !containers.contains(target) {
                        debug!(
                            "Ignorando dependência {} '{}' de '{}': container não declarado",
                            kind, target, container.name
                        );
                        continue;
                    }
                    graph
                        .dependencies
                        .entry(container.name.clone())
                        .or_default()
                        .push((kind, target.clone()));
                    graph
                        .dependents
                        .entry(target.clone())
                        .or_default()
                        .push((kind, container.name.clone()));
                }
            }
        }

        graph
    }

    /// Containers `name` depends on through edges `cascade` follows.
    pub fn dependencies_of<'a>(&'a self, name: &str, cascade: Cascade) -> impl Iterator<Item = &'a str> {
        Self::neighbours(&self.dependencies, name, cascade)
    }

    /// Containers depending on `name` through edges `cascade` follows.
    pub fn dependents_of<'a>(&'a self, name: &str, cascade: Cascade) -> impl Iterator<Item = &'a str> {
        Self::neighbours(&self.dependents, name, cascade)
    }

    fn neighbours<'a>(
        edges: &'a BTreeMap<String, Vec<(DependencyKind, String)>>,
        name: &str,
        cascade: Cascade,
    ) -> impl Iterator<Item = &'a str> {
        edges
            .get(name)
            .into_iter()
            .flatten()
            .filter(move |(kind, _)| cascade.follows(*kind))
            .map(|(_, target)| target.as_str())
    }

    fn closure<'a>(&'a self, start: &[&'a str], cascade: Cascade, traversal: Traversal) -> BTreeSet<&'a str> {
        let mut reached = BTreeSet::new();
        let mut queue: Vec<&str> = start.to_vec();

        while let Some(name) = queue.pop() {
            let next: Vec<&str> = match traversal {
                Traversal::Dependencies => self.dependencies_of(name, cascade).collect(),
                Traversal::Dependents => self.dependents_of(name, cascade).collect(),
            };
            for neighbour in next {
                if reached.insert(neighbour) {
                    queue.push(neighbour);
                }
            }
        }

        reached
    }
}

/// Expands a target into the set of containers a command acts on.
pub struct TargetResolver<'a> {
    containers: &'a ContainerMap,
    groups: &'a Groups,
    graph: DependencyGraph,
}

impl<'a> TargetResolver<'a> {
    pub fn new(containers: &'a ContainerMap, groups: &'a Groups) -> Self {
        Self {
            containers,
            groups,
            graph: DependencyGraph::build(containers),
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Names targeted before any cascading, restricted to declared containers.
    ///
    /// An empty target means the `default` group when there is one and every
    /// container otherwise.
    pub fn explicitly_targeted(&self, target: &str) -> Vec<String> {
        let candidates: Vec<&str> = if target.is_empty() {
            match self.groups.get("default") {
                Some(members) => members.iter().map(String::as_str).collect(),
                None => self.containers.names().collect(),
            }
        } else if let Some(members) = self.groups.get(target) {
            members.iter().map(String::as_str).collect()
        } else {
            vec![target]
        };

        let mut seen = BTreeSet::new();
        candidates
            .into_iter()
            .filter(|name| self.containers.contains(name))
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect()
    }

    /// Resolves `selection` into a sorted, duplicate-free list of names.
    ///
    /// # Errors
    ///
    /// Returns [`DerrickError::UnknownTarget`] when a non-empty target names
    /// neither a group nor a container.
    pub fn determine_target(&self, selection: &TargetSelection) -> Result<Vec<String>> {
        let target = selection.target.as_str();
        if !target.is_empty() && !self.groups.contains_key(target) && !self.containers.contains(target) {
            return Err(DerrickError::UnknownTarget {
                target: target.to_string(),
            });
        }

        let explicit = self.explicitly_targeted(target);
        let start: Vec<&str> = explicit.iter().map(String::as_str).collect();

        let mut resolved: BTreeSet<&str> = start.iter().copied().collect();
        resolved.extend(
            self.graph
                .closure(&start, selection.cascade_dependencies, Traversal::Dependencies),
        );
        resolved.extend(
            self.graph
                .closure(&start, selection.cascade_affected, Traversal::Dependents),
        );

        debug!(
            "Alvo '{}' (dependências: {}, afetados: {}) resolvido para {:?}",
            target, selection.cascade_dependencies, selection.cascade_affected, resolved
        );

        Ok(resolved.into_iter().map(str::to_string).collect())
    }
}
