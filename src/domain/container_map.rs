use super::{Container, Dependencies};
use crate::error::{DerrickError, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Named, ordered lists of container names used as targeting shorthands.
pub type Groups = BTreeMap<String, Vec<String>>;

/// The universe of declared containers, keyed and iterated by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerMap {
    containers: BTreeMap<String, Container>,
}

impl ContainerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container, returning the one previously stored under the same name.
    pub fn insert(&mut self, container: Container) -> Option<Container> {
        self.containers.insert(container.name.clone(), container)
    }

    pub fn get(&self, name: &str) -> Option<&Container> {
        self.containers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.containers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    /// Names sorted lexicographically, ignoring dependencies.
    pub fn alphabetical(&self, reversed: bool) -> Vec<String> {
        let mut names: Vec<String> = self.containers.keys().cloned().collect();
        if reversed {
            names.reverse();
        }
        names
    }

    /// Orders every container so that dependencies come before their
    /// dependents, or after them when `reversed` is set.
    ///
    /// References to containers outside this map are ignored. Among the
    /// containers ready to be placed, the lexicographically smallest goes
    /// first, which makes the result deterministic. For an acyclic map the
    /// reversed order is exactly the forward order backwards.
    ///
    /// The reversed walk finishes from the dependents side whatever the
    /// forward placement left stuck: it places containers no pending
    /// container depends on, and when every one is depended on it breaks the
    /// cycle at the smallest container not depending on itself. A cycle can
    /// therefore fail forwards yet resolve in reverse.
    ///
    /// # Errors
    ///
    /// Returns [`DerrickError::CyclicDependency`] when some containers can
    /// never be placed.
    pub fn order(&self, reversed: bool) -> Result<Vec<String>> {
        let mut pending: BTreeMap<&str, Dependencies> = self
            .containers
            .iter()
            .map(|(name, container)| {
                let mut deps = container.dependencies().clone();
                deps.all.retain(|dep| self.contains(dep));
                (name.as_str(), deps)
            })
            .collect();

        let placed = place_dependencies_first(&mut pending);

        if pending.is_empty() {
            let mut order = placed;
            if reversed {
                order.reverse();
            }
            return Ok(order);
        }

        if !reversed {
            return Err(stuck(&pending));
        }

        let mut order = place_dependents_first(pending)?;
        order.extend(placed.into_iter().rev());
        Ok(order)
    }

    /// Filters the map down to `names` plus, optionally, everything that
    /// depends on them (`include_descendants`) and everything they depend on
    /// (`include_ancestors`).
    ///
    /// Both directions expand together until nothing changes, so with both
    /// flags set the whole connected component is kept. Unknown names and
    /// dangling references contribute nothing.
    pub fn subset<S: AsRef<str>>(
        &self,
        names: &[S],
        include_descendants: bool,
        include_ancestors: bool,
    ) -> ContainerMap {
        let mut included: BTreeSet<&str> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.contains(name))
            .collect();

        let mut changed = true;
        while changed {
            changed = false;

            for (name, container) in &self.containers {
                if included.contains(name.as_str()) {
                    continue;
                }

                let is_descendant = include_descendants
                    && container
                        .dependencies()
                        .all
                        .iter()
                        .any(|dep| included.contains(dep.as_str()));

                let is_ancestor = include_ancestors
                    && included.iter().any(|member| {
                        self.containers
                            .get(*member)
                            .is_some_and(|c| c.dependencies().includes(name))
                    });

                if is_descendant || is_ancestor {
                    included.insert(name.as_str());
                    changed = true;
                }
            }
        }

        self.containers
            .iter()
            .filter(|(name, _)| included.contains(name.as_str()))
            .map(|(_, container)| container.clone())
            .collect()
    }
}

/// Places satisfied containers one by one, removing each from the remaining
/// sets. Whatever cannot be placed stays in `pending`.
fn place_dependencies_first(pending: &mut BTreeMap<&str, Dependencies>) -> Vec<String> {
    let mut order = Vec::with_capacity(pending.len());

    loop {
        let Some(next) = pending
            .iter()
            .find(|(_, deps)| deps.satisfied())
            .map(|(name, _)| *name)
        else {
            break;
        };

        pending.remove(next);
        for deps in pending.values_mut() {
            deps.remove(next);
        }
        order.push(next.to_string());
    }

    order
}

fn place_dependents_first(mut pending: BTreeMap<&str, Dependencies>) -> Result<Vec<String>> {
    let mut order = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let free = pending
            .keys()
            .copied()
            .find(|name| !pending.values().any(|deps| deps.includes(name)));

        let next = match free {
            Some(name) => name,
            None => {
                let Some(name) = pending
                    .iter()
                    .find(|(name, deps)| !deps.includes(name))
                    .map(|(name, _)| *name)
                else {
                    return Err(stuck(&pending));
                };
                debug!("Quebrando ciclo em '{}' na ordem reversa", name);
                name
            }
        };

        pending.remove(next);
        order.push(next.to_string());
    }

    Ok(order)
}

fn stuck(pending: &BTreeMap<&str, Dependencies>) -> DerrickError {
    let unresolved: Vec<String> = pending.keys().map(|n| n.to_string()).collect();
    debug!("Ordering stuck with {:?} unresolved", unresolved);
    DerrickError::CyclicDependency { unresolved }
}

impl FromIterator<Container> for ContainerMap {
    fn from_iter<I: IntoIterator<Item = Container>>(iter: I) -> Self {
        let mut map = Self::new();
        for container in iter {
            map.insert(container);
        }
        map
    }
}

impl<'a> IntoIterator for &'a ContainerMap {
    type Item = &'a Container;
    type IntoIter = std::collections::btree_map::Values<'a, String, Container>;

    fn into_iter(self) -> Self::IntoIter {
        self.containers.values()
    }
}
