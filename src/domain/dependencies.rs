use super::RunSpec;
use std::fmt;
use std::str::FromStr;

/// The relation through which one container references another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    Link,
    Net,
    VolumesFrom,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 3] = [Self::Link, Self::Net, Self::VolumesFrom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Net => "net",
            Self::VolumesFrom => "volumesFrom",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(Self::Link),
            "net" => Ok(Self::Net),
            "volumesFrom" | "volumes-from" => Ok(Self::VolumesFrom),
            other => Err(other.to_string()),
        }
    }
}

/// Normalized dependencies of a single container.
///
/// `all` holds every referenced name exactly once, in link, volumes-from,
/// net order. The per-kind lists are subsets of `all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    pub all: Vec<String>,
    pub link: Vec<String>,
    pub volumes_from: Vec<String>,
    pub net: Option<String>,
}

impl Dependencies {
    /// Extracts the dependency model from raw run parameters.
    ///
    /// Link aliases are dropped, and the network mode only counts when it
    /// shares the namespace of another container (`container:<name>`).
    pub fn extract(run: &RunSpec) -> Self {
        let mut deps = Self::default();

        for entry in &run.link {
            let name = link_target(entry);
            if name.is_empty() {
                continue;
            }
            push_unique(&mut deps.link, name);
            push_unique(&mut deps.all, name);
        }

        for name in &run.volumes_from {
            if name.is_empty() {
                continue;
            }
            push_unique(&mut deps.volumes_from, name);
            push_unique(&mut deps.all, name);
        }

        if let Some(name) = run.net.as_deref().and_then(net_container) {
            push_unique(&mut deps.all, name);
            deps.net = Some(name.to_string());
        }

        deps
    }

    /// Whether `needle` appears anywhere in the dependencies.
    pub fn includes(&self, needle: &str) -> bool {
        self.all.iter().any(|name| name == needle)
    }

    pub fn includes_as_kind(&self, needle: &str, kind: DependencyKind) -> bool {
        self.for_kind(kind).iter().any(|name| name == needle)
    }

    /// Dependencies declared through exactly one relation.
    pub fn for_kind(&self, kind: DependencyKind) -> &[String] {
        match kind {
            DependencyKind::Link => &self.link,
            DependencyKind::VolumesFrom => &self.volumes_from,
            DependencyKind::Net => self.net.as_slice(),
        }
    }

    /// Link and net dependencies must be running; volumes-from ones only have to exist.
    pub fn must_run(&self, needle: &str) -> bool {
        self.net.as_deref() == Some(needle) || self.link.iter().any(|name| name == needle)
    }

    pub fn satisfied(&self) -> bool {
        self.all.is_empty()
    }

    /// Strips `resolved` from `all`. Per-kind lists are left untouched.
    pub fn remove(&mut self, resolved: &str) {
        self.all.retain(|name| name != resolved);
    }
}

fn link_target(entry: &str) -> &str {
    entry.split_once(':').map_or(entry, |(name, _alias)| name)
}

fn net_container(mode: &str) -> Option<&str> {
    mode.strip_prefix("container:").filter(|name| !name.is_empty())
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|existing| existing == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_spec(link: &[&str], net: Option<&str>, volumes_from: &[&str]) -> RunSpec {
        RunSpec {
            link: link.iter().map(|s| s.to_string()).collect(),
            net: net.map(str::to_string),
            volumes_from: volumes_from.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn extracts_all_kinds_in_order() {
        let deps = Dependencies::extract(&run_spec(&["a:b", "b:d"], Some("container:n"), &["c"]));

        assert_eq!(deps.all, vec!["a", "b", "c", "n"]);
        assert_eq!(deps.link, vec!["a", "b"]);
        assert_eq!(deps.volumes_from, vec!["c"]);
        assert_eq!(deps.net.as_deref(), Some("n"));
    }

    #[test]
    fn empty_run_spec_has_no_dependencies() {
        let deps = Dependencies::extract(&RunSpec::default());
        assert_eq!(deps, Dependencies::default());
        assert!(deps.satisfied());
    }

    #[test]
    fn multiple_aliases_collapse() {
        let deps = Dependencies::extract(&run_spec(&["a:b", "a:c"], None, &[]));
        assert_eq!(deps.all, vec!["a"]);
        assert_eq!(deps.link, vec!["a"]);
    }

    #[test]
    fn same_name_across_kinds_is_listed_once() {
        let deps = Dependencies::extract(&run_spec(&["db:database"], Some("container:db"), &["db"]));

        assert_eq!(deps.all, vec!["db"]);
        assert_eq!(deps.link, vec!["db"]);
        assert_eq!(deps.volumes_from, vec!["db"]);
        assert_eq!(deps.net.as_deref(), Some("db"));
    }

    #[test]
    fn link_without_alias_uses_whole_entry() {
        let deps = Dependencies::extract(&run_spec(&["cache"], None, &[]));
        assert_eq!(deps.link, vec!["cache"]);
    }

    #[test]
    fn plain_network_modes_are_ignored() {
        for mode in ["bridge", "host", "none", "", "container:"] {
            let deps = Dependencies::extract(&run_spec(&[], Some(mode), &[]));
            assert!(deps.net.is_none(), "mode {mode:?} should not be a dependency");
            assert!(deps.all.is_empty());
        }
    }

    #[test]
    fn must_run_covers_link_and_net_only() {
        let deps = Dependencies::extract(&run_spec(&["a:a"], Some("container:n"), &["v"]));

        assert!(deps.must_run("a"));
        assert!(deps.must_run("n"));
        assert!(!deps.must_run("v"));
        assert!(!deps.must_run("unknown"));
    }

    #[test]
    fn remove_only_touches_all() {
        let mut deps = Dependencies::extract(&run_spec(&["a:a", "b:b"], None, &[]));
        deps.remove("a");

        assert_eq!(deps.all, vec!["b"]);
        assert_eq!(deps.link, vec!["a", "b"]);
        assert!(!deps.satisfied());

        deps.remove("b");
        assert!(deps.satisfied());
    }

    #[test]
    fn for_kind_returns_empty_net_slice() {
        let deps = Dependencies::extract(&run_spec(&["a:a"], None, &[]));
        assert!(deps.for_kind(DependencyKind::Net).is_empty());
        assert!(deps.includes_as_kind("a", DependencyKind::Link));
        assert!(!deps.includes_as_kind("a", DependencyKind::VolumesFrom));
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("volumesFrom".parse(), Ok(DependencyKind::VolumesFrom));
        assert_eq!("link".parse(), Ok(DependencyKind::Link));
        assert!("links".parse::<DependencyKind>().is_err());
    }
}
