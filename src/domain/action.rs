use super::HookStage;
use std::fmt;

/// Whether an action walks the dependency order forwards or backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Dependencies before dependents.
    Ascending,
    /// Dependents before dependencies.
    Descending,
}

impl Direction {
    pub fn is_reversed(&self) -> bool {
        matches!(self, Self::Descending)
    }
}

/// A lifecycle transition applied to every targeted container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Provision,
    Run,
    Start,
    Stop,
    Kill,
    Pause,
    Unpause,
    Remove,
    Push,
    Status,
}

impl Action {
    /// The driver verb for this action.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Provision => "provision",
            Self::Run => "run",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Kill => "kill",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Remove => "rm",
            Self::Push => "push",
            Self::Status => "status",
        }
    }

    /// Hooks wrapped around the driver call, if any.
    pub fn hook_pair(&self) -> Option<(HookStage, HookStage)> {
        match self {
            Self::Run | Self::Start => Some((HookStage::PreStart, HookStage::PostStart)),
            Self::Stop | Self::Kill => Some((HookStage::PreStop, HookStage::PostStop)),
            _ => None,
        }
    }

    /// Run-class actions notify running link targets around the driver call.
    pub fn notifies_links(&self) -> bool {
        matches!(self, Self::Run | Self::Start)
    }

    /// Actions that still proceed, alphabetically, when the targeted
    /// containers cannot be ordered by their dependencies.
    pub fn forces_order(&self) -> bool {
        matches!(
            self,
            Self::Provision | Self::Stop | Self::Kill | Self::Pause | Self::Remove | Self::Push | Self::Status
        )
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Stop | Self::Kill | Self::Pause | Self::Remove => Direction::Descending,
            _ => Direction::Ascending,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Per-invocation switches handed to the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOptions {
    /// Remove an existing container before running it again.
    pub recreate: bool,
    /// Build images without the layer cache.
    pub no_cache: bool,
    /// Force-remove running containers.
    pub kill: bool,
    /// Do not truncate status output.
    pub no_trunc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopping_actions_walk_backwards() {
        for action in [Action::Stop, Action::Kill, Action::Pause, Action::Remove] {
            assert_eq!(action.direction(), Direction::Descending, "{action}");
        }
        for action in [Action::Provision, Action::Run, Action::Start, Action::Unpause] {
            assert_eq!(action.direction(), Direction::Ascending, "{action}");
        }
    }

    #[test]
    fn only_run_class_notifies_links() {
        assert!(Action::Run.notifies_links());
        assert!(Action::Start.notifies_links());
        assert!(!Action::Stop.notifies_links());
        assert!(!Action::Unpause.notifies_links());
    }

    #[test]
    fn only_starting_actions_require_a_dependency_order() {
        for action in [Action::Run, Action::Start, Action::Unpause] {
            assert!(!action.forces_order(), "{action}");
        }
        for action in [
            Action::Provision,
            Action::Stop,
            Action::Kill,
            Action::Pause,
            Action::Remove,
            Action::Push,
            Action::Status,
        ] {
            assert!(action.forces_order(), "{action}");
        }
    }

    #[test]
    fn hook_pairs() {
        assert_eq!(
            Action::Kill.hook_pair(),
            Some((HookStage::PreStop, HookStage::PostStop))
        );
        assert_eq!(Action::Push.hook_pair(), None);
        assert_eq!(Action::Remove.to_string(), "rm");
    }
}
