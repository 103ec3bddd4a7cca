pub mod action;
mod container;
mod container_map;
mod dependencies;
pub mod graph;
mod opt_bool;
pub mod traits;

pub use action::{Action, ActionOptions, Direction};
pub use container::{BuildSpec, CommandSpec, Container, HookStage, Hooks, RunSpec};
pub use container_map::{ContainerMap, Groups};
pub use dependencies::{Dependencies, DependencyKind};
pub use graph::{Cascade, DependencyGraph, TargetResolver, TargetSelection};
pub use opt_bool::OptBool;
pub use traits::{ContainerDriver, HookRunner};
