use thiserror::Error;

/// Structural failures surfaced by target resolution and ordering.
///
/// Hook and driver failures are not represented here: hooks are best-effort
/// and driver failures are reported per container.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerrickError {
    /// The target names neither a group nor a container.
    #[error("alvo '{target}' não é um grupo nem um container")]
    UnknownTarget {
        /// The target as given on the command line.
        target: String,
    },

    /// Topological placement could not place every container.
    #[error("dependência cíclica detectada entre: {}", unresolved.join(", "))]
    CyclicDependency {
        /// Containers left without an empty dependency set.
        unresolved: Vec<String>,
    },

    /// A cascade value is not one of `none`, `all`, `link`, `net`, `volumesFrom`.
    #[error("valor de cascata inválido '{value}' (esperado none, all, link, net ou volumesFrom)")]
    InvalidCascade {
        /// The rejected value.
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, DerrickError>;
