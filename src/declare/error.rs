use std::fmt;

/// Where a declaration error came from: the group (when known), the test
/// the declaration belongs to, and the raw declaration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationContext {
    pub group: Option<String>,
    pub test: String,
    pub raw: String,
}

impl fmt::Display for DeclarationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "near '{}': {}", self.test, self.raw)
    }
}

/// An error that aborts graph construction.
///
/// The first four variants are declaration-shape errors raised by the
/// validator; the rest are graph-integrity errors raised by the builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("missing group declaration {0}")]
    MissingGroup(DeclarationContext),

    #[error("duplicate group token {0}")]
    DuplicateGroupToken(DeclarationContext),

    #[error("duplicate after token {0}")]
    DuplicateDependencyToken(DeclarationContext),

    #[error("empty value not allowed {0}")]
    EmptyDependencyValue(DeclarationContext),

    #[error("invalid group id '{id}' {context}")]
    InvalidGroupId {
        id: String,
        context: DeclarationContext,
    },

    #[error("repeated declaration of 'after' for group '{group}' {context}")]
    RepeatedAfterDeclaration {
        group: String,
        context: DeclarationContext,
    },

    #[error("duplicate test '{test}' in group '{group}'")]
    DuplicateTest { group: String, test: String },

    #[error("group not found: {id} (required by '{required_by}')")]
    GroupNotFound { id: String, required_by: String },

    #[error("circular dependency {}", .chain.join("->"))]
    CircularDependency { chain: Vec<String> },

    #[error("unable to order groups: {}", .remaining.join(", "))]
    Unorderable { remaining: Vec<String> },
}

impl BuildError {
    /// The declaration context, for errors raised against a single declaration.
    pub fn context(&self) -> Option<&DeclarationContext> {
        match self {
            Self::MissingGroup(context)
            | Self::DuplicateGroupToken(context)
            | Self::DuplicateDependencyToken(context)
            | Self::EmptyDependencyValue(context)
            | Self::InvalidGroupId { context, .. }
            | Self::RepeatedAfterDeclaration { context, .. } => Some(context),
            Self::DuplicateTest { .. }
            | Self::GroupNotFound { .. }
            | Self::CircularDependency { .. }
            | Self::Unorderable { .. } => None,
        }
    }
}
