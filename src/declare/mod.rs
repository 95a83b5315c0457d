mod error;

use std::collections::BTreeSet;
use std::fmt;

use crate::graph::TestCase;
use crate::runner::action::TestAction;

pub use error::{BuildError, DeclarationContext};

/// One token of an already-tokenized declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclToken {
    /// `group:<id>`
    Group(String),
    /// `after:<id>,<id>,...`
    After(Vec<String>),
}

impl fmt::Display for DeclToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => write!(f, "group:{id}"),
            Self::After(ids) => write!(f, "after:{}", ids.join(",")),
        }
    }
}

/// A single test together with the tokens that place it in a group.
pub struct Declaration {
    pub tokens: Vec<DeclToken>,
    pub test_name: String,
    pub test_title: String,
    pub action: Box<dyn TestAction>,
    raw: Option<String>,
}

impl Declaration {
    /// Create a declaration from raw tokens. The title defaults to the name.
    pub fn new(
        tokens: Vec<DeclToken>,
        test_name: impl Into<String>,
        action: impl TestAction + 'static,
    ) -> Self {
        let test_name = test_name.into();
        Self {
            tokens,
            test_title: test_name.clone(),
            test_name,
            action: Box::new(action),
            raw: None,
        }
    }

    /// Shorthand for a declaration carrying a single `group` token.
    pub fn in_group(
        group: impl Into<String>,
        test_name: impl Into<String>,
        action: impl TestAction + 'static,
    ) -> Self {
        Self::new(vec![DeclToken::Group(group.into())], test_name, action)
    }

    /// Append an `after` token.
    pub fn after<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens
            .push(DeclToken::After(dependencies.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.test_title = title.into();
        self
    }

    /// Attach the annotation text the tokens were extracted from, used in diagnostics.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// The raw annotation text, or the tokens rendered back into annotation form.
    pub fn raw_text(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => self
                .tokens
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn context(&self, group: Option<&str>) -> DeclarationContext {
        DeclarationContext {
            group: group.map(str::to_owned),
            test: self.test_name.clone(),
            raw: self.raw_text(),
        }
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("tokens", &self.tokens)
            .field("test_name", &self.test_name)
            .field("test_title", &self.test_title)
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

/// A declaration that passed shape validation.
#[derive(Debug)]
pub struct ValidDeclaration {
    pub group: String,
    /// `None` when the declaration had no `after` token.
    pub dependencies: Option<BTreeSet<String>>,
    pub test: TestCase,
    pub context: DeclarationContext,
}

/// Validate the shape of a single declaration.
///
/// # Errors
///
/// Returns a [`BuildError`] if:
/// - no group id is given (`MissingGroup`)
/// - the group or after token appears twice (`DuplicateGroupToken`, `DuplicateDependencyToken`)
/// - an after list is empty or holds a blank entry (`EmptyDependencyValue`)
/// - the group id contains a comma or whitespace (`InvalidGroupId`)
pub fn validate(declaration: Declaration) -> Result<ValidDeclaration, BuildError> {
    let mut group: Option<&str> = None;
    let mut dependencies: Option<BTreeSet<String>> = None;

    for token in &declaration.tokens {
        match token {
            DeclToken::Group(id) => {
                if group.is_some() {
                    return Err(BuildError::DuplicateGroupToken(declaration.context(group)));
                }
                let id = id.as_str();
                if id.is_empty() {
                    continue;
                }
                if id.contains(',') || id.chars().any(char::is_whitespace) {
                    return Err(BuildError::InvalidGroupId {
                        id: id.to_owned(),
                        context: declaration.context(None),
                    });
                }
                group = Some(id);
            }
            DeclToken::After(ids) => {
                if dependencies.is_some() {
                    return Err(BuildError::DuplicateDependencyToken(
                        declaration.context(group),
                    ));
                }
                if ids.is_empty() || ids.iter().any(|id| id.trim().is_empty()) {
                    return Err(BuildError::EmptyDependencyValue(declaration.context(group)));
                }
                dependencies = Some(ids.iter().map(|id| id.trim().to_owned()).collect());
            }
        }
    }

    let Some(group) = group.map(str::to_owned) else {
        return Err(BuildError::MissingGroup(declaration.context(None)));
    };
    let context = declaration.context(Some(&group));

    Ok(ValidDeclaration {
        group,
        dependencies,
        test: TestCase::new(
            declaration.test_name,
            declaration.test_title,
            declaration.action,
        ),
        context,
    })
}
