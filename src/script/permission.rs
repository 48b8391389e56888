use serde::Serialize;

/// Which predicate is active for an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Actors may only act on themselves
    #[default]
    Strict,
    /// Administrators may act on anyone
    Rise,
}

/// A permission predicate bound to the invoking actor and the resolved target.
#[derive(Debug, Clone)]
pub struct Predicate {
    kind: Permission,
    author: String,
    target: String,
    author_admin: bool,
}

impl Predicate {
    pub fn new(kind: Permission, author: &str, target: &str, author_admin: bool) -> Self {
        Self {
            kind,
            author: author.to_string(),
            target: target.to_string(),
            author_admin,
        }
    }

    pub fn kind(&self) -> Permission {
        self.kind
    }

    pub fn allows(&self, a: &str, b: &str) -> bool {
        self.widened() || a == b
    }

    /// Whether the invoking actor may act on the bound target.
    pub fn allows_target(&self) -> bool {
        self.widened() || self.author == self.target
    }

    fn widened(&self) -> bool {
        self.kind == Permission::Rise && self.author_admin
    }
}
