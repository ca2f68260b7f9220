use std::fmt;

/// Ordered scope names at a point, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeDescriptor {
    scopes: Vec<String>,
}

impl ScopeDescriptor {
    pub fn new(scopes: Vec<String>) -> Self {
        Self { scopes }
    }

    /// Descriptor holding only the root scope
    pub fn root(scope_name: &str) -> Self {
        Self::new(vec![scope_name.to_string()])
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Space-separated class selector form, e.g. `.source.rust .keyword`
    pub fn scope_chain(&self) -> String {
        self.scopes
            .iter()
            .map(|scope| {
                if scope.starts_with('.') {
                    scope.clone()
                } else {
                    format!(".{scope}")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ScopeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scopes.join(" "))
    }
}
