use std::collections::HashMap;
use std::fmt;

/// Compact handle for a capture name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier permanently bound to the `variable` pseudo-scope
pub const VARIABLE_SCOPE_ID: ScopeId = ScopeId(257);

/// Name of the pseudo-scope added around every local definition
pub const VARIABLE_SCOPE_NAME: &str = "variable";

/// Highest identifier of the reserved range; allocation starts above it
const RESERVED_UNTIL: u32 = 259;

/// Allocation stride. Odd identifiers only, as the legacy renderer derives a
/// paired close tag from `id + 1`.
const ID_STRIDE: u32 = 2;

/// Bidirectional mapping between capture names and scope identifiers.
///
/// Identifiers are allocated lazily, in increasing order, and are never reused
/// for a different name during the registry's lifetime.
#[derive(Debug, Clone)]
pub struct ScopeRegistry {
    ids_by_name: HashMap<String, ScopeId>,
    names_by_id: HashMap<ScopeId, String>,
    last_id: u32,
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeRegistry {
    pub fn new() -> Self {
        let mut ids_by_name = HashMap::new();
        let mut names_by_id = HashMap::new();
        ids_by_name.insert(VARIABLE_SCOPE_NAME.to_string(), VARIABLE_SCOPE_ID);
        names_by_id.insert(VARIABLE_SCOPE_ID, VARIABLE_SCOPE_NAME.to_string());
        Self {
            ids_by_name,
            names_by_id,
            last_id: RESERVED_UNTIL,
        }
    }

    /// Get the identifier for `name`, allocating one on first use
    pub fn id_for(&mut self, name: &str) -> ScopeId {
        if let Some(id) = self.ids_by_name.get(name) {
            return *id;
        }

        self.last_id += ID_STRIDE;
        let id = ScopeId(self.last_id);
        self.ids_by_name.insert(name.to_string(), id);
        self.names_by_id.insert(id, name.to_string());
        log::trace!(target: "irodori::scope", "Allocated scope id {} for {}", id, name);
        id
    }

    /// Look up an identifier without allocating
    pub fn existing_id(&self, name: &str) -> Option<ScopeId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn name_for(&self, id: ScopeId) -> Option<&str> {
        self.names_by_id.get(&id).map(String::as_str)
    }

    /// CSS class list for a scope: `keyword.control` becomes
    /// `syntax--keyword syntax--control`
    pub fn class_name_for(&self, id: ScopeId) -> Option<String> {
        let name = self.name_for(id)?;
        Some(
            name.split('.')
                .map(|part| format!("syntax--{part}"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// Number of registered names, the reserved `variable` included
    pub fn len(&self) -> usize {
        self.ids_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_name.is_empty()
    }
}
