use crate::scope::ScopeId;
use crate::text::{EditShift, Position, Range};

/// Lexical role of a boundary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRole {
    Open,
    Close,
    None,
}

/// One side of a lexical scope: its nesting depth and the position of the
/// other side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMark {
    pub depth: u32,
    pub partner: Position,
}

/// Range and text of a node captured by the locals query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpan {
    pub range: Range,
    pub text: String,
}

/// Scope events recorded at one position.
///
/// Closes are processed before opens. Cross references to other entries are
/// stored as positions and resolved through the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryEntry {
    pub position: Position,
    pub close_scope_ids: Vec<ScopeId>,
    pub open_scope_ids: Vec<ScopeId>,
    /// Set when a lexical scope opens here
    pub scope_open: Option<ScopeMark>,
    /// Set when a lexical scope closes here
    pub scope_close: Option<ScopeMark>,
    /// Name declared by a definition starting here
    pub definition: Option<String>,
    /// Where that definition ends
    pub definition_close: Option<Position>,
    /// First locals node starting here
    pub open_node: Option<NodeSpan>,
    /// First locals node ending here
    pub close_node: Option<NodeSpan>,
}

impl BoundaryEntry {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            close_scope_ids: Vec::new(),
            open_scope_ids: Vec::new(),
            scope_open: None,
            scope_close: None,
            definition: None,
            definition_close: None,
            open_node: None,
            close_node: None,
        }
    }

    pub fn with_scopes(position: Position, close: Vec<ScopeId>, open: Vec<ScopeId>) -> Self {
        Self {
            close_scope_ids: close,
            open_scope_ids: open,
            ..Self::new(position)
        }
    }

    /// Open wins over close when a scope ends and another starts here
    pub fn role(&self) -> ScopeRole {
        if self.scope_open.is_some() {
            ScopeRole::Open
        } else if self.scope_close.is_some() {
            ScopeRole::Close
        } else {
            ScopeRole::None
        }
    }

    /// Depth of the lexical scope opening or closing here
    pub fn depth(&self) -> Option<u32> {
        self.scope_open
            .or(self.scope_close)
            .map(|mark| mark.depth)
    }

    pub fn is_definition(&self) -> bool {
        self.definition.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.close_scope_ids.is_empty() && self.open_scope_ids.is_empty()
    }

    /// Append open ids that are not present yet
    pub fn merge_open(&mut self, ids: &[ScopeId]) {
        for id in ids {
            if !self.open_scope_ids.contains(id) {
                self.open_scope_ids.push(*id);
            }
        }
    }

    /// Prepend close ids that are not present yet, keeping their relative order
    pub fn merge_close(&mut self, ids: &[ScopeId]) {
        let missing: Vec<ScopeId> = ids
            .iter()
            .filter(|id| !self.close_scope_ids.contains(id))
            .copied()
            .collect();
        if !missing.is_empty() {
            self.close_scope_ids.splice(0..0, missing);
        }
    }

    /// Open ids with duplicates removed, first occurrence kept
    pub fn unique_open_scope_ids(&self) -> Vec<ScopeId> {
        dedup_preserving_order(&self.open_scope_ids)
    }

    /// Close ids with duplicates removed, first occurrence kept
    pub fn unique_close_scope_ids(&self) -> Vec<ScopeId> {
        dedup_preserving_order(&self.close_scope_ids)
    }

    /// Rewrite this entry's key and cross references for an edit
    pub(crate) fn shifted(mut self, shift: &EditShift, position: Position) -> Self {
        self.position = position;
        self.shift_references(shift);
        self
    }

    pub(crate) fn shift_references(&mut self, shift: &EditShift) {
        if let Some(mark) = self.scope_open.as_mut() {
            mark.partner = shift.shift_or_start(mark.partner);
        }
        if let Some(mark) = self.scope_close.as_mut() {
            mark.partner = shift.shift_or_start(mark.partner);
        }
        if let Some(close) = self.definition_close.as_mut() {
            *close = shift.shift_or_start(*close);
        }
        if let Some(node) = self.open_node.as_mut() {
            node.range = shift.shift_range(node.range);
        }
        if let Some(node) = self.close_node.as_mut() {
            node.range = shift.shift_range(node.range);
        }
    }
}

pub(crate) fn dedup_preserving_order(ids: &[ScopeId]) -> Vec<ScopeId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}
