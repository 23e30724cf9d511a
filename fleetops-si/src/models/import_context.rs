//! Lookup data used to resolve human-readable names in uploaded files
//!
//! Supplied by the caller and read-only for the duration of an import.
//! Names are matched case-insensitively after trimming.

use std::collections::HashMap;

/// Result of resolving a display name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    Missing,
    /// The name belongs to more than one record
    Ambiguous(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportContext {
    branches: HashMap<String, Vec<String>>,
    shifts: HashMap<String, Vec<String>>,
}

impl ImportContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, name)` pairs as returned by the remote store
    pub fn from_references<B, S>(branches: B, shifts: S) -> Self
    where
        B: IntoIterator<Item = (String, String)>,
        S: IntoIterator<Item = (String, String)>,
    {
        let mut context = Self::new();
        for (id, name) in branches {
            context.insert_branch(&name, id);
        }
        for (id, name) in shifts {
            context.insert_shift(&name, id);
        }
        context
    }

    pub fn with_branch(mut self, name: &str, id: impl Into<String>) -> Self {
        self.insert_branch(name, id);
        self
    }

    pub fn with_shift(mut self, name: &str, id: impl Into<String>) -> Self {
        self.insert_shift(name, id);
        self
    }

    fn insert_branch(&mut self, name: &str, id: impl Into<String>) {
        if insert(&mut self.branches, name, id.into()) {
            tracing::warn!(branch = %name, "Branch name shared by several records, rows naming it will be rejected");
        }
    }

    fn insert_shift(&mut self, name: &str, id: impl Into<String>) {
        // Shift names are only unique within a branch
        if insert(&mut self.shifts, name, id.into()) {
            tracing::debug!(shift = %name, "Shift name used by several branches");
        }
    }

    pub fn lookup_branch(&self, name: &str) -> Lookup<'_> {
        lookup(&self.branches, name)
    }

    pub fn lookup_shift(&self, name: &str) -> Lookup<'_> {
        lookup(&self.shifts, name)
    }

    /// Branch id for a display name, when exactly one branch has it
    pub fn branch_id(&self, name: &str) -> Option<&str> {
        match self.lookup_branch(name) {
            Lookup::Found(id) => Some(id),
            _ => None,
        }
    }

    /// Shift id for a shift name, when exactly one shift has it
    pub fn shift_id(&self, name: &str) -> Option<&str> {
        match self.lookup_shift(name) {
            Lookup::Found(id) => Some(id),
            _ => None,
        }
    }

    pub fn branch_count(&self) -> usize {
        self.branches.values().map(Vec::len).sum()
    }

    pub fn shift_count(&self) -> usize {
        self.shifts.values().map(Vec::len).sum()
    }
}

/// Returns true when the name now maps to more than one id
fn insert(map: &mut HashMap<String, Vec<String>>, name: &str, id: String) -> bool {
    let ids = map.entry(normalize(name)).or_default();
    if !ids.contains(&id) {
        ids.push(id);
    }
    ids.len() > 1
}

fn lookup<'a>(map: &'a HashMap<String, Vec<String>>, name: &str) -> Lookup<'a> {
    match map.get(&normalize(name)).map(Vec::as_slice) {
        None | Some([]) => Lookup::Missing,
        Some([id]) => Lookup::Found(id.as_str()),
        Some(ids) => Lookup::Ambiguous(ids.len()),
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let context = ImportContext::new().with_branch("Santiago", "b1");
        assert_eq!(context.branch_id("santiago"), Some("b1"));
        assert_eq!(context.branch_id("  SANTIAGO "), Some("b1"));
        assert_eq!(context.branch_id("Valparaíso"), None);
    }

    #[test]
    fn test_from_references() {
        let context = ImportContext::from_references(
            vec![("b1".to_string(), "Santiago".to_string())],
            vec![("s1".to_string(), "Turno AM".to_string())],
        );
        assert_eq!(context.branch_count(), 1);
        assert_eq!(context.shift_id("turno am"), Some("s1"));
    }

    #[test]
    fn test_shared_shift_name_is_ambiguous() {
        let context = ImportContext::from_references(
            vec![],
            vec![
                ("s-santiago".to_string(), "Turno AM".to_string()),
                ("s-temuco".to_string(), "turno am".to_string()),
                ("s-noche".to_string(), "Turno Noche".to_string()),
            ],
        );
        assert_eq!(context.lookup_shift("Turno AM"), Lookup::Ambiguous(2));
        assert_eq!(context.shift_id("Turno AM"), None);
        assert_eq!(context.lookup_shift("Turno Noche"), Lookup::Found("s-noche"));
        assert_eq!(context.lookup_shift("Turno PM"), Lookup::Missing);
        assert_eq!(context.shift_count(), 3);
    }

    #[test]
    fn test_repeated_reference_is_not_ambiguous() {
        let context = ImportContext::new()
            .with_branch("Santiago", "b1")
            .with_branch("SANTIAGO", "b1");
        assert_eq!(context.lookup_branch("santiago"), Lookup::Found("b1"));
        assert_eq!(context.branch_count(), 1);
    }
}
