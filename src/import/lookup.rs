use crate::models::{Account, Category, Payee};

/// Read-only `{id, name}` snapshot of one entity table, taken once per import.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntityIndex {
    entries: Vec<(i64, String)>,
}

impl EntityIndex {
    pub(crate) fn new(entries: impl IntoIterator<Item = (i64, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub(crate) fn contains_id(&self, id: i64) -> bool {
        self.entries.iter().any(|(eid, _)| *eid == id)
    }

    pub(crate) fn find_by_name(&self, name: &str) -> Option<i64> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, n)| n.trim().to_lowercase() == wanted)
            .map(|(id, _)| *id)
    }

    pub(crate) fn name_of(&self, id: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, n)| n.as_str())
    }

    /// Resolve a column value: a bare integer is taken as an id as-is,
    /// anything else is looked up by name.
    pub(crate) fn resolve_field(&self, raw: &str) -> Option<i64> {
        let trimmed = raw.trim();
        if let Some(id) = integer_literal(trimmed) {
            return Some(id);
        }
        self.find_by_name(trimmed)
    }

    /// Resolve a reference that must point at an existing entity: a known id
    /// first, then a name.
    pub(crate) fn resolve_ref(&self, reference: &str) -> Option<i64> {
        let trimmed = reference.trim();
        integer_literal(trimmed)
            .filter(|id| self.contains_id(*id))
            .or_else(|| self.find_by_name(trimmed))
    }
}

fn integer_literal(s: &str) -> Option<i64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Lookups {
    pub(crate) accounts: EntityIndex,
    pub(crate) categories: EntityIndex,
    pub(crate) payees: EntityIndex,
}

impl Lookups {
    pub(crate) fn from_parts(accounts: &[Account], categories: &[Category], payees: &[Payee]) -> Self {
        Self {
            accounts: EntityIndex::new(
                accounts
                    .iter()
                    .filter_map(|a| a.id.map(|id| (id, a.name.clone()))),
            ),
            categories: EntityIndex::new(
                categories
                    .iter()
                    .filter_map(|c| c.id.map(|id| (id, c.name.clone()))),
            ),
            payees: EntityIndex::new(
                payees
                    .iter()
                    .filter_map(|p| p.id.map(|id| (id, p.name.clone()))),
            ),
        }
    }
}
