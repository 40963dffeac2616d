use std::collections::BTreeMap;

/// Handle to a pipeline-owned resource.
///
/// Ids are monotonic per registry and never reused, so a stale id can never
/// silently alias a newer resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ResourceId(u32);

/// Ordered arena of pipeline resources.
///
/// Iteration follows id order, which makes draw order deterministic: a
/// resource loaded earlier is always drawn before one loaded later.
/// Operating on an id that was never issued or already removed is a caller
/// bug; lookups return `None` / are debug-asserted rather than papered over.
pub struct ResourceRegistry<T> {
    entries: BTreeMap<u32, T>,
    next_id: u32,
}

impl<T> Default for ResourceRegistry<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> ResourceRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` and returns its freshly generated id.
    pub fn insert(&mut self, value: T) -> ResourceId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, value);
        ResourceId(id)
    }

    /// Replaces the resource behind an existing id.
    ///
    /// The old value is dropped before the new one is stored, bounding peak
    /// resource usage to one value per id.
    pub fn replace(&mut self, id: ResourceId, value: T) {
        let old = self.entries.remove(&id.0);
        debug_assert!(old.is_some(), "replace on unknown resource id");
        drop(old);
        self.entries.insert(id.0, value);
    }

    pub fn remove(&mut self, id: ResourceId) -> Option<T> {
        let removed = self.entries.remove(&id.0);
        debug_assert!(removed.is_some(), "remove on unknown resource id");
        removed
    }

    pub fn get(&self, id: ResourceId) -> Option<&T> {
        self.entries.get(&id.0)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut T> {
        self.entries.get_mut(&id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &T)> {
        self.entries.iter().map(|(&id, v)| (ResourceId(id), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ResourceId, &mut T)> {
        self.entries.iter_mut().map(|(&id, v)| (ResourceId(id), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut reg = ResourceRegistry::new();
        let a = reg.insert("a");
        let b = reg.insert("b");
        assert_ne!(a, b);

        reg.remove(a);
        let c = reg.insert("c");
        assert_ne!(c, a, "removed ids must not come back");
        assert_ne!(c, b);
    }

    #[test]
    fn load_then_remove_restores_the_previous_population() {
        let mut reg = ResourceRegistry::new();
        let keep = reg.insert(1);
        let before: Vec<_> = reg.iter().map(|(id, &v)| (id, v)).collect();

        let temp = reg.insert(2);
        assert_eq!(reg.remove(temp), Some(2));

        let after: Vec<_> = reg.iter().map(|(id, &v)| (id, v)).collect();
        assert_eq!(before, after);
        assert_eq!(reg.get(keep), Some(&1));
    }

    #[test]
    fn iteration_follows_load_order() {
        let mut reg = ResourceRegistry::new();
        let _a = reg.insert("first");
        let b = reg.insert("second");
        let _c = reg.insert("third");
        reg.remove(b);
        reg.insert("fourth");

        let order: Vec<_> = reg.iter().map(|(_, &v)| v).collect();
        assert_eq!(order, vec!["first", "third", "fourth"]);
    }

    #[test]
    fn replace_keeps_the_id_and_position() {
        let mut reg = ResourceRegistry::new();
        let a = reg.insert("a");
        let b = reg.insert("b");
        reg.replace(a, "a2");

        assert_eq!(reg.get(a), Some(&"a2"));
        let order: Vec<_> = reg.iter().map(|(_, &v)| v).collect();
        assert_eq!(order, vec!["a2", "b"]);
        assert_eq!(reg.get(b), Some(&"b"));
    }
}
