use indexmap::IndexMap;

use crate::task::GroupId;
use crate::ui::sink::{OutputSink, RegionId};

/// One output region per task group, opened on first sight and kept for the
/// listener's lifetime.
#[derive(Debug, Default)]
pub struct RegionMap {
    regions: IndexMap<GroupId, RegionId>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<S: OutputSink>(&mut self, group: GroupId, sink: &mut S) -> RegionId {
        *self.regions.entry(group).or_insert_with(|| {
            tracing::debug!(%group, "opening output region");
            sink.open_region()
        })
    }

    pub fn get(&self, group: GroupId) -> Option<RegionId> {
        self.regions.get(&group).copied()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::sink::MemorySink;

    #[test]
    fn reuses_region_for_known_group() {
        let mut sink = MemorySink::new();
        let mut map = RegionMap::new();
        let a = GroupId::from_raw(10);
        let b = GroupId::from_raw(11);

        let first = map.resolve(a, &mut sink);
        let again = map.resolve(a, &mut sink);
        let other = map.resolve(b, &mut sink);

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(sink.region_count(), 2);
        assert_eq!(map.get(b), Some(other));
    }
}
