//! Card instance identification.
//!
//! Every card that enters a battle (dealt from a deck list, summoned by an
//! effect, duplicated) gets a fresh `InstanceId`. Ids are handed out by an
//! [`InstanceAllocator`] owned by the board and are never reused, even
//! after the card is destroyed or exiled.
//!
//! ```
//! use battle_engine::core::{InstanceAllocator, InstanceId};
//!
//! let mut ids = InstanceAllocator::default();
//! assert_eq!(ids.allocate(), InstanceId::new(0));
//! assert_eq!(ids.allocate(), InstanceId::new(1));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for one card instance in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Create an instance ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}

/// Monotonic instance id source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceAllocator {
    next: u32,
}

impl InstanceAllocator {
    /// Hand out the next unused id.
    pub fn allocate(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_display() {
        assert_eq!(format!("{}", InstanceId::new(42)), "Instance(42)");
        assert_eq!(InstanceId::new(7).raw(), 7);
    }

    #[test]
    fn test_allocator_monotonic() {
        let mut ids = InstanceAllocator::default();
        let allocated: Vec<_> = (0..5).map(|_| ids.allocate()).collect();

        assert_eq!(ids.allocated(), 5);
        for pair in allocated.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_allocator_survives_serde() {
        let mut ids = InstanceAllocator::default();
        ids.allocate();
        ids.allocate();

        let json = serde_json::to_string(&ids).unwrap();
        let mut restored: InstanceAllocator = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.allocate(), InstanceId::new(2));
    }
}
