use std::collections::BTreeSet;

///
/// The shared iteration clock of a chromosome: every reference position at
/// which any genome has an event, visited in ascending order.
///
/// Positions are collected into a set while tracks are built; [ReferenceClock::reset]
/// freezes them into the traversal order of the next pass.
///
#[derive(Debug, Clone, Default)]
pub struct ReferenceClock {
    positions: BTreeSet<u64>,
    order: Vec<u64>,
    index: usize,
}

impl ReferenceClock {
    pub fn new() -> Self {
        ReferenceClock::default()
    }

    /// Record a position. Positions seen before are ignored.
    pub fn add_chromosome_position(&mut self, reference_position: u64) {
        self.positions.insert(reference_position);
    }

    /// Rewind to the first position, picking up positions added since the last pass.
    pub fn reset(&mut self) {
        if self.order.len() != self.positions.len() {
            self.order = self.positions.iter().copied().collect();
        }
        self.index = 0;
    }

    /// Whether the clock still points at a position.
    pub fn has_next(&self) -> bool {
        self.index < self.order.len()
    }

    pub fn current_position(&self) -> Option<u64> {
        self.order.get(self.index).copied()
    }

    /// Step forward, returning the position that was current before the step.
    pub fn advance(&mut self) -> Option<u64> {
        let position = self.current_position()?;
        self.index += 1;
        Some(position)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = u64> + '_ {
        self.positions.iter().copied()
    }
}

impl FromIterator<u64> for ReferenceClock {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        let mut clock = ReferenceClock::new();
        for position in iter {
            clock.add_chromosome_position(position);
        }
        clock
    }
}
