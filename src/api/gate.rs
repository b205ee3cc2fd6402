/// Echo guard for one viewport group.
///
/// While engaged, range-change notifications are echoes of a synchronization
/// step and must neither be recorded in history nor re-broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionGate {
    engaged: bool,
}

impl SuppressionGate {
    #[must_use]
    pub fn is_engaged(self) -> bool {
        self.engaged
    }

    /// Engages the gate and returns whether it was already engaged.
    pub(crate) fn engage(&mut self) -> bool {
        std::mem::replace(&mut self.engaged, true)
    }

    /// Restores the state observed by the matching [`engage`](Self::engage).
    pub(crate) fn restore(&mut self, previously_engaged: bool) {
        self.engaged = previously_engaged;
    }
}
