//! Conditional-compilation flow tracking.

/// Effect of the enclosing conditional directives on line emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnableState {
    /// Every enclosing branch was taken; lines are processed and emitted.
    Active,
    /// Inside a non-taken branch of a chain that may still take a later
    /// `#elif` or `#else`.
    Seeking,
    /// Nested below a non-active context; no branch of this chain can be
    /// taken.
    Skipping,
}

/// The current enable-state plus a stack of the states that were current
/// when each open conditional was entered.
pub(crate) struct FlowStack {
    state: EnableState,
    stack: Vec<EnableState>,
}

impl FlowStack {
    pub(crate) fn new() -> Self {
        FlowStack {
            state: EnableState::Active,
            stack: Vec::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state == EnableState::Active
    }

    /// True when an `#elif` expression could still promote this chain, so
    /// its expression is worth evaluating.
    pub(crate) fn is_seeking(&self) -> bool {
        self.state == EnableState::Seeking
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `#if` / `#ifdef` / `#ifndef`: push the current state and derive the
    /// new one from whether the branch was taken.
    pub(crate) fn enter(&mut self, taken: bool) {
        self.stack.push(self.state);
        self.state = match self.state {
            EnableState::Active if taken => EnableState::Active,
            EnableState::Active => EnableState::Seeking,
            _ => EnableState::Skipping,
        };
    }

    /// `#elif` / `#else`. A chain that already took a branch goes dark for
    /// good; a seeking chain is promoted when `taken` holds. Returns false
    /// when no conditional is open.
    pub(crate) fn branch(&mut self, taken: bool) -> bool {
        if self.stack.is_empty() {
            return false;
        }
        match self.state {
            EnableState::Active => self.state = EnableState::Skipping,
            EnableState::Seeking if taken => self.state = EnableState::Active,
            _ => {}
        }
        true
    }

    /// `#endif`: restore the state saved at the matching `#if`. Returns
    /// false when no conditional is open.
    pub(crate) fn exit(&mut self) -> bool {
        match self.stack.pop() {
            Some(prior) => {
                self.state = prior;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_branch_stays_active() {
        let mut flow = FlowStack::new();
        flow.enter(true);
        assert!(flow.is_active());
        assert!(flow.exit());
        assert!(flow.is_active());
    }

    #[test]
    fn else_promotes_an_untaken_chain() {
        let mut flow = FlowStack::new();
        flow.enter(false);
        assert!(!flow.is_active());
        assert!(flow.branch(true));
        assert!(flow.is_active());
        assert!(flow.exit());
    }

    #[test]
    fn at_most_one_branch_is_taken() {
        let mut flow = FlowStack::new();
        flow.enter(true);
        flow.branch(true); // #elif after a taken branch
        assert!(!flow.is_active());
        flow.branch(true); // #else
        assert!(!flow.is_active());
        flow.exit();
        assert!(flow.is_active());
    }

    #[test]
    fn nesting_under_a_dead_region_skips() {
        let mut flow = FlowStack::new();
        flow.enter(false); // outer, not taken
        flow.enter(true); // inner would be taken, but context is dead
        assert!(!flow.is_active());
        assert!(!flow.is_seeking()); // skipping, not promotable
        flow.branch(true);
        assert!(!flow.is_active());
        flow.exit();
        flow.exit();
        assert!(flow.is_active());
    }

    #[test]
    fn unmatched_branches_are_reported() {
        let mut flow = FlowStack::new();
        assert!(!flow.branch(true));
        assert!(!flow.exit());
    }
}
