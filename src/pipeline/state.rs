//! Explicit state threaded through one reconciliation pass.
//!
//! Transitions are strictly sequential with no branching; a failed step
//! leaves the pass at the last completed state, which tests use to assert
//! ordering properties such as "no descriptor write before all secret
//! writes succeeded".

/// States of one reconciliation pass, in transition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PassState {
    Start,
    ConfigDecoded,
    Rendered,
    Packaged,
    SecretsPublished,
    DescriptorPublished,
    StatusUpdated,
}

impl PassState {
    /// Successor state, `None` at the terminal success state
    pub fn next(self) -> Option<PassState> {
        match self {
            PassState::Start => Some(PassState::ConfigDecoded),
            PassState::ConfigDecoded => Some(PassState::Rendered),
            PassState::Rendered => Some(PassState::Packaged),
            PassState::Packaged => Some(PassState::SecretsPublished),
            PassState::SecretsPublished => Some(PassState::DescriptorPublished),
            PassState::DescriptorPublished => Some(PassState::StatusUpdated),
            PassState::StatusUpdated => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == PassState::StatusUpdated
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PassState::Start => "Start",
            PassState::ConfigDecoded => "ConfigDecoded",
            PassState::Rendered => "Rendered",
            PassState::Packaged => "Packaged",
            PassState::SecretsPublished => "SecretsPublished",
            PassState::DescriptorPublished => "DescriptorPublished",
            PassState::StatusUpdated => "StatusUpdated",
        }
    }
}

/// One pass over a single network resource
#[derive(Debug)]
pub struct Pass {
    state: PassState,
}

impl Pass {
    pub fn new() -> Self {
        Self {
            state: PassState::Start,
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Step to the successor state. Stepping past the terminal state is a
    /// pipeline bug.
    pub(crate) fn advance(&mut self) -> PassState {
        debug_assert!(
            !self.state.is_terminal(),
            "pass advanced past terminal state"
        );
        if let Some(next) = self.state.next() {
            self.state = next;
        }
        self.state
    }
}

impl Default for Pass {
    fn default() -> Self {
        Self::new()
    }
}
