//! Transition bookkeeping types

use std::fmt;

use smallvec::SmallVec;

/// Unique identifier of one accepted transition.
///
/// Tokens are handed out in increasing order by the fade service that
/// accepted the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionToken(u64);

impl TransitionToken {
    /// Wrap a raw token value
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition#{}", self.0)
    }
}

/// The two steps of a transition.
///
/// `on_out` is delivered once the fade-out reaches full opacity, `on_in`
/// once the fade-in has completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Continuation<M> {
    /// Step delivered at full fade-out
    pub on_out: M,
    /// Step delivered when the fade-in completes
    pub on_in: M,
}

impl<M> Continuation<M> {
    /// Create a continuation from both steps
    pub const fn new(on_out: M, on_in: M) -> Self {
        Self { on_out, on_in }
    }
}

impl<M: Default> Continuation<M> {
    /// Continuation whose fade-in step is the payload's default (no-op).
    pub fn on_out(on_out: M) -> Self {
        Self {
            on_out,
            on_in: M::default(),
        }
    }
}

/// A phase boundary reached while advancing a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeSignal<M> {
    /// Full opacity reached; fade-in begins next.
    FadedOut {
        /// Transition that reached the boundary
        token: TransitionToken,
        /// The `on_out` step
        step: M,
    },
    /// Fade-in complete; the service is idle again.
    FadedIn {
        /// Transition that reached the boundary
        token: TransitionToken,
        /// The `on_in` step
        step: M,
    },
}

impl<M> FadeSignal<M> {
    /// Transition this signal belongs to
    #[must_use]
    pub fn token(&self) -> TransitionToken {
        match self {
            Self::FadedOut { token, .. } | Self::FadedIn { token, .. } => *token,
        }
    }
}

/// Signals produced by one update. A single update can cross both
/// boundaries when the frame is longer than the remaining fade.
pub type FadeSignals<M> = SmallVec<[FadeSignal<M>; 2]>;
