//! Opacity ramp fade service

use crate::host::FadeService;

use super::token::{Continuation, FadeSignal, FadeSignals, TransitionToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Out,
    In,
}

#[derive(Debug)]
struct ActiveFade<M> {
    token: TransitionToken,
    phase: Phase,
    elapsed: f32,
    out_duration: f32,
    in_duration: f32,
    on_out: Option<M>,
    on_in: Option<M>,
}

/// Full-screen fade driven by the frame clock.
///
/// Opacity ramps linearly from 0 to 1 over the fade-out, then back to 0 over
/// the fade-in. The service stays busy from the accepted [`fade`] call until
/// the `FadedIn` signal has been emitted.
///
/// [`fade`]: FadeService::fade
#[derive(Debug)]
pub struct ScreenFade<M> {
    active: Option<ActiveFade<M>>,
    opacity: f32,
    next_token: u64,
}

impl<M> ScreenFade<M> {
    /// Create an idle fade
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: None,
            opacity: 0.0,
            next_token: 1,
        }
    }

    /// Token of the transition in flight
    #[must_use]
    pub fn active_token(&self) -> Option<TransitionToken> {
        self.active.as_ref().map(|active| active.token)
    }
}

impl<M> Default for ScreenFade<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> FadeService<M> for ScreenFade<M> {
    fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn fade(
        &mut self,
        out_duration: f32,
        in_duration: f32,
        continuation: Continuation<M>,
    ) -> Option<TransitionToken> {
        if self.active.is_some() {
            return None;
        }

        let token = TransitionToken::new(self.next_token);
        self.next_token += 1;

        self.active = Some(ActiveFade {
            token,
            phase: Phase::Out,
            elapsed: 0.0,
            out_duration: out_duration.max(0.0),
            in_duration: in_duration.max(0.0),
            on_out: Some(continuation.on_out),
            on_in: Some(continuation.on_in),
        });

        log::debug!("{token} fading out over {out_duration:.2}s");
        Some(token)
    }

    fn update(&mut self, dt: f32) -> FadeSignals<M> {
        let mut signals = FadeSignals::new();
        let Some(active) = self.active.as_mut() else {
            return signals;
        };

        let mut remaining = dt.max(0.0);

        if active.phase == Phase::Out {
            active.elapsed += remaining;
            if active.elapsed < active.out_duration {
                self.opacity = active.elapsed / active.out_duration;
                return signals;
            }

            // Carry the overshoot into the fade-in
            remaining = active.elapsed - active.out_duration;
            self.opacity = 1.0;
            if let Some(step) = active.on_out.take() {
                signals.push(FadeSignal::FadedOut {
                    token: active.token,
                    step,
                });
            }
            active.phase = Phase::In;
            active.elapsed = 0.0;
        }

        active.elapsed += remaining;
        if active.elapsed < active.in_duration {
            self.opacity = 1.0 - active.elapsed / active.in_duration;
            return signals;
        }

        self.opacity = 0.0;
        if let Some(step) = active.on_in.take() {
            signals.push(FadeSignal::FadedIn {
                token: active.token,
                step,
            });
        }
        log::debug!("{} complete", active.token);
        self.active = None;

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn continuation() -> Continuation<&'static str> {
        Continuation::new("out", "in")
    }

    #[test]
    fn test_fade_rejects_while_busy() {
        let mut fade = ScreenFade::new();

        let first = fade.fade(0.25, 0.5, continuation());
        assert!(first.is_some());
        assert!(fade.is_busy());

        assert!(fade.fade(0.25, 0.5, continuation()).is_none());
        assert_eq!(fade.active_token(), first);
    }

    #[test]
    fn test_fade_signals_each_step_once() {
        let mut fade = ScreenFade::new();
        let token = fade.fade(0.25, 0.5, continuation()).unwrap();

        assert!(fade.update(0.125).is_empty());
        assert!((fade.opacity() - 0.5).abs() < 0.001);

        let signals = fade.update(0.125);
        assert_eq!(
            signals.as_slice(),
            &[FadeSignal::FadedOut { token, step: "out" }]
        );
        assert!((fade.opacity() - 1.0).abs() < 0.001);
        assert!(fade.is_busy());

        assert!(fade.update(0.25).is_empty());
        assert!((fade.opacity() - 0.5).abs() < 0.001);

        let signals = fade.update(0.25);
        assert_eq!(
            signals.as_slice(),
            &[FadeSignal::FadedIn { token, step: "in" }]
        );
        assert!(!fade.is_busy());
        assert_eq!(fade.opacity(), 0.0);

        assert!(fade.update(1.0).is_empty());
    }

    #[test]
    fn test_long_frame_crosses_both_boundaries_in_order() {
        let mut fade = ScreenFade::new();
        let token = fade.fade(0.25, 0.25, continuation()).unwrap();

        let signals = fade.update(2.0);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0], FadeSignal::FadedOut { token, step: "out" });
        assert_eq!(signals[1], FadeSignal::FadedIn { token, step: "in" });
        assert!(!fade.is_busy());
    }

    #[test]
    fn test_tokens_increase_and_accept_after_completion() {
        let mut fade = ScreenFade::new();

        let first = fade.fade(0.0, 0.0, continuation()).unwrap();
        assert_eq!(fade.update(0.0).len(), 2);

        let second = fade.fade(0.1, 0.1, continuation()).unwrap();
        assert!(second > first);
        assert_eq!(second.to_string(), format!("transition#{}", second.get()));
    }
}
