//! Fade transitions
//!
//! A transition masks an instantaneous rig change behind a fade to black:
//! the first continuation step runs at full opacity, the second once the
//! view is clear again. Only one transition can be in flight.

mod fade;
mod token;

pub use fade::ScreenFade;
pub use token::{Continuation, FadeSignal, FadeSignals, TransitionToken};
