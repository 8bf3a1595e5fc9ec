//! Metadata describing how a pending update should be animated.

/// Timing curve of an animated update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Spring,
}

/// An animation request attached to a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Animation {
    pub curve: Curve,
    pub duration_ms: u32,
}

impl Animation {
    pub const fn new(curve: Curve, duration_ms: u32) -> Self {
        Self { curve, duration_ms }
    }

    pub const fn linear(duration_ms: u32) -> Self {
        Self::new(Curve::Linear, duration_ms)
    }

    pub const fn ease_in_out(duration_ms: u32) -> Self {
        Self::new(Curve::EaseInOut, duration_ms)
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::ease_in_out(350)
    }
}

/// Travels with a state change so that the resulting render knows whether
/// (and how) to animate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Transaction {
    pub animation: Option<Animation>,
    pub disables_animations: bool,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animated(animation: Animation) -> Self {
        Self {
            animation: Some(animation),
            disables_animations: false,
        }
    }

    pub fn disabling_animations(mut self) -> Self {
        self.disables_animations = true;
        self
    }

    /// Returns the animation that should actually run, if any.
    pub fn effective_animation(&self) -> Option<Animation> {
        if self.disables_animations {
            None
        } else {
            self.animation
        }
    }

    pub fn is_animated(&self) -> bool {
        self.effective_animation().is_some()
    }
}
