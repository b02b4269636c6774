/// Transient damage feedback: red edge tint and screen shake.
///
/// A hit sets both magnitudes and arms their countdowns. Each tick the
/// countdowns run down; an expired countdown zeroes its magnitude. Shake
/// additionally decays geometrically every tick and snaps to zero once
/// negligible, so it always reaches exactly 0.

use super::vitals::DamageSource;

/// Frames a tint or shake stays armed after a hit.
pub const EFFECT_DURATION: u32 = 4;
/// Per-tick shake multiplier (lower = faster).
pub const SHAKE_FALLOFF: f32 = 0.7;
/// Shake below this is treated as still.
pub const SHAKE_EPSILON: f32 = 0.1;

/// Largest tint any source produces; the renderer normalizes against it.
pub const MAX_TINT_ALPHA: f32 = 10.0;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct EffectState {
    pub tint_alpha: f32,
    pub tint_duration: u32,
    pub shake_amount: f32,
    pub shake_duration: u32,
}

/// (tint alpha, shake amount) for a damage source. `None` shake = untouched.
fn magnitudes(source: DamageSource) -> (f32, Option<f32>) {
    match source {
        DamageSource::Passive => (3.0, None),
        DamageSource::Rock => (7.0, Some(2.0)),
        DamageSource::Land => (MAX_TINT_ALPHA, Some(3.0)),
    }
}

impl EffectState {
    pub fn trigger(&mut self, source: DamageSource) {
        let (tint, shake) = magnitudes(source);
        self.tint_alpha = tint;
        self.tint_duration = EFFECT_DURATION;
        if let Some(amount) = shake {
            self.shake_amount = amount;
            self.shake_duration = EFFECT_DURATION;
        }
    }

    pub fn tick(&mut self) {
        if self.tint_duration > 0 {
            self.tint_duration -= 1;
        } else {
            self.tint_alpha = 0.0;
        }

        if self.shake_duration > 0 {
            self.shake_duration -= 1;
        } else {
            self.shake_amount = 0.0;
        }

        if self.shake_amount > 0.0 {
            self.shake_amount *= SHAKE_FALLOFF;
            if self.shake_amount < SHAKE_EPSILON {
                self.shake_amount = 0.0;
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        self.tint_alpha == 0.0 && self.shake_amount == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_source_magnitudes() {
        let mut e = EffectState::default();
        e.trigger(DamageSource::Rock);
        assert_eq!((e.tint_alpha, e.shake_amount), (7.0, 2.0));
        e.trigger(DamageSource::Land);
        assert_eq!((e.tint_alpha, e.shake_amount), (10.0, 3.0));
        assert_eq!((e.tint_duration, e.shake_duration), (4, 4));
    }

    #[test]
    fn passive_tints_without_shake() {
        let mut e = EffectState::default();
        e.trigger(DamageSource::Passive);
        assert_eq!(e.tint_alpha, 3.0);
        assert_eq!(e.tint_duration, 4);
        assert_eq!(e.shake_amount, 0.0);
        assert_eq!(e.shake_duration, 0);
    }

    #[test]
    fn passive_leaves_running_shake_alone() {
        let mut e = EffectState::default();
        e.trigger(DamageSource::Land);
        e.tick();
        let shake = e.shake_amount;
        let shake_left = e.shake_duration;
        e.trigger(DamageSource::Passive);
        assert_eq!(e.shake_amount, shake);
        assert_eq!(e.shake_duration, shake_left);
    }

    #[test]
    fn tint_holds_for_duration_then_clears() {
        let mut e = EffectState::default();
        e.trigger(DamageSource::Rock);
        for left in (0..4).rev() {
            e.tick();
            assert_eq!(e.tint_duration, left);
            assert_eq!(e.tint_alpha, 7.0);
        }
        e.tick();
        assert_eq!(e.tint_alpha, 0.0);
    }

    #[test]
    fn shake_decays_each_tick() {
        let mut e = EffectState::default();
        e.trigger(DamageSource::Land);
        e.tick();
        assert!((e.shake_amount - 3.0 * 0.7).abs() < 1e-6);
        e.tick();
        assert!((e.shake_amount - 3.0 * 0.7 * 0.7).abs() < 1e-6);
    }

    #[test]
    fn shake_reaches_exact_zero_in_bounded_ticks() {
        for source in [DamageSource::Rock, DamageSource::Land] {
            let mut e = EffectState::default();
            e.trigger(source);
            let mut ticks = 0;
            while e.shake_amount != 0.0 {
                e.tick();
                ticks += 1;
                assert!(ticks <= EFFECT_DURATION + 1, "shake never settled");
            }
            // stays at zero
            e.tick();
            assert_eq!(e.shake_amount, 0.0);
        }
    }

    #[test]
    fn snap_to_zero_below_epsilon() {
        let mut e = EffectState { shake_amount: 0.12, shake_duration: 10, ..Default::default() };
        e.tick();
        assert_eq!(e.shake_amount, 0.0);
        assert_eq!(e.shake_duration, 9);
    }

    #[test]
    fn settles_to_idle() {
        let mut e = EffectState::default();
        e.trigger(DamageSource::Land);
        assert!(!e.is_idle());
        for _ in 0..8 { e.tick(); }
        assert!(e.is_idle());
    }
}
