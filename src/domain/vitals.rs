/// Damage model: hull health, shield, and collision immunity.
///
/// ## Absorption order
///
///   1. Shield takes `min(shield, amount)`.
///   2. If that hit drove a positive shield to zero and damage is left
///      over, the leftover is discarded (overflow block).
///   3. Only damage that arrives with the shield already at zero reaches
///      health, which floors at zero.
///
/// Values are clamped to `[0, max]` after every mutation.

use crate::config::BoatStats;

/// What hurt the boat. Selects damage amount and visual effect.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum DamageSource {
    Passive,
    Land,
    Rock,
}

impl DamageSource {
    pub fn label(self) -> &'static str {
        match self {
            DamageSource::Passive => "passive",
            DamageSource::Land => "land",
            DamageSource::Rock => "rock",
        }
    }
}

/// Sources reported by the chart as per-frame overlap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollisionSource {
    Land,
    Rock,
}

impl From<CollisionSource> for DamageSource {
    fn from(src: CollisionSource) -> Self {
        match src {
            CollisionSource::Land => DamageSource::Land,
            CollisionSource::Rock => DamageSource::Rock,
        }
    }
}

/// How one `apply_damage` call was split.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct DamageOutcome {
    pub absorbed: f32,
    pub blocked: f32,
    pub dealt: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoatVitals {
    health: f32,
    shield: f32,
    max_health: f32,
    max_shield: f32,
}

impl BoatVitals {
    pub fn new(stats: &BoatStats) -> Self {
        let max_health = stats.max_health.max(0.0);
        let max_shield = stats.max_shield.max(0.0);
        BoatVitals {
            health: stats.starting_health.clamp(0.0, max_health),
            shield: stats.starting_shield.clamp(0.0, max_shield),
            max_health,
            max_shield,
        }
    }

    pub fn health(&self) -> f32 { self.health }
    pub fn shield(&self) -> f32 { self.shield }
    pub fn max_health(&self) -> f32 { self.max_health }
    pub fn max_shield(&self) -> f32 { self.max_shield }

    pub fn is_sunk(&self) -> bool {
        self.health <= 0.0
    }

    /// Apply `amount` of damage. Returns `None` for non-positive (or NaN)
    /// amounts, which leave the vitals untouched.
    pub fn apply_damage(&mut self, amount: f32) -> Option<DamageOutcome> {
        if !(amount > 0.0) {
            return None;
        }
        let mut outcome = DamageOutcome::default();
        let mut remaining = amount;

        if self.shield > 0.0 {
            let loss = self.shield.min(remaining);
            self.shield -= loss;
            remaining -= loss;
            outcome.absorbed = loss;

            if self.shield <= 0.0 && remaining > 0.0 {
                outcome.blocked = remaining;
                remaining = 0.0;
            }
        }

        if remaining > 0.0 {
            let before = self.health;
            self.health = (self.health - remaining).max(0.0);
            outcome.dealt = before - self.health;
        }

        self.clamp();
        Some(outcome)
    }

    pub fn restore_health(&mut self, amount: f32) {
        if amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    pub fn restore_shield(&mut self, amount: f32) {
        if amount > 0.0 {
            self.shield = (self.shield + amount).min(self.max_shield);
        }
    }

    fn clamp(&mut self) {
        self.health = self.health.clamp(0.0, self.max_health);
        self.shield = self.shield.clamp(0.0, self.max_shield);
    }
}

/// Per-source contact state. One continuous overlap hurts once.
///
/// `land`/`rock` mean "this overlap has already been charged";
/// `last_*` hold the previous frame's overlap for edge detection.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DamageImmunity {
    pub land: bool,
    pub rock: bool,
    pub last_land_collision: bool,
    pub last_rock_collision: bool,
}

impl DamageImmunity {
    /// Record this frame's overlap for `source`. Returns true exactly when
    /// damage should be applied: on the frame the overlap begins.
    pub fn register(&mut self, source: CollisionSource, overlapping: bool) -> bool {
        let (immune, last) = match source {
            CollisionSource::Land => (&mut self.land, &mut self.last_land_collision),
            CollisionSource::Rock => (&mut self.rock, &mut self.last_rock_collision),
        };
        let entered = overlapping && !*last;
        let hit = entered && !*immune;
        if hit {
            *immune = true;
        } else if !overlapping {
            *immune = false;
        }
        *last = overlapping;
        hit
    }

    #[cfg(test)]
    pub fn is_immune(&self, source: CollisionSource) -> bool {
        match source {
            CollisionSource::Land => self.land,
            CollisionSource::Rock => self.rock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vitals(health: f32, shield: f32) -> BoatVitals {
        BoatVitals::new(&BoatStats {
            starting_health: health,
            starting_shield: shield,
            ..BoatStats::default()
        })
    }

    #[test]
    fn starts_at_configured_values() {
        let v = BoatVitals::new(&BoatStats::default());
        assert_eq!(v.health(), 100.0);
        assert_eq!(v.shield(), 10.0);
        assert_eq!(v.max_health(), 100.0);
        assert_eq!(v.max_shield(), 100.0);
    }

    #[test]
    fn starting_values_are_clamped() {
        let v = vitals(250.0, -4.0);
        assert_eq!(v.health(), 100.0);
        assert_eq!(v.shield(), 0.0);
    }

    #[test]
    fn shield_absorbs_small_hit() {
        let mut v = vitals(100.0, 10.0);
        let out = v.apply_damage(4.0).unwrap();
        assert_eq!(v.shield(), 6.0);
        assert_eq!(v.health(), 100.0);
        assert_eq!(out.absorbed, 4.0);
        assert_eq!(out.dealt, 0.0);
    }

    #[test]
    fn exact_depletion_leaves_health() {
        let mut v = vitals(100.0, 10.0);
        v.apply_damage(10.0);
        assert_eq!(v.shield(), 0.0);
        assert_eq!(v.health(), 100.0);
    }

    #[test]
    fn overflow_is_blocked_on_depleting_hit() {
        let mut v = vitals(100.0, 10.0);
        let out = v.apply_damage(15.0).unwrap();
        assert_eq!(v.shield(), 0.0);
        assert_eq!(v.health(), 100.0);
        assert_eq!(out.blocked, 5.0);
    }

    #[test]
    fn next_hit_after_depletion_reaches_health() {
        let mut v = vitals(100.0, 10.0);
        v.apply_damage(15.0);
        let out = v.apply_damage(15.0).unwrap();
        assert_eq!(v.health(), 85.0);
        assert_eq!(out.dealt, 15.0);
    }

    #[test]
    fn health_floors_at_zero() {
        let mut v = vitals(5.0, 0.0);
        v.apply_damage(40.0);
        assert_eq!(v.health(), 0.0);
        assert!(v.is_sunk());
    }

    #[test]
    fn non_positive_damage_is_noop() {
        let mut v = vitals(100.0, 10.0);
        assert!(v.apply_damage(0.0).is_none());
        assert!(v.apply_damage(-3.0).is_none());
        assert!(v.apply_damage(f32::NAN).is_none());
        assert_eq!(v, vitals(100.0, 10.0));
    }

    #[test]
    fn restores_cap_at_max() {
        let mut v = vitals(90.0, 95.0);
        v.restore_health(20.0);
        v.restore_shield(20.0);
        assert_eq!(v.health(), 100.0);
        assert_eq!(v.shield(), 100.0);
    }

    #[test]
    fn continuous_overlap_hits_once() {
        let mut imm = DamageImmunity::default();
        assert!(imm.register(CollisionSource::Rock, true));
        assert!(imm.is_immune(CollisionSource::Rock));
        for _ in 0..30 {
            assert!(!imm.register(CollisionSource::Rock, true));
        }
        assert!(!imm.register(CollisionSource::Rock, false));
        assert!(!imm.is_immune(CollisionSource::Rock));
        assert!(imm.register(CollisionSource::Rock, true));
    }

    #[test]
    fn sources_are_tracked_independently() {
        let mut imm = DamageImmunity::default();
        assert!(imm.register(CollisionSource::Land, true));
        assert!(imm.register(CollisionSource::Rock, true));
        assert!(!imm.register(CollisionSource::Land, true));
        assert!(imm.last_land_collision && imm.last_rock_collision);
    }

    proptest! {
        #[test]
        fn damage_within_shield_only_touches_shield(shield in 0.5f32..100.0, frac in 0.0f32..=1.0) {
            let mut v = vitals(100.0, shield);
            let a = shield * frac;
            v.apply_damage(a);
            prop_assert!((v.shield() - (shield - a).max(0.0)).abs() < 1e-4);
            prop_assert_eq!(v.health(), 100.0);
        }

        #[test]
        fn unshielded_damage_hits_health(health in 0.0f32..100.0, a in 0.0f32..300.0) {
            let mut v = vitals(health, 0.0);
            v.apply_damage(a);
            prop_assert!((v.health() - (health - a).max(0.0)).abs() < 1e-4);
        }

        #[test]
        fn vitals_stay_in_range(ops in proptest::collection::vec((0u8..3, -50.0f32..150.0), 0..64)) {
            let mut v = BoatVitals::new(&BoatStats::default());
            for (op, amount) in ops {
                match op {
                    0 => { v.apply_damage(amount); }
                    1 => v.restore_health(amount),
                    _ => v.restore_shield(amount),
                }
                prop_assert!((0.0..=v.max_health()).contains(&v.health()));
                prop_assert!((0.0..=v.max_shield()).contains(&v.shield()));
            }
        }
    }
}
