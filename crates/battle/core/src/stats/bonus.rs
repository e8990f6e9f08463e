//! Modifier stack applied on top of a base stat value.
//!
//! Calculation order is fixed:
//! `(base + Σ flat) × (1 + Σ percent / 100)`
//!
//! Flat and percentage modifiers on the same stat do not commute, so every
//! effective stat is computed through this single stack.

/// A single modifier contributed by equipment or an active buff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Modifier {
    /// Additive delta (applied first).
    Flat(f64),

    /// Percentage delta, summed with other percentages then multiplied.
    /// `20.0` means +20 %, `-10.0` means -10 %.
    Percent(f64),
}

/// A collection of modifiers that will be applied in the documented order.
///
/// # Example
/// ```
/// # use battle_core::stats::bonus::{Modifier, ModifierStack};
/// let mut stack = ModifierStack::new();
/// stack.add(Modifier::Flat(10.0));
/// stack.add(Modifier::Percent(50.0));
///
/// // (20 + 10) × 1.5
/// assert_eq!(stack.apply(20.0), 45.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifierStack {
    modifiers: Vec<Modifier>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self {
            modifiers: Vec::new(),
        }
    }

    pub fn add(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn extend(&mut self, modifiers: impl IntoIterator<Item = Modifier>) {
        self.modifiers.extend(modifiers);
    }

    /// Apply all modifiers to a base value. The result is not clamped.
    pub fn apply(&self, base: f64) -> f64 {
        let flat_sum: f64 = self
            .modifiers
            .iter()
            .filter_map(|m| match m {
                Modifier::Flat(v) => Some(*v),
                Modifier::Percent(_) => None,
            })
            .sum();

        let percent_sum: f64 = self
            .modifiers
            .iter()
            .filter_map(|m| match m {
                Modifier::Percent(p) => Some(*p),
                Modifier::Flat(_) => None,
            })
            .sum();

        let after_flat = base + flat_sum;
        if percent_sum == 0.0 {
            after_flat
        } else {
            after_flat * (1.0 + percent_sum / 100.0)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack_is_identity() {
        assert_eq!(ModifierStack::new().apply(37.0), 37.0);
    }

    #[test]
    fn flat_before_percent_regardless_of_insertion_order() {
        let mut a = ModifierStack::new();
        a.add(Modifier::Percent(100.0));
        a.add(Modifier::Flat(10.0));

        let mut b = ModifierStack::new();
        b.add(Modifier::Flat(10.0));
        b.add(Modifier::Percent(100.0));

        // (10 + 10) × 2, never 10 × 2 + 10
        assert_eq!(a.apply(10.0), 40.0);
        assert_eq!(a.apply(10.0), b.apply(10.0));
    }

    #[test]
    fn percentages_sum_before_multiplying() {
        let mut stack = ModifierStack::new();
        stack.add(Modifier::Percent(50.0));
        stack.add(Modifier::Percent(-25.0));
        assert_eq!(stack.apply(100.0), 125.0);
        assert_eq!(stack.len(), 2);
    }
}
