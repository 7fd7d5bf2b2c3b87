use rand::Rng;

use crate::effects::transitions::TransitionKind;
use crate::model::RenderOptions;

/// Transition kind of every slot between adjacent items, drawn once before rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionPlan {
    slots: Vec<Option<TransitionKind>>,
}

impl TransitionPlan {
    /// `item_count - 1` slots: the configured kind, a uniform random kind per slot, or nothing.
    pub fn new<R: Rng + ?Sized>(item_count: usize, opts: &RenderOptions, rng: &mut R) -> Self {
        let n = item_count.saturating_sub(1);
        let slots = if !opts.transitions_enabled() {
            vec![None; n]
        } else if opts.random_transitions {
            (0..n)
                .map(|_| Some(TransitionKind::ALL[rng.gen_range(0..TransitionKind::ALL.len())]))
                .collect()
        } else {
            vec![opts.transition; n]
        };
        Self { slots }
    }

    /// Kind used between item `index` and item `index + 1`.
    pub fn after(&self, index: usize) -> Option<TransitionKind> {
        self.slots.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/plan.rs"]
mod tests;
