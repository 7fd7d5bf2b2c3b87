use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn configured_kind_fills_every_slot() {
    let opts = RenderOptions {
        transition: Some(TransitionKind::Rotate),
        ..RenderOptions::default()
    };
    let plan = TransitionPlan::new(4, &opts, &mut StdRng::seed_from_u64(0));
    assert_eq!(plan.len(), 3);
    assert!((0..3).all(|i| plan.after(i) == Some(TransitionKind::Rotate)));
    assert_eq!(plan.after(3), None);
}

#[test]
fn disabled_transitions_give_empty_slots() {
    let opts = RenderOptions {
        transition: None,
        ..RenderOptions::default()
    };
    let plan = TransitionPlan::new(3, &opts, &mut StdRng::seed_from_u64(0));
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.after(0), None);

    let zero = RenderOptions {
        transition_duration_ms: 0,
        ..RenderOptions::default()
    };
    assert_eq!(TransitionPlan::new(3, &zero, &mut StdRng::seed_from_u64(0)).after(0), None);
}

#[test]
fn random_plan_is_stable_for_a_seed() {
    let opts = RenderOptions {
        random_transitions: true,
        transition: None,
        ..RenderOptions::default()
    };
    let a = TransitionPlan::new(40, &opts, &mut StdRng::seed_from_u64(9));
    let b = TransitionPlan::new(40, &opts, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
    assert!((0..39).all(|i| a.after(i).is_some()));
    let distinct: std::collections::HashSet<_> = (0..39).filter_map(|i| a.after(i)).collect();
    assert!(distinct.len() > 1);
}

#[test]
fn single_item_has_no_slots() {
    let plan = TransitionPlan::new(1, &RenderOptions::default(), &mut StdRng::seed_from_u64(0));
    assert!(plan.is_empty());
}
