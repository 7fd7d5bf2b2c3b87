use super::*;

const ALL: [Ease; 3] = [Ease::OutCubic, Ease::InOutCubic, Ease::OutBack];

#[test]
fn endpoints_are_fixed() {
    for ease in ALL {
        assert!(ease.apply(0.0).abs() < 1e-9, "{ease:?} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at 1");
    }
}

#[test]
fn input_is_clamped() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), ease.apply(0.0));
        assert_eq!(ease.apply(7.0), ease.apply(1.0));
    }
}

#[test]
fn in_out_cubic_is_symmetric_and_monotonic() {
    let e = Ease::InOutCubic;
    assert!((e.apply(0.5) - 0.5).abs() < 1e-9);
    for i in 0..100 {
        let t = f64::from(i) / 100.0;
        assert!(e.apply(t + 0.01) >= e.apply(t));
        assert!((e.apply(t) + e.apply(1.0 - t) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn out_back_overshoots() {
    let peak = (0..=100)
        .map(|i| Ease::OutBack.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0);
}
