use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn progress_between_clamps_and_handles_empty_span() {
    assert_eq!(progress_between(-1.0, 0.0, 2.0), 0.0);
    assert_eq!(progress_between(1.0, 0.0, 2.0), 0.5);
    assert_eq!(progress_between(5.0, 0.0, 2.0), 1.0);
    assert_eq!(progress_between(1.0, 1.0, 1.0), 1.0);
    assert_eq!(progress_between(0.5, 1.0, 1.0), 0.0);
}
