use super::*;

#[test]
fn zero_radius_copies_input() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap(), src);
}

#[test]
fn flat_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 3, sigma_for_radius(3)).unwrap();
    assert_eq!(out, src);
}

#[test]
fn kernel_weights_sum_to_one() {
    for radius in [1, 2, 5, 12] {
        let k = gaussian_kernel_q16(radius, sigma_for_radius(radius)).unwrap();
        assert_eq!(k.len(), (2 * radius + 1) as usize);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 1 << 16);
        assert!(k[radius as usize] >= k[0]);
    }
}

#[test]
fn point_light_spreads_and_keeps_energy() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();

    assert!(out.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    let sum_a: i32 = out.chunks_exact(4).map(|px| i32::from(px[3])).sum();
    assert!((sum_a - 255).abs() <= 4);
    // Symmetric around the centre.
    assert_eq!(out[center - 4..center], out[center + 4..center + 8]);
}

#[test]
fn rejects_mismatched_buffers_and_bad_sigma() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
    assert!(blur_rgba8_premul(&[0u8; 16], 2, 2, 1, 0.0).is_err());
}

#[test]
fn sigma_tracks_radius_with_floor() {
    assert_eq!(sigma_for_radius(0), 0.5);
    assert_eq!(sigma_for_radius(8), 4.0);
}
