use super::*;

fn opts() -> RenderOptions {
    RenderOptions {
        intro_outro: false,
        ..RenderOptions::default()
    }
}

fn photos(n: usize) -> Vec<MediaItem> {
    (0..n)
        .map(|i| MediaItem::photo(format!("p{i}"), format!("p{i}.png")))
        .collect()
}

#[test]
fn popularity_bonus_is_monotonic_and_capped() {
    let mut last = 0;
    for step in 0..100 {
        let bonus = popularity_bonus_ms(Some(f64::from(step) * 0.25));
        assert!(bonus >= last);
        assert!(bonus <= MAX_POPULARITY_BONUS_MS);
        last = bonus;
    }
    assert_eq!(popularity_bonus_ms(Some(1.0)), 500);
    assert_eq!(popularity_bonus_ms(Some(100.0)), 2000);
    assert_eq!(popularity_bonus_ms(None), 0);
    assert_eq!(popularity_bonus_ms(Some(-3.0)), 0);
    assert_eq!(popularity_bonus_ms(Some(f64::NAN)), 0);
}

#[test]
fn smart_duration_never_shrinks_popular_items() {
    let o = RenderOptions {
        smart_duration: true,
        ..opts()
    };
    let mut item = MediaItem::photo("a", "a.png");
    let mut last = 0;
    for score in [0.0, 0.5, 1.0, 2.0, 3.9, 10.0] {
        item.popularity = Some(score);
        let d = base_duration_ms(&item, &o);
        assert!(d >= last);
        assert!(d <= o.item_duration_ms + MAX_POPULARITY_BONUS_MS);
        last = d;
    }
}

#[test]
fn video_floor_survives_short_base_and_transitions() {
    for smart in [false, true] {
        let o = RenderOptions {
            item_duration_ms: 1000,
            smart_duration: smart,
            transition_duration_ms: 800,
            ..opts()
        };
        let items = vec![MediaItem::video("v", "v.mp4"), MediaItem::photo("p", "p.png")];
        let tl = Timeline::schedule(&items, &o).unwrap();
        let floor = if smart { 4000 } else { 3000 };
        assert!(tl.items[0].duration_ms >= floor);
        assert_eq!(tl.items[1].duration_ms, 1000);
    }
}

#[test]
fn transitions_never_take_more_than_half() {
    let o = RenderOptions {
        item_duration_ms: 1000,
        transition_duration_ms: 900,
        ..opts()
    };
    let tl = Timeline::schedule(&photos(3), &o).unwrap();
    assert_eq!(tl.items[0].duration_ms, 500);
    assert_eq!(tl.items[1].duration_ms, 500);
    assert_eq!(tl.items[2].duration_ms, 1000);
    for it in &tl.items {
        assert!(it.duration_ms * 2 >= it.base_ms);
        assert!(it.transition_frames <= it.frames);
    }
    assert_eq!(tl.items[2].transition_frames, 0);
}

#[test]
fn three_items_with_half_second_fades_last_eight_seconds() {
    let o = RenderOptions {
        item_duration_ms: 3000,
        transition_duration_ms: 500,
        ..opts()
    };
    let tl = Timeline::schedule(&photos(3), &o).unwrap();
    assert_eq!(tl.items_ms(), 8000);
    assert_eq!(tl.total_ms(), 8000);
    assert_eq!(tl.items[0].transition_frames, 15);
}

#[test]
fn four_photos_without_transitions_give_240_frames() {
    let o = RenderOptions {
        item_duration_ms: 2000,
        transition: None,
        ..opts()
    };
    let tl = Timeline::schedule(&photos(4), &o).unwrap();
    assert_eq!(tl.total_frames(), 240);
    assert!((tl.total_secs() - 8.0).abs() < 1e-9);
    assert!(tl.items.iter().all(|it| it.transition_frames == 0));
}

#[test]
fn intro_and_outro_add_fixed_cards() {
    let o = RenderOptions {
        item_duration_ms: 2000,
        transition: None,
        intro_outro: true,
        ..RenderOptions::default()
    };
    let tl = Timeline::schedule(&photos(2), &o).unwrap();
    assert_eq!(tl.total_ms(), INTRO_MS + 4000 + OUTRO_MS);
    assert_eq!(tl.intro_frames(), 90);
    assert_eq!(tl.total_frames(), 90 + 120 + 90);
}

#[test]
fn schedule_rejects_empty_items_and_bad_fps() {
    let err = Timeline::schedule(&[], &opts()).unwrap_err();
    assert!(matches!(err, AftermovieError::InvalidInput(_)));

    let o = RenderOptions { fps: 0, ..opts() };
    assert!(Timeline::schedule(&photos(1), &o).is_err());
}
