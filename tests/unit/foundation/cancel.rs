use super::*;

#[test]
fn clones_share_the_flag() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(token.check().is_ok());
    other.cancel();
    assert!(token.is_cancelled());
    assert!(token.check().unwrap_err().is_cancelled());
}

#[test]
fn sleep_wakes_early_when_cancelled() {
    let token = CancelToken::new();
    let remote = token.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        remote.cancel();
    });

    let start = Instant::now();
    let res = token.sleep(Duration::from_secs(10));
    handle.join().unwrap();

    assert!(res.unwrap_err().is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn pacer_budget_follows_fps() {
    let pacer = Pacer::new(25, false);
    assert_eq!(pacer.budget, Duration::from_millis(40));
}

#[test]
fn realtime_pacer_spreads_frames() {
    let token = CancelToken::new();
    let mut pacer = Pacer::new(50, true);
    let start = Instant::now();
    for _ in 0..4 {
        pacer.tick(&token).unwrap();
    }
    // Three full budgets between four ticks.
    assert!(start.elapsed() >= Duration::from_millis(55));
}

#[test]
fn unpaced_tick_still_observes_cancellation() {
    let token = CancelToken::new();
    let mut pacer = Pacer::new(30, false);
    pacer.tick(&token).unwrap();
    token.cancel();
    assert!(pacer.tick(&token).unwrap_err().is_cancelled());
}
