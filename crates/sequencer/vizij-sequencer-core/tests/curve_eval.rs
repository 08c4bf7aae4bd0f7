use vizij_sequencer_core::curve::{
    Extrapolation, InterpMode, RichCurve, RichCurveKey, TangentMode, KEY_TIME_TOLERANCE,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

#[test]
fn linear_keys_with_mixed_extrapolation() {
    let curve = RichCurve::linear(&[(0.0, 0.0), (10.0, 100.0)])
        .with_extrapolation(Extrapolation::Constant, Extrapolation::Linear);
    approx(curve.eval(5.0, 0.0), 50.0, 1e-4);
    approx(curve.eval(-5.0, 0.0), 0.0, 1e-6);
    approx(curve.eval(15.0, 0.0), 150.0, 1e-3);
}

#[test]
fn linear_curve_reproduces_its_keys() {
    let keys = [(0.0, 3.0), (1.5, -2.0), (4.0, 8.0), (4.5, 8.5)];
    let curve = RichCurve::linear(&keys);
    for (t, v) in keys {
        approx(curve.eval(t, 0.0), v, 1e-6);
    }
    // Midpoints sit on the chord.
    for pair in keys.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        approx(curve.eval((t0 + t1) * 0.5, 0.0), (v0 + v1) * 0.5, 1e-5);
    }
}

#[test]
fn single_key_is_flat_even_with_linear_extrapolation() {
    let curve = RichCurve::linear(&[(2.0, 4.0)])
        .with_extrapolation(Extrapolation::Linear, Extrapolation::Linear);
    assert_eq!(curve.eval(-100.0, 0.0), 4.0);
    assert_eq!(curve.eval(100.0, 0.0), 4.0);
}

#[test]
fn coincident_keys_guard_linear_slope() {
    let curve = RichCurve::from_keys(vec![RichCurveKey::new(1.0, 2.0), RichCurveKey::new(1.0, 5.0)])
        .with_extrapolation(Extrapolation::Linear, Extrapolation::Linear);
    assert!(curve.eval(-3.0, 0.0).is_finite());
    assert!(curve.eval(7.0, 0.0).is_finite());
}

#[test]
fn cubic_auto_tangents_smooth_through_middle_key() {
    let mut curve = RichCurve::new();
    for (t, v) in [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)] {
        let h = curve.add_key(t, v, false);
        curve.set_key_interp_mode(h, InterpMode::Cubic);
    }
    let middle = curve.key_handle(1).unwrap();
    let key = curve.get_key(middle).unwrap();
    assert_eq!(key.tangent_mode, TangentMode::Auto);
    approx(key.arrive_tangent, 0.0, 1e-6);
    approx(key.leave_tangent, 0.0, 1e-6);
    // Flat tangents at the peak keep the curve below it.
    assert!(curve.eval(0.9, 0.0) <= 1.0);
    assert!(curve.eval(1.1, 0.0) <= 1.0);
    approx(curve.eval(1.0, 0.0), 1.0, 1e-6);
}

#[test]
fn user_tangents_survive_auto_pass() {
    let mut curve = RichCurve::linear(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]);
    let h = curve.key_handle(1).unwrap();
    curve.set_key_interp_mode(h, InterpMode::Cubic);
    curve.set_key_tangents(h, 5.0, 6.0);
    curve.auto_set_tangents(0.0);
    let key = curve.get_key(h).unwrap();
    assert_eq!(key.tangent_mode, TangentMode::User);
    assert_eq!((key.arrive_tangent, key.leave_tangent), (5.0, 6.0));
}

#[test]
fn baking_preserves_shape_and_reduction_restores_keys() {
    let mut curve = RichCurve::from_keys(vec![
        RichCurveKey::cubic(0.0, 0.0, 0.0, 0.0),
        RichCurveKey::cubic(2.0, 1.0, 0.0, 0.0),
    ]);
    let before: Vec<f32> = (0..=20).map(|i| curve.eval(i as f32 * 0.1, 0.0)).collect();
    curve.bake_curve(0.5, None, None);
    assert_eq!(curve.num_keys(), 5);
    for (i, v) in before.iter().enumerate().step_by(5) {
        approx(curve.eval(i as f32 * 0.1, 0.0), *v, 1e-5);
    }

    let mut line = RichCurve::linear(&[(0.0, 0.0), (4.0, 4.0)]);
    line.bake_curve(1.0, None, None);
    assert_eq!(line.num_keys(), 5);
    line.remove_redundant_keys(1e-4, None, None);
    assert_eq!(line.num_keys(), 2);
}

#[test]
fn baking_below_time_resolution_terminates() {
    let mut curve = RichCurve::linear(&[(1000.0, 0.0), (1001.0, 1.0)]);
    curve.bake_curve(1e-5, None, None);
    assert_eq!(curve.num_keys(), 2);

    // Representable steps still bake at a large start time.
    let mut coarse = RichCurve::linear(&[(1000.0, 0.0), (1001.0, 1.0)]);
    coarse.bake_curve(0.25, None, None);
    assert_eq!(coarse.num_keys(), 5);
    approx(coarse.eval(1000.5, 0.0), 0.5, 1e-4);
}

#[test]
fn update_or_add_respects_order_and_tolerance() {
    let mut curve = RichCurve::new();
    curve.update_or_add_key(2.0, 1.0, false, KEY_TIME_TOLERANCE);
    curve.update_or_add_key(0.0, 0.0, false, KEY_TIME_TOLERANCE);
    curve.update_or_add_key(2.00001, 3.0, false, KEY_TIME_TOLERANCE);
    let keys: Vec<(f32, f32)> = curve.keys().iter().map(|k| (k.time, k.value)).collect();
    assert_eq!(keys, vec![(0.0, 0.0), (2.0, 3.0)]);
}

#[test]
fn value_range_and_reset() {
    let mut curve = RichCurve::linear(&[(0.0, 3.0), (1.0, -1.0), (2.0, 7.0)]);
    assert_eq!(curve.value_range(), Some((-1.0, 7.0)));
    let h = curve.key_handle(0).unwrap();
    curve.reset();
    assert_eq!(curve.num_keys(), 0);
    assert!(curve.get_key(h).is_none());
    assert_eq!(curve.eval(1.0, 9.0), 9.0);
}
