//! Scalar interpolation helpers shared by the curve types.

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Evaluate a 1D cubic Bezier through de Casteljau subdivision.
#[inline]
pub fn bezier_interp(p0: f32, p1: f32, p2: f32, p3: f32, alpha: f32) -> f32 {
    let p01 = lerp_f32(p0, p1, alpha);
    let p12 = lerp_f32(p1, p2, alpha);
    let p23 = lerp_f32(p2, p3, alpha);
    let p012 = lerp_f32(p01, p12, alpha);
    let p123 = lerp_f32(p12, p23, alpha);
    lerp_f32(p012, p123, alpha)
}

/// Wrap `time` into `[min_time, max_time]`, returning the wrapped time and the
/// absolute number of whole cycles that were removed.
///
/// Landing exactly on the far boundary after wrapping from the other side
/// snaps to the near boundary so that cycling stays continuous.
pub fn cycle_time(min_time: f32, max_time: f32, time: f32) -> (f32, i32) {
    let duration = max_time - min_time;
    if duration <= 0.0 {
        return (time, 0);
    }
    let init_time = time;
    let mut time = time;
    let mut cycles = 0i32;
    if time > max_time {
        cycles = ((max_time - time) / duration).floor() as i32;
        time += duration * cycles as f32;
    } else if time < min_time {
        cycles = ((time - min_time) / duration).floor() as i32;
        time -= duration * cycles as f32;
    }
    if time == max_time && init_time < min_time {
        time = min_time;
    }
    if time == min_time && init_time > max_time {
        time = max_time;
    }
    (time, cycles.abs())
}

/// Keep `value` within ±180 degrees of `previous` without changing the
/// orientation it describes.
#[inline]
pub fn unwind_degrees(previous: f32, mut value: f32) -> f32 {
    while value - previous > 180.0 {
        value -= 360.0;
    }
    while value - previous < -180.0 {
        value += 360.0;
    }
    value
}
