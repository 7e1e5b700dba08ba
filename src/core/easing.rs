use crate::core::timebase::Tick;

#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Cubic ease-out: fast rise early, flattening towards 1.
#[inline]
pub fn ease_out_cubic(p: f32) -> f32 {
    let inv = 1.0 - clamp01(p);
    1.0 - inv * inv * inv
}

/// Fraction of the slowdown phase that has elapsed.
///
/// Not clamped: callers test `>= 1.0` to detect the end of the phase.
pub fn slowdown_progress(now: Tick, slowdown_start: Tick, duration: Tick) -> f32 {
    if duration == 0 {
        return 1.0;
    }
    let elapsed = now.saturating_sub(slowdown_start);
    (elapsed as f64 / duration as f64) as f32
}
