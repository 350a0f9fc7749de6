/// Name of the float uniform the dissolve shader reads.
pub const DISSOLVE_PARAM: &str = "_Dissolve";

/// Dissolve value of a fully visible tile.
pub const VISIBLE: f32 = 0.0;

/// Dissolve value of a fully dissolved tile.
pub const DISSOLVED: f32 = 1.0;

/// A fade stops interpolating once it is this close to its target.
pub const CONVERGENCE_EPSILON: f32 = 0.01;

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp_clamped(from: f32, to: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    from + (to - from) * t
}
