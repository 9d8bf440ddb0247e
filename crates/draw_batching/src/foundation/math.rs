//! Math utilities and types
//!
//! Provides the small set of 2D math types the batching pre-pass needs.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Clamp an opacity or alpha value into `0.0..=1.0`
///
/// NaN is treated as fully transparent.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(-0.25), 0.0);
        assert_eq!(clamp_unit(0.4), 0.4);
        assert_eq!(clamp_unit(f32::NAN), 0.0);
    }
}
