//! Blur filters.

use crate::core::controls::{ParameterUi, SliderScale};
use crate::core::error::{EvaluationError, EvaluationResult};
use crate::core::node::{Category, TransformNode};
use crate::core::types::{Capability, Image, Value};
use crate::filters::registry::FilterRegistry;

/// Register blur filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(
        "gaussian_blur",
        "Gaussian blur with independent horizontal and vertical sigma",
        || Box::new(GaussianBlur::default()),
    );
}

const SIGMA_RANGE: std::ops::RangeInclusive<f32> = 0.1..=15.0;

/// Applies an anisotropic Gaussian blur to an image.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianBlur {
    sigma_x: f32,
    sigma_y: f32,
}

impl GaussianBlur {
    pub fn sigma_x(&self) -> f32 {
        self.sigma_x
    }

    pub fn sigma_y(&self) -> f32 {
        self.sigma_y
    }
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self {
            sigma_x: 3.0,
            sigma_y: 3.0,
        }
    }
}

/// Normalized Gaussian kernel covering three sigmas on each side.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(1.0) as i32;
    let denominator = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|x| (-((x * x) as f32) / denominator).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

impl TransformNode for GaussianBlur {
    fn name(&self) -> &str {
        "Gaussian Blur"
    }

    fn category(&self) -> Category {
        Category::Blur
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<Image>()
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<Image>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let image = input.get::<Image>()?;

        if !(self.sigma_x > 0.0 && self.sigma_y > 0.0) {
            return Err(EvaluationError::rejected("Sigma must be positive"));
        }
        if image.width() == 0 || image.height() == 0 {
            return Ok(Value::new(image.clone()));
        }

        let h_kernel = gaussian_kernel(self.sigma_x);
        let v_kernel = gaussian_kernel(self.sigma_y);
        let blurred = imageproc::filter::separable_filter(image, &h_kernel, &v_kernel);

        Ok(Value::new(blurred))
    }

    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        let mut changed = ui.slider_f32("sigma_x", &mut self.sigma_x, SIGMA_RANGE, SliderScale::Linear);
        changed |= ui.slider_f32("sigma_y", &mut self.sigma_y, SIGMA_RANGE, SliderScale::Linear);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controls::ScriptedUi;
    use image::Rgb;

    #[test]
    fn test_kernel_is_normalized() {
        let kernel = gaussian_kernel(3.0);

        assert_eq!(kernel.len(), 19);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(kernel[9] > kernel[0]);
    }

    #[test]
    fn test_blur_keeps_flat_image() {
        let image = Image::from_pixel(16, 8, Rgb([90, 120, 30]));
        let blur = GaussianBlur::default();

        let out = blur.evaluate(&Value::new(image.clone())).unwrap();
        let out = out.get::<Image>().unwrap();
        assert_eq!(out.dimensions(), (16, 8));
        // Weights sum to one up to rounding; samples are truncated back to u8
        let expected = [90u8, 120, 30];
        for (got, want) in out.get_pixel(8, 4).0.iter().zip(expected) {
            assert!(got.abs_diff(want) <= 1);
        }
    }

    #[test]
    fn test_blur_spreads_a_dot() {
        let mut image = Image::new(15, 15);
        image.put_pixel(7, 7, Rgb([255, 255, 255]));
        let blur = GaussianBlur {
            sigma_x: 2.0,
            sigma_y: 0.1,
        };

        let out = blur.evaluate(&Value::new(image)).unwrap();
        let out = out.get::<Image>().unwrap();
        assert!(out.get_pixel(8, 7).0[0] > 0);
        assert_eq!(out.get_pixel(7, 8).0[0], 0);
    }

    #[test]
    fn test_blur_passes_empty_image_through() {
        let out = GaussianBlur::default()
            .evaluate(&Value::new(Image::new(0, 0)))
            .unwrap();
        assert_eq!(out.get::<Image>().unwrap().dimensions(), (0, 0));
    }

    #[test]
    fn test_blur_controls_clamp() {
        let mut blur = GaussianBlur::default();
        let mut ui = ScriptedUi::new().set_f32("sigma_y", 0.0);

        assert!(blur.render_parameter_controls(&mut ui));
        assert_eq!(blur.sigma_y(), 0.1);
        assert_eq!(blur.sigma_x(), 3.0);
    }
}
