//! Color types of 8-bit three channel images and conversions between them.
//!
//! Hue is stored on the full 0..=255 range (a full turn is 256 steps), so
//! every channel of every color type fits a `u8`.

use crate::core::types::Image;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the three channels of an [`Image`] are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorType {
    Bgr,
    Rgb,
    Hsv,
    Hls,
}

impl ColorType {
    /// All color types in display order.
    pub fn all() -> &'static [ColorType] {
        &[ColorType::Bgr, ColorType::Rgb, ColorType::Hsv, ColorType::Hls]
    }

    /// Display name; one letter per channel.
    pub fn name(&self) -> &'static str {
        match self {
            ColorType::Bgr => "BGR",
            ColorType::Rgb => "RGB",
            ColorType::Hsv => "HSV",
            ColorType::Hls => "HLS",
        }
    }

    /// Name of channel `index`, e.g. `"S"` for channel 1 of HSV.
    pub fn channel_name(&self, index: usize) -> Option<&'static str> {
        let name = self.name();
        name.get(index..index + 1)
    }

    /// Names of all channels.
    pub fn channel_names(&self) -> [&'static str; 3] {
        let name = self.name();
        [&name[0..1], &name[1..2], &name[2..3]]
    }
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A conversion from one color type to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorConversion {
    pub src: ColorType,
    pub dst: ColorType,
}

impl ColorConversion {
    /// Conversion between two color types, if one of them is BGR or RGB.
    pub fn between(src: ColorType, dst: ColorType) -> Option<Self> {
        let direct = matches!(src, ColorType::Bgr | ColorType::Rgb)
            || matches!(dst, ColorType::Bgr | ColorType::Rgb);
        (src != dst && direct).then_some(Self { src, dst })
    }

    /// Display name, e.g. `"RGB=>HSV"`.
    pub fn name(&self) -> String {
        format!("{}=>{}", self.src, self.dst)
    }

    /// Convert every pixel of `image`.
    pub fn apply(&self, image: &Image) -> Image {
        let mut out = image.clone();
        for pixel in out.pixels_mut() {
            let rgb = to_rgb(self.src, pixel.0);
            pixel.0 = from_rgb(self.dst, rgb);
        }
        out
    }
}

/// A round trip `src => dst => src`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorConversionPair {
    pub name: String,
    pub direct: ColorConversion,
    pub inverse: ColorConversion,
}

/// Every round trip available from `color`.
pub fn possible_conversion_pairs(color: ColorType) -> Vec<ColorConversionPair> {
    ColorType::all()
        .iter()
        .filter_map(|&other| {
            let direct = ColorConversion::between(color, other)?;
            let inverse = ColorConversion::between(other, color)?;
            Some(ColorConversionPair {
                name: format!("{}=>{}=>{}", color, other, color),
                direct,
                inverse,
            })
        })
        .collect()
}

fn to_rgb(color: ColorType, [a, b, c]: [u8; 3]) -> [u8; 3] {
    match color {
        ColorType::Rgb => [a, b, c],
        ColorType::Bgr => [c, b, a],
        ColorType::Hsv => hsv_to_rgb([a, b, c]),
        ColorType::Hls => hls_to_rgb([a, b, c]),
    }
}

fn from_rgb(color: ColorType, rgb: [u8; 3]) -> [u8; 3] {
    match color {
        ColorType::Rgb => rgb,
        ColorType::Bgr => [rgb[2], rgb[1], rgb[0]],
        ColorType::Hsv => rgb_to_hsv(rgb),
        ColorType::Hls => rgb_to_hls(rgb),
    }
}

fn unit(v: u8) -> f32 {
    f32::from(v) / 255.0
}

fn byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Hue in degrees, plus max, min of the unit channels.
fn hue(rgb: [u8; 3]) -> (f32, f32, f32) {
    let [r, g, b] = rgb.map(unit);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    (if h < 0.0 { h + 360.0 } else { h }, max, min)
}

fn hue_byte(degrees: f32) -> u8 {
    ((degrees / 360.0 * 256.0).round() as u32 % 256) as u8
}

fn hue_degrees(h: u8) -> f32 {
    f32::from(h) / 256.0 * 360.0
}

fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let (h, max, min) = hue(rgb);
    let s = if max == 0.0 { 0.0 } else { (max - min) / max };
    [hue_byte(h), byte(s), byte(max)]
}

fn hsv_to_rgb([h, s, v]: [u8; 3]) -> [u8; 3] {
    let (s, v) = (unit(s), unit(v));
    let chroma = v * s;
    from_chroma(hue_degrees(h), chroma, v - chroma)
}

fn rgb_to_hls(rgb: [u8; 3]) -> [u8; 3] {
    let (h, max, min) = hue(rgb);
    let l = (max + min) / 2.0;
    let s = if max == min {
        0.0
    } else if l < 0.5 {
        (max - min) / (max + min)
    } else {
        (max - min) / (2.0 - max - min)
    };
    [hue_byte(h), byte(l), byte(s)]
}

fn hls_to_rgb([h, l, s]: [u8; 3]) -> [u8; 3] {
    let (l, s) = (unit(l), unit(s));
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    from_chroma(hue_degrees(h), chroma, l - chroma / 2.0)
}

fn from_chroma(degrees: f32, chroma: f32, min: f32) -> [u8; 3] {
    let sector = degrees / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    [byte(r + min), byte(g + min), byte(b + min)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const SAMPLES: [[u8; 3]; 6] = [
        [255, 0, 0],
        [0, 255, 0],
        [128, 128, 128],
        [10, 200, 90],
        [250, 240, 5],
        [0, 0, 0],
    ];

    fn close(a: [u8; 3], b: [u8; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 3)
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(ColorType::Hsv.channel_names(), ["H", "S", "V"]);
        assert_eq!(ColorType::Bgr.channel_name(2), Some("R"));
        assert_eq!(ColorType::Rgb.channel_name(3), None);
    }

    #[test]
    fn test_possible_pairs() {
        let names: Vec<String> = possible_conversion_pairs(ColorType::Rgb)
            .into_iter()
            .map(|pair| pair.name)
            .collect();
        assert_eq!(names, ["RGB=>BGR=>RGB", "RGB=>HSV=>RGB", "RGB=>HLS=>RGB"]);

        // No direct HSV <-> HLS conversion
        let from_hsv = possible_conversion_pairs(ColorType::Hsv);
        assert_eq!(from_hsv.len(), 2);
        assert!(ColorConversion::between(ColorType::Hsv, ColorType::Hls).is_none());
    }

    #[test]
    fn test_known_values() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [171, 255, 255]);
        assert_eq!(rgb_to_hls([255, 255, 255]), [0, 255, 0]);
        assert_eq!(from_rgb(ColorType::Bgr, [1, 2, 3]), [3, 2, 1]);
    }

    #[test]
    fn test_round_trips_are_close() {
        for pair in possible_conversion_pairs(ColorType::Rgb) {
            for sample in SAMPLES {
                let image = Image::from_pixel(1, 1, Rgb(sample));
                let back = pair.inverse.apply(&pair.direct.apply(&image));
                assert!(
                    close(back.get_pixel(0, 0).0, sample),
                    "{} changed {:?} into {:?}",
                    pair.name,
                    sample,
                    back.get_pixel(0, 0).0
                );
            }
        }
    }
}
