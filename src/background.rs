//! Backdrop rendering and foreground compositing
//!
//! Paints solid, gradient, or photographic backdrops and composites a cutout
//! foreground on top, optionally with a soft drop shadow. Gradient specs are
//! resolved to concrete color stops at render time.

use crate::error::{Result, StudioError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use log::debug;

/// Drop shadow blur radius in pixels
const SHADOW_BLUR_RADIUS: f32 = 20.0;
/// Drop shadow vertical offset in pixels
const SHADOW_OFFSET_Y: i64 = 10;
/// Drop shadow opacity
const SHADOW_OPACITY: f32 = 0.3;
/// Fraction of a photographic backdrop the foreground is fitted into
const IMAGE_BACKDROP_FIT: f32 = 0.8;

/// A single gradient color stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient axis, in `[0, 1]`
    pub offset: f32,
    /// Color at this position
    pub color: Rgba<u8>,
}

impl GradientStop {
    /// Create a stop from an offset and color
    #[must_use]
    pub fn new(offset: f32, color: Rgba<u8>) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Fully describes how the backdrop is painted
#[derive(Debug, Clone)]
pub enum BackgroundSpec {
    /// A single flat fill color
    Flat(Rgba<u8>),
    /// Linear gradient between two relative points (coordinates in `[0, 1]`)
    LinearGradient {
        /// Gradient start, relative to the canvas
        start: (f32, f32),
        /// Gradient end, relative to the canvas
        end: (f32, f32),
        /// Ordered color stops
        stops: Vec<GradientStop>,
    },
    /// Radial gradient from a relative center
    RadialGradient {
        /// Center, relative to the canvas
        center: (f32, f32),
        /// Radius as a fraction of the larger canvas dimension
        radius: f32,
        /// Ordered color stops
        stops: Vec<GradientStop>,
    },
    /// Photographic backdrop; the composite adopts its dimensions
    Image(DynamicImage),
}

/// Placement options for the foreground layer
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeOptions {
    /// Uniform scale applied to the foreground; defaults depend on the backdrop
    pub scale: Option<f32>,
    /// Explicit top-left placement; defaults to (0,0) for fills and centered
    /// for photographic backdrops
    pub position: Option<(i64, i64)>,
    /// Render a soft drop shadow beneath the foreground
    pub shadow: bool,
}

impl BackgroundSpec {
    /// Resolve a named showroom preset to a concrete spec
    ///
    /// # Errors
    /// Returns `UnsupportedBackground` for an unknown preset id.
    pub fn from_preset(id: &str) -> Result<Self> {
        let vertical = |stops: Vec<GradientStop>| Self::LinearGradient {
            start: (0.0, 0.0),
            end: (0.0, 1.0),
            stops,
        };
        let spec = match id {
            "studio" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#f5f5f5")?),
                GradientStop::new(1.0, parse_hex("#e0e0e0")?),
            ]),
            "outdoor" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#87CEEB")?),
                GradientStop::new(1.0, parse_hex("#98D8C8")?),
            ]),
            "luxury" => Self::RadialGradient {
                center: (0.5, 0.5),
                radius: 1.0,
                stops: vec![
                    GradientStop::new(0.0, parse_hex("#2d2d2d")?),
                    GradientStop::new(1.0, parse_hex("#1a1a1a")?),
                ],
            },
            "premium" => Self::LinearGradient {
                start: (0.0, 0.0),
                end: (1.0, 1.0),
                stops: vec![
                    GradientStop::new(0.0, parse_hex("#1e3a8a")?),
                    GradientStop::new(0.5, parse_hex("#7c3aed")?),
                    GradientStop::new(1.0, parse_hex("#db2777")?),
                ],
            },
            "modern-studio" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#f3f4f6")?),
                GradientStop::new(1.0, parse_hex("#ffffff")?),
            ]),
            "luxury-showroom" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#111827")?),
                GradientStop::new(0.5, parse_hex("#1f2937")?),
                GradientStop::new(1.0, parse_hex("#111827")?),
            ]),
            "urban-street" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#334155")?),
                GradientStop::new(0.5, parse_hex("#475569")?),
                GradientStop::new(1.0, parse_hex("#64748b")?),
            ]),
            "nature-scene" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#a7f3d0")?),
                GradientStop::new(0.5, parse_hex("#86efac")?),
                GradientStop::new(1.0, parse_hex("#34d399")?),
            ]),
            "night-city" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#1e1b4b")?),
                GradientStop::new(0.5, parse_hex("#1e3a8a")?),
                GradientStop::new(1.0, parse_hex("#0f172a")?),
            ]),
            "race-track" => vertical(vec![
                GradientStop::new(0.0, parse_hex("#7f1d1d")?),
                GradientStop::new(0.5, parse_hex("#1f2937")?),
                GradientStop::new(1.0, parse_hex("#111827")?),
            ]),
            "minimal-white" => Self::Flat(parse_hex("#ffffff")?),
            other => return Err(StudioError::unsupported_background(other)),
        };
        Ok(spec)
    }

    /// All published preset ids, in catalog order
    #[must_use]
    pub fn preset_ids() -> &'static [&'static str] {
        &[
            "studio",
            "outdoor",
            "luxury",
            "premium",
            "modern-studio",
            "luxury-showroom",
            "urban-street",
            "nature-scene",
            "night-city",
            "race-track",
            "minimal-white",
        ]
    }

    /// Paint the backdrop into a fresh buffer of the given dimensions
    pub fn render_backdrop(&self, width: u32, height: u32) -> Result<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(StudioError::invalid_config(
                "backdrop dimensions must be non-zero",
            ));
        }
        let canvas = match self {
            Self::Flat(color) => RgbaImage::from_pixel(width, height, *color),
            Self::LinearGradient { start, end, stops } => {
                render_linear_gradient(width, height, *start, *end, stops)
            },
            Self::RadialGradient {
                center,
                radius,
                stops,
            } => render_radial_gradient(width, height, *center, *radius, stops),
            Self::Image(image) => {
                let rgba = image.to_rgba8();
                if (rgba.width(), rgba.height()) == (width, height) {
                    rgba
                } else {
                    imageops::resize(&rgba, width, height, FilterType::Lanczos3)
                }
            },
        };
        Ok(canvas)
    }
}

/// Composite a cutout foreground onto a backdrop
///
/// Output dimensions match the foreground for flat/gradient backdrops and the
/// backdrop image for photographic ones. For photographic backdrops the
/// foreground is fitted within 80% of the backdrop box and centered unless
/// explicit `scale`/`position` override that.
///
/// # Errors
/// Returns `InvalidConfig` for zero-dimension inputs or a non-positive scale.
pub fn composite(
    foreground: &RgbaImage,
    background: &BackgroundSpec,
    options: &CompositeOptions,
) -> Result<RgbaImage> {
    let (fg_w, fg_h) = foreground.dimensions();
    if fg_w == 0 || fg_h == 0 {
        return Err(StudioError::invalid_config(
            "foreground dimensions must be non-zero",
        ));
    }
    if let Some(scale) = options.scale {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(StudioError::invalid_config(format!(
                "scale must be positive, got {scale}"
            )));
        }
    }

    let (out_w, out_h) = match background {
        BackgroundSpec::Image(image) => {
            let rgba_dims = image.dimensions();
            if rgba_dims.0 == 0 || rgba_dims.1 == 0 {
                return Err(StudioError::invalid_config(
                    "backdrop dimensions must be non-zero",
                ));
            }
            rgba_dims
        },
        _ => (fg_w, fg_h),
    };

    let scale = options.scale.unwrap_or_else(|| match background {
        BackgroundSpec::Image(_) => fit_scale((fg_w, fg_h), (out_w, out_h)),
        _ => 1.0,
    });

    let scaled = if (scale - 1.0).abs() < f32::EPSILON {
        foreground.clone()
    } else {
        let w = ((fg_w as f32 * scale).round() as u32).max(1);
        let h = ((fg_h as f32 * scale).round() as u32).max(1);
        imageops::resize(foreground, w, h, FilterType::Lanczos3)
    };

    let (x, y) = options.position.unwrap_or_else(|| match background {
        BackgroundSpec::Image(_) => (
            (i64::from(out_w) - i64::from(scaled.width())) / 2,
            (i64::from(out_h) - i64::from(scaled.height())) / 2,
        ),
        _ => (0, 0),
    });

    debug!(
        "compositing {}x{} foreground at ({x},{y}) scale {scale:.3} onto {}x{} backdrop",
        fg_w, fg_h, out_w, out_h
    );

    let mut canvas = background.render_backdrop(out_w, out_h)?;

    if options.shadow {
        let shadow = render_shadow(&scaled);
        imageops::overlay(&mut canvas, &shadow, x, y + SHADOW_OFFSET_Y);
    }
    imageops::overlay(&mut canvas, &scaled, x, y);

    Ok(canvas)
}

/// Scale that fits `inner` within `IMAGE_BACKDROP_FIT` of `outer`
fn fit_scale(inner: (u32, u32), outer: (u32, u32)) -> f32 {
    let sx = IMAGE_BACKDROP_FIT * outer.0 as f32 / inner.0 as f32;
    let sy = IMAGE_BACKDROP_FIT * outer.1 as f32 / inner.1 as f32;
    sx.min(sy)
}

/// Blurred black silhouette of the foreground's alpha channel
fn render_shadow(foreground: &RgbaImage) -> RgbaImage {
    let mut silhouette = RgbaImage::new(foreground.width(), foreground.height());
    for (dst, src) in silhouette.pixels_mut().zip(foreground.pixels()) {
        let alpha = (f32::from(src[3]) * SHADOW_OPACITY).round() as u8;
        *dst = Rgba([0, 0, 0, alpha]);
    }
    // Canvas shadowBlur ~= 2 sigma
    imageops::blur(&silhouette, SHADOW_BLUR_RADIUS / 2.0)
}

fn render_linear_gradient(
    width: u32,
    height: u32,
    start: (f32, f32),
    end: (f32, f32),
    stops: &[GradientStop],
) -> RgbaImage {
    let (sx, sy) = (start.0 * width as f32, start.1 * height as f32);
    let (ex, ey) = (end.0 * width as f32, end.1 * height as f32);
    let (dx, dy) = (ex - sx, ey - sy);
    let len_sq = (dx * dx + dy * dy).max(f32::EPSILON);

    RgbaImage::from_fn(width, height, |px, py| {
        let t = ((px as f32 - sx) * dx + (py as f32 - sy) * dy) / len_sq;
        sample_stops(stops, t.clamp(0.0, 1.0))
    })
}

fn render_radial_gradient(
    width: u32,
    height: u32,
    center: (f32, f32),
    radius: f32,
    stops: &[GradientStop],
) -> RgbaImage {
    let (cx, cy) = (center.0 * width as f32, center.1 * height as f32);
    let max_radius = (radius * width.max(height) as f32).max(f32::EPSILON);

    RgbaImage::from_fn(width, height, |px, py| {
        let (dx, dy) = (px as f32 - cx, py as f32 - cy);
        let t = (dx * dx + dy * dy).sqrt() / max_radius;
        sample_stops(stops, t.clamp(0.0, 1.0))
    })
}

/// Interpolate the stop list at parameter `t`
fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba<u8> {
    let Some(first) = stops.first() else {
        return Rgba([0, 0, 0, 255]);
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let f = (t - a.offset) / span;
            return lerp_color(a.color, b.color, f);
        }
    }
    stops[stops.len() - 1].color
}

fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    Rgba([
        mix(a[0], b[0]),
        mix(a[1], b[1]),
        mix(a[2], b[2]),
        mix(a[3], b[3]),
    ])
}

/// Parse a `#rrggbb` or `#rrggbbaa` hex color
///
/// # Errors
/// Returns `InvalidConfig` for malformed input.
pub fn parse_hex(hex: &str) -> Result<Rgba<u8>> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let parse_pair = |range: std::ops::Range<usize>| -> Result<u8> {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| StudioError::invalid_config(format!("malformed hex color '{hex}'")))
    };
    match digits.len() {
        6 => Ok(Rgba([
            parse_pair(0..2)?,
            parse_pair(2..4)?,
            parse_pair(4..6)?,
            255,
        ])),
        8 => Ok(Rgba([
            parse_pair(0..2)?,
            parse_pair(2..4)?,
            parse_pair(4..6)?,
            parse_pair(6..8)?,
        ])),
        _ => Err(StudioError::invalid_config(format!(
            "malformed hex color '{hex}'"
        ))),
    }
}
