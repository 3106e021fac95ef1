//! RGB/HSV conversions used by the texture recoloring pass.
//!
//! Hue is a fraction in `[0, 1)`, saturation and value in `[0, 1]`, matching
//! the convention of the host engine's color utilities.

/// Convert RGB components in `[0, 1]` to hue/saturation/value.
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta <= 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    let saturation = if max <= 0.0 { 0.0 } else { delta / max };

    (hue, saturation, max)
}

/// Convert hue/saturation/value back to RGB components in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s <= 0.0 {
        return (v, v, v);
    }

    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = (h6.floor() as u32) % 6;
    let f = h6 - h6.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
