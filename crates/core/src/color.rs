use lifegrid_protocol::Color;

/// Linear per-channel blend from `from` toward `to`, rounded to the
/// nearest channel value. `t` is clamped to `[0, 1]`; alpha is taken
/// from `from`.
pub fn mix(from: Color, to: Color, t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |a: u8, b: u8| {
        let a = f64::from(a);
        let b = f64::from(b);
        (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
    };
    Color {
        r: channel(from.r, to.r),
        g: channel(from.g, to.g),
        b: channel(from.b, to.b),
        a: from.a,
    }
}

/// Channel-wise arithmetic mean, rounded. `None` for an empty input.
pub fn mean<I>(colors: I) -> Option<Color>
where
    I: IntoIterator<Item = Color>,
{
    let mut sum = [0u32; 3];
    let mut count = 0u32;
    for c in colors {
        sum[0] += u32::from(c.r);
        sum[1] += u32::from(c.g);
        sum[2] += u32::from(c.b);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let avg = |s: u32| (f64::from(s) / f64::from(count)).round() as u8;
    Some(Color::rgb(avg(sum[0]), avg(sum[1]), avg(sum[2])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_endpoints_and_rounding() {
        let a = Color::rgb(0, 100, 255);
        let b = Color::rgb(255, 0, 0);
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), Color::rgb(255, 0, 0));
        // 0 + 255 * 0.5 = 127.5 rounds away from zero
        assert_eq!(mix(a, b, 0.5), Color::rgb(128, 50, 128));
    }

    #[test]
    fn mix_clamps_weight() {
        let a = Color::rgb(10, 10, 10);
        let b = Color::rgb(20, 20, 20);
        assert_eq!(mix(a, b, 3.0), b);
        assert_eq!(mix(a, b, -1.0), a);
        assert_eq!(mix(a, b, f64::NAN), a);
    }

    #[test]
    fn mix_keeps_source_alpha() {
        let a = Color::rgba(0, 0, 0, 0.5);
        assert_eq!(mix(a, Color::rgb(255, 255, 255), 1.0).a, 0.5);
    }

    #[test]
    fn mean_of_colors() {
        let m = mean([Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)]);
        assert_eq!(m, Some(Color::rgb(128, 0, 128)));
        assert_eq!(mean(std::iter::empty()), None);
    }
}
