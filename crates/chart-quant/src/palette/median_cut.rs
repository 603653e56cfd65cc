//! Median-cut palette construction (Heckbert, 1982).
//!
//! The pixel population is split recursively into boxes in RGB space. Each
//! step picks the box with the widest channel range, sorts its pixels along
//! that channel and cuts at the median. The palette is the mean color of
//! every final box.

use std::collections::HashMap;

use crate::color::Rgb;

/// A set of distinct colors, with pixel counts, sharing one future palette
/// entry.
struct ColorBox {
    colors: Vec<(Rgb, u32)>,
}

impl ColorBox {
    fn population(&self) -> u64 {
        self.colors.iter().map(|&(_, n)| n as u64).sum()
    }

    /// Widest channel as (channel, range). Channel 0 = red, 1 = green, 2 = blue.
    fn widest_channel(&self) -> (usize, u8) {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for (color, _) in &self.colors {
            for (c, v) in color.to_bytes().into_iter().enumerate() {
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }
        let mut best = (0, 0);
        for c in 0..3 {
            let range = max[c].saturating_sub(min[c]);
            if range > best.1 {
                best = (c, range);
            }
        }
        best
    }

    /// Cut at the weighted median along `channel`.
    ///
    /// Requires at least two distinct colors; both halves are non-empty.
    fn split(mut self, channel: usize) -> (ColorBox, ColorBox) {
        self.colors
            .sort_by_key(|(color, _)| (color.to_bytes()[channel], color.to_bytes()));

        let half = self.population().div_ceil(2);
        let mut acc = 0u64;
        let mut cut = self.colors.len() - 1;
        for (i, &(_, n)) in self.colors.iter().enumerate() {
            acc += n as u64;
            if acc >= half {
                cut = i + 1;
                break;
            }
        }
        let cut = cut.clamp(1, self.colors.len() - 1);

        let upper = self.colors.split_off(cut);
        (self, ColorBox { colors: upper })
    }

    /// Population-weighted mean, rounded.
    fn mean(&self) -> Rgb {
        let mut sum = [0u64; 3];
        for &(color, n) in &self.colors {
            sum[0] += color.r as u64 * n as u64;
            sum[1] += color.g as u64 * n as u64;
            sum[2] += color.b as u64 * n as u64;
        }
        let n = self.population().max(1);
        Rgb::new(
            ((sum[0] + n / 2) / n) as u8,
            ((sum[1] + n / 2) / n) as u8,
            ((sum[2] + n / 2) / n) as u8,
        )
    }
}

/// Build a palette of at most `max_colors` colors from `pixels`.
///
/// Returns an empty list only when `pixels` is empty or `max_colors` is 0.
/// Boxes never split a distinct color, so an image with at most
/// `max_colors` distinct colors gets exactly those colors back.
///
/// The result is independent of pixel order and sorted dark to light.
pub fn median_cut(pixels: &[Rgb], max_colors: usize) -> Vec<Rgb> {
    if pixels.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut histogram: HashMap<Rgb, u32> = HashMap::new();
    for &p in pixels {
        *histogram.entry(p).or_insert(0) += 1;
    }
    let mut colors: Vec<(Rgb, u32)> = histogram.into_iter().collect();
    colors.sort_unstable_by_key(|&(c, _)| c);

    let mut boxes = vec![ColorBox { colors }];

    while boxes.len() < max_colors {
        // Widest box first; larger population breaks ties, then earlier box.
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.colors.len() > 1)
            .map(|(i, b)| {
                let (channel, range) = b.widest_channel();
                (i, channel, range, b.population())
            })
            .fold(None::<(usize, usize, u8, u64)>, |best, cur| match best {
                Some(b) if (b.2, b.3) >= (cur.2, cur.3) => Some(b),
                _ => Some(cur),
            });

        let Some((i, channel, _, _)) = candidate else {
            break;
        };

        let target = boxes.remove(i);
        let (lower, upper) = target.split(channel);
        boxes.push(lower);
        boxes.push(upper);
    }

    let mut palette: Vec<Rgb> = Vec::with_capacity(boxes.len());
    for b in &boxes {
        let mean = b.mean();
        if !palette.contains(&mean) {
            palette.push(mean);
        }
    }
    palette.sort_by(|a, b| {
        a.luminance()
            .total_cmp(&b.luminance())
            .then_with(|| a.cmp(b))
    });
    palette
}
