//! 8-bit RGB color
//!
//! [`Rgb`] is the single color representation shared by the quantizer and
//! the chart engine built on top of it.

use std::fmt;
use std::str::FromStr;

use crate::palette::ParseColorError;

/// A color as three 8-bit sRGB channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rgb {
    /// Red channel (0..=255)
    pub r: u8,
    /// Green channel (0..=255)
    pub g: u8,
    /// Blue channel (0..=255)
    pub b: u8,
}

impl Rgb {
    /// Pure white, the fallback for indices with no palette color.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from its three channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a byte array `[R, G, B]`.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Convert to a byte array `[R, G, B]`.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Lowercase `#rrggbb` representation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Squared Euclidean distance in RGB space.
    #[inline]
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean distance in RGB space.
    #[inline]
    pub fn distance(self, other: Rgb) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Red-mean weighted distance.
    ///
    /// With `r̄ = (r1 + r2) / 2` the squared distance is
    /// `(2 + r̄/256)·Δr² + 4·Δg² + (2 + (255 − r̄)/256)·Δb²`, evaluated with
    /// the integer shifts of the reference formula:
    ///
    /// ```text
    /// (((512 + r̄) · Δr²) >> 8) + 4·Δg² + (((767 − r̄) · Δb²) >> 8)
    /// ```
    pub fn redmean_distance(self, other: Rgb) -> f64 {
        let rmean = (self.r as i64 + other.r as i64) / 2;
        let dr = self.r as i64 - other.r as i64;
        let dg = self.g as i64 - other.g as i64;
        let db = self.b as i64 - other.b as i64;
        let sum = (((512 + rmean) * dr * dr) >> 8) + 4 * dg * dg + (((767 - rmean) * db * db) >> 8);
        (sum as f64).sqrt()
    }

    /// Rec. 601 luma: `0.299 r + 0.587 g + 0.114 b`.
    #[inline]
    pub fn luminance(self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    /// Integer-truncated per-channel average of a set of colors.
    ///
    /// Returns `None` for an empty input.
    pub fn average<I>(colors: I) -> Option<Rgb>
    where
        I: IntoIterator<Item = Rgb>,
    {
        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for c in colors {
            sum[0] += c.r as u64;
            sum[1] += c.g as u64;
            sum[2] += c.b as u64;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Rgb::new(
            (sum[0] / count) as u8,
            (sum[1] / count) as u8,
            (sum[2] / count) as u8,
        ))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        color.to_bytes()
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB` (case-insensitive,
    /// surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }

        match s.len() {
            3 => {
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                Ok(Self::new(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing_6digit() {
        let red: Rgb = "#FF0000".parse().unwrap();
        assert_eq!(red, Rgb::new(255, 0, 0));

        let no_hash: Rgb = "00ff7f".parse().unwrap();
        assert_eq!(no_hash, Rgb::new(0, 255, 127));
    }

    #[test]
    fn test_hex_parsing_shorthand() {
        let color: Rgb = "#ABC".parse().unwrap();
        assert_eq!(color, Rgb::new(0xAA, 0xBB, 0xCC));
    }

    #[test]
    fn test_hex_parsing_errors() {
        assert!(matches!(
            "#GGG".parse::<Rgb>(),
            Err(ParseColorError::InvalidHex(_))
        ));
        assert!(matches!(
            "#FFFF".parse::<Rgb>(),
            Err(ParseColorError::InvalidLength)
        ));
        assert!(matches!(
            "".parse::<Rgb>(),
            Err(ParseColorError::InvalidLength)
        ));
        assert!(matches!(
            "#éé".parse::<Rgb>(),
            Err(ParseColorError::InvalidLength)
        ));
    }

    #[test]
    fn test_to_hex_lowercase() {
        assert_eq!(Rgb::new(255, 0, 171).to_hex(), "#ff00ab");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(3, 4, 0);
        assert_eq!(a.distance_squared(b), 25);
        assert!((a.distance(b) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_redmean_distance_reference_values() {
        // Pure red channel difference with r̄ = 127:
        // ((512 + 127) * 255²) >> 8 = 162_086
        let d = Rgb::new(255, 0, 0).redmean_distance(Rgb::BLACK);
        assert!((d - (162_086f64).sqrt()).abs() < 1e-9);

        // Green carries a fixed weight of 4
        let d = Rgb::new(0, 10, 0).redmean_distance(Rgb::BLACK);
        assert!((d - 20.0).abs() < 1e-9);

        // Symmetric
        let a = Rgb::new(200, 30, 90);
        let b = Rgb::new(10, 120, 250);
        assert_eq!(a.redmean_distance(b), b.redmean_distance(a));
    }

    #[test]
    fn test_luminance() {
        assert!((Rgb::WHITE.luminance() - 255.0).abs() < 1e-9);
        assert_eq!(Rgb::BLACK.luminance(), 0.0);
        assert!((Rgb::new(0, 255, 0).luminance() - 149.685).abs() < 1e-9);
    }

    #[test]
    fn test_average_truncates() {
        let avg = Rgb::average([Rgb::new(0, 0, 0), Rgb::new(255, 1, 3)]).unwrap();
        assert_eq!(avg, Rgb::new(127, 0, 1));
        assert_eq!(Rgb::average(std::iter::empty()), None);
    }
}
