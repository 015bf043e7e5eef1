//! Display palette; its length bounds the number of cell states

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hard upper bound on the number of states, imposed by the base-100 key packing
pub const MAX_STATES: usize = 100;

/// An RGB colour, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid colour '{}', expected #rrggbb", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| format!("invalid colour '{}', expected #rrggbb", s))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Ordered state colours. State `i` is drawn with `colors[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    /// Largest number of states this palette can display
    pub fn max_states(&self) -> usize {
        self.colors.len().min(MAX_STATES)
    }

    pub fn color(&self, state: usize) -> Option<Rgb> {
        self.colors.get(state).copied()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    /// The classic 16-colour palette
    fn default() -> Self {
        Self::new(vec![
            Rgb::new(0x00, 0x00, 0x00), // black
            Rgb::new(0x00, 0x00, 0xff), // blue
            Rgb::new(0xff, 0xff, 0xff), // white
            Rgb::new(0xff, 0x00, 0x00), // red
            Rgb::new(0xff, 0xff, 0x00), // yellow
            Rgb::new(0x00, 0xff, 0x00), // green
            Rgb::new(0x82, 0x5a, 0x2c), // brown
            Rgb::new(0xfa, 0x68, 0x00), // orange
            Rgb::new(0x00, 0xff, 0xff), // cyan
            Rgb::new(0xaa, 0x00, 0xff), // violet
            Rgb::new(0x64, 0x64, 0x64), // gray
            Rgb::new(0xff, 0x00, 0xff), // magenta
            Rgb::new(0xff, 0x08, 0x7f), // pink
            Rgb::new(0x80, 0x00, 0x00), // dark red
            Rgb::new(0x00, 0x80, 0x00), // dark green
            Rgb::new(0x00, 0x00, 0x80), // dark blue
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_bounds_states() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 16);
        assert_eq!(palette.max_states(), 16);
        assert_eq!(palette.color(0), Some(Rgb::new(0, 0, 0)));
        assert_eq!(palette.color(16), None);
    }

    #[test]
    fn test_rgb_parsing() {
        assert_eq!("#ff087f".parse::<Rgb>().unwrap(), Rgb::new(0xff, 0x08, 0x7f));
        assert_eq!("825A2C".parse::<Rgb>().unwrap(), Rgb::new(0x82, 0x5a, 0x2c));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(0xaa, 0, 0xff).to_string(), "#aa00ff");
    }

    #[test]
    fn test_palette_yaml() {
        let palette: Palette = serde_yaml::from_str("['#000000', '#ffffff']").unwrap();
        assert_eq!(palette.max_states(), 2);
        let yaml = serde_yaml::to_string(&palette).unwrap();
        assert!(yaml.contains("'#ffffff'") || yaml.contains("\"#ffffff\""));
    }
}
