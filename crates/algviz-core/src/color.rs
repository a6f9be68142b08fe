//! Colors and the per-element highlight stack.
//!
//! A [`ColorStack`] holds the distinct highlight colors currently applied to one node or edge.
//! Resolution multiplies every channel of the background by `channel / 255` of each active
//! color, in sorted order, and truncates at the end, so two stacks holding the same colors
//! resolve to the same value no matter how they were built.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Text color that stays readable on top of `self`.
    pub fn contrast_text(self) -> Rgb {
        let sum = u32::from(self.r) + u32::from(self.g) + u32::from(self.b);
        if sum < 150 { Rgb::WHITE } else { Rgb::BLACK }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`, expected #rrggbb")))
    }
}

/// LightGray, Wheat, LightPink, DarkOliveGreen, Plum, LightSkyBlue, LightGreen, Goldenrod.
pub const DEFAULT_TRACE_COLORS: [Rgb; 8] = [
    Rgb::new(211, 211, 211),
    Rgb::new(245, 222, 179),
    Rgb::new(255, 182, 193),
    Rgb::new(202, 255, 112),
    Rgb::new(221, 160, 221),
    Rgb::new(176, 226, 255),
    Rgb::new(144, 238, 144),
    Rgb::new(255, 193, 37),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorStack {
    colors: Vec<Rgb>,
}

impl ColorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `color` unless it is already active.
    pub fn add(&mut self, color: Rgb) {
        if !self.colors.contains(&color) {
            self.colors.push(color);
        }
    }

    /// Removes `color`, returning whether it was active.
    pub fn remove(&mut self, color: Rgb) -> bool {
        match self.colors.iter().position(|c| *c == color) {
            Some(idx) => {
                self.colors.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Active colors in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.colors.iter().copied()
    }

    pub fn resolve(&self) -> Rgb {
        self.resolve_over(Rgb::WHITE)
    }

    pub fn resolve_over(&self, background: Rgb) -> Rgb {
        let mut sorted = self.colors.clone();
        sorted.sort_unstable();

        let mut r = f64::from(background.r);
        let mut g = f64::from(background.g);
        let mut b = f64::from(background.b);
        for c in &sorted {
            r *= f64::from(c.r) / 255.0;
            g *= f64::from(c.g) / 255.0;
            b *= f64::from(c.b) / 255.0;
        }
        Rgb::new(r as u8, g as u8, b as u8)
    }
}

/// Trace colors of one scene and the cursors currently holding them.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb>,
    claimed: IndexMap<Rgb, Option<String>>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self {
            colors,
            claimed: IndexMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.colors.len()
    }

    /// Claims the first free color for a new cursor.
    pub fn claim(&mut self, name: Option<&str>) -> Result<Rgb> {
        let Some(color) = self
            .colors
            .iter()
            .copied()
            .find(|c| !self.claimed.contains_key(c))
        else {
            return Err(Error::TraceOverflow {
                capacity: self.colors.len(),
            });
        };
        self.claimed.insert(color, name.map(str::to_string));
        Ok(color)
    }

    pub fn release(&mut self, color: Rgb) -> bool {
        self.claimed.shift_remove(&color).is_some()
    }

    pub fn is_claimed(&self, color: Rgb) -> bool {
        self.claimed.contains_key(&color)
    }

    /// Named cursors in claim order.
    pub fn legend(&self) -> Vec<(Rgb, String)> {
        self.claimed
            .iter()
            .filter_map(|(c, name)| name.as_ref().map(|n| (*c, n.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const GREEN: Rgb = Rgb::new(0, 255, 0);
    const WHEAT: Rgb = Rgb::new(245, 222, 179);

    #[test]
    fn empty_stack_resolves_to_background() {
        assert_eq!(ColorStack::new().resolve(), Rgb::WHITE);
        assert_eq!(ColorStack::new().resolve_over(WHEAT), WHEAT);
    }

    #[test]
    fn add_is_idempotent() {
        let mut s = ColorStack::new();
        s.add(RED);
        s.add(RED);
        assert_eq!(s.len(), 1);
        assert!(s.remove(RED));
        assert!(s.is_empty());
    }

    #[test]
    fn red_over_green_is_black() {
        let mut s = ColorStack::new();
        s.add(RED);
        s.add(GREEN);
        assert_eq!(s.resolve(), Rgb::BLACK);
    }

    #[test]
    fn single_color_over_white_is_itself() {
        let mut s = ColorStack::new();
        s.add(WHEAT);
        assert_eq!(s.resolve(), WHEAT);
    }

    #[test]
    fn hex_roundtrip_and_contrast() {
        assert_eq!(WHEAT.to_hex(), "#f5deb3");
        assert_eq!(Rgb::from_hex("#F5DEB3"), Some(WHEAT));
        assert_eq!(Rgb::from_hex("f5deb3"), Some(WHEAT));
        assert_eq!(Rgb::from_hex("#f5de"), None);
        assert_eq!(Rgb::new(40, 40, 40).contrast_text(), Rgb::WHITE);
        assert_eq!(WHEAT.contrast_text(), Rgb::BLACK);
    }

    #[test]
    fn palette_overflows_after_capacity() {
        let mut p = Palette::new(vec![RED, GREEN]);
        assert_eq!(p.claim(Some("i")), Ok(RED));
        assert_eq!(p.claim(None), Ok(GREEN));
        assert_eq!(p.claim(None), Err(Error::TraceOverflow { capacity: 2 }));
        assert!(p.release(RED));
        assert_eq!(p.claim(Some("j")), Ok(RED));
        assert_eq!(p.legend(), vec![(RED, "j".to_string())]);
    }
}
