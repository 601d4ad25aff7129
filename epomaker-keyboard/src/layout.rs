//! RT100 key layout: key names to LED indices and back
//!
//! LED indices follow the firmware's column-major wiring, which is why
//! neighbouring keys on the same row are six slots apart. A few slots
//! (29, 35, 47) are not wired to any key.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Number of LED slots addressed by per-key color transfers
pub const LED_SLOTS: usize = 102;

/// Key name and LED index for every key on the RT100
const RT100_KEYS: &[(&str, u8)] = &[
    ("ESC", 0),
    ("BACKQUOTE", 1),
    ("TAB", 2),
    ("CAPS", 3),
    ("LEFT_SHIFT", 4),
    ("LEFT_CTRL", 5),
    ("F1", 6),
    ("NUMROW_1", 7),
    ("Q", 8),
    ("A", 9),
    ("BACKSLASH", 10),
    ("DIAL", 11),
    ("F2", 12),
    ("NUMROW_2", 13),
    ("W", 14),
    ("S", 15),
    ("Z", 16),
    ("LEFT_WIN", 17),
    ("F3", 18),
    ("NUMROW_3", 19),
    ("E", 20),
    ("D", 21),
    ("X", 22),
    ("LEFT_ALT", 23),
    ("F4", 24),
    ("NUMROW_4", 25),
    ("R", 26),
    ("F", 27),
    ("C", 28),
    ("F5", 30),
    ("NUMROW_5", 31),
    ("T", 32),
    ("G", 33),
    ("V", 34),
    ("F6", 36),
    ("NUMROW_6", 37),
    ("Y", 38),
    ("H", 39),
    ("B", 40),
    ("SPACE", 41),
    ("F7", 42),
    ("NUMROW_7", 43),
    ("U", 44),
    ("J", 45),
    ("N", 46),
    ("F8", 48),
    ("NUMROW_8", 49),
    ("I", 50),
    ("K", 51),
    ("M", 52),
    ("RIGHT_ALT", 53),
    ("F9", 54),
    ("NUMROW_9", 55),
    ("O", 56),
    ("L", 57),
    ("COMMA", 58),
    ("FN", 59),
    ("F10", 60),
    ("NUMROW_0", 61),
    ("P", 62),
    ("SEMICOLON", 63),
    ("DOT", 64),
    ("RIGHT_CTRL", 65),
    ("F11", 66),
    ("NUMROW_MINUS", 67),
    ("LEFT_BRACKET", 68),
    ("QUOTE", 69),
    ("SLASH", 70),
    ("LEFT", 71),
    ("F12", 72),
    ("NUMROW_EQUAL", 73),
    ("RIGHT_BRACKET", 74),
    ("HASH", 75),
    ("RIGHT_SHIFT", 76),
    ("DOWN", 77),
    ("DEL", 78),
    ("BACKSPACE", 79),
    ("ENTER", 80),
    ("NUMPAD_4", 81),
    ("UP", 82),
    ("RIGHT", 83),
    ("PGUP", 84),
    ("NUMLOCK", 85),
    ("NUMPAD_7", 86),
    ("NUMPAD_5", 87),
    ("NUMPAD_1", 88),
    ("NUMPAD_0", 89),
    ("PGDOWN", 90),
    ("NUMPAD_SLASH", 91),
    ("NUMPAD_8", 92),
    ("NUMPAD_6", 93),
    ("NUMPAD_2", 94),
    ("NUMPAD_DOT", 95),
    ("NUMPAD_MINUS", 96),
    ("NUMPAD_ASTERISK", 97),
    ("NUMPAD_9", 98),
    ("NUMPAD_PLUS", 99),
    ("NUMPAD_3", 100),
    ("NUMPAD_ENTER", 101),
];

/// A key on the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    name: &'static str,
    led_index: u8,
}

impl Key {
    /// Canonical (upper-case) key name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Position of the key's LED in per-key transfers
    pub fn led_index(&self) -> u8 {
        self.led_index
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Immutable bidirectional key table
#[derive(Debug)]
pub struct KeyLayout {
    name: &'static str,
    keys: Vec<Key>,
    by_name: HashMap<&'static str, usize>,
    by_led: HashMap<u8, usize>,
}

impl KeyLayout {
    fn from_table(name: &'static str, table: &'static [(&'static str, u8)]) -> Self {
        let mut keys: Vec<Key> = table
            .iter()
            .map(|&(name, led_index)| Key { name, led_index })
            .collect();
        keys.sort_by_key(|k| k.led_index);

        let by_name = keys.iter().enumerate().map(|(i, k)| (k.name, i)).collect();
        let by_led = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.led_index, i))
            .collect();
        Self {
            name,
            keys,
            by_name,
            by_led,
        }
    }

    /// Layout display name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a key by name, ignoring case
    pub fn key(&self, name: &str) -> Option<Key> {
        let upper = name.trim().to_ascii_uppercase();
        self.by_name.get(upper.as_str()).map(|&i| self.keys[i])
    }

    /// LED index for a key name
    pub fn led_index(&self, name: &str) -> Option<u8> {
        self.key(name).map(|k| k.led_index)
    }

    /// Key wired to an LED index
    pub fn key_at(&self, led_index: u8) -> Option<Key> {
        self.by_led.get(&led_index).map(|&i| self.keys[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.key(name).is_some()
    }

    /// All keys in LED order
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }

    /// Keys whose name contains `filter` (case-insensitive)
    pub fn filter<'a>(&'a self, filter: &str) -> impl Iterator<Item = Key> + 'a {
        let needle = filter.to_ascii_uppercase();
        self.keys().filter(move |k| k.name.contains(needle.as_str()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

static RT100: OnceLock<KeyLayout> = OnceLock::new();

/// Get the RT100 layout
pub fn rt100() -> &'static KeyLayout {
    RT100.get_or_init(|| KeyLayout::from_table("Epomaker RT100", RT100_KEYS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_bijective() {
        let layout = rt100();
        let names: HashSet<_> = RT100_KEYS.iter().map(|(n, _)| *n).collect();
        let leds: HashSet<_> = RT100_KEYS.iter().map(|(_, i)| *i).collect();
        assert_eq!(names.len(), RT100_KEYS.len());
        assert_eq!(leds.len(), RT100_KEYS.len());
        assert_eq!(layout.len(), 99);
        assert!(leds.iter().all(|&i| (i as usize) < LED_SLOTS));
    }

    #[test]
    fn test_lookup_both_ways() {
        let layout = rt100();
        assert_eq!(layout.led_index("ESC"), Some(0));
        assert_eq!(layout.led_index("numpad_enter"), Some(101));
        assert_eq!(layout.led_index(" space "), Some(41));
        assert_eq!(layout.key_at(59).map(|k| k.name()), Some("FN"));
        assert_eq!(layout.key_at(29), None);
        assert_eq!(layout.led_index("HYPER"), None);
    }

    #[test]
    fn test_keys_in_led_order() {
        let indices: Vec<u8> = rt100().keys().map(|k| k.led_index()).collect();
        let mut sorted = indices.clone();
        sorted.sort();
        assert_eq!(indices, sorted);
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&101));
    }

    #[test]
    fn test_filter() {
        let numpad: Vec<_> = rt100().filter("numpad").collect();
        assert_eq!(numpad.len(), 16);
        assert!(numpad.iter().all(|k| k.name().starts_with("NUMPAD")));
    }
}
