use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! keys {
    ($($variant:ident),* $(,)?) => {
        /// Physical key, named after its position on a US layout.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Key {
            $($variant),*
        }

        impl Key {
            pub const ALL: &'static [Key] = &[$(Key::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

keys! {
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
    KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9,
    Space, Enter, Escape, Tab, Backspace,
    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key: {0}")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for key in Key::ALL {
            assert_eq!(key.name().parse::<Key>(), Ok(*key));
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!("Digit10".parse::<Key>().is_err());
        assert!("keya".parse::<Key>().is_err());
    }

    #[test]
    fn serde_matches_display_name() {
        let yaml = serde_yaml::to_string(&Key::ArrowUp).unwrap();
        assert_eq!(yaml.trim(), "ArrowUp");
        let key: Key = serde_yaml::from_str("F5").unwrap();
        assert_eq!(key, Key::F5);
    }
}
