use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary gender tag shared by guests, wishes and rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    F,
    M,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::F => "F",
            Gender::M => "M",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown gender tag {0:?} (expected \"M\" or \"F\")")]
pub struct GenderError(pub String);

impl FromStr for Gender {
    type Err = GenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F" | "f" => Ok(Gender::F),
            "M" | "m" => Ok(Gender::M),
            other => Err(GenderError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = GenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Gender> for String {
    fn from(g: Gender) -> Self {
        g.as_str().to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a guest in its guest list (dense, 0-based).
pub type GuestId = usize;
/// Index of a room in its room list (dense, 0-based).
pub type RoomId = usize;
/// Index of a wish in its wish list (dense, 0-based).
pub type WishId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guest {
    pub name: String,
    pub gender: Gender,
}

/// "These guests want to share a room."
///
/// A wish with a single member carries no roommate preference but is still
/// tracked for fulfilment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wish {
    pub guest_ids: Vec<GuestId>,
    pub submitter: String,
    pub gender: Gender,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub capacity: usize,
    pub gender: Gender,
}

impl Guest {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
        }
    }
}

impl Wish {
    pub fn new(guest_ids: Vec<GuestId>, submitter: impl Into<String>, gender: Gender) -> Self {
        Self {
            guest_ids,
            submitter: submitter.into(),
            gender,
        }
    }
}

impl Room {
    pub fn new(name: impl Into<String>, capacity: usize, gender: Gender) -> Self {
        Self {
            name: name.into(),
            capacity,
            gender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_gender_tags() {
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::F);
        assert_eq!(" m ".parse::<Gender>().unwrap(), Gender::M);
        let err = "X".parse::<Gender>().unwrap_err();
        assert!(err.to_string().contains("\"X\""));
    }

    #[test]
    fn gender_serde_uses_tag() {
        let g: Gender = serde_json::from_str("\"f\"").unwrap();
        assert_eq!(g, Gender::F);
        assert_eq!(serde_json::to_string(&Gender::M).unwrap(), "\"M\"");
        assert!(serde_json::from_str::<Gender>("\"D\"").is_err());
    }
}
