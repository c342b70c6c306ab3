//! JSON roster: guests, rooms and wishes (members given by name), with an
//! optional embedded annealer configuration.

use crate::config::JuggleOptions;
use crate::model::{Gender, Guest, GuestId, Room, Wish};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("malformed roster: {0}")]
    Json(#[from] serde_json::Error),
    #[error("guest {0:?} is listed twice")]
    DuplicateGuest(String),
    #[error("wish #{wish} names unknown guest {name:?}")]
    UnknownGuest { wish: usize, name: String },
    #[error("wish #{0} has no guests")]
    EmptyWish(usize),
    #[error("wish #{wish} is tagged {tag} but {name:?} is {found}")]
    WishGender {
        wish: usize,
        tag: Gender,
        name: String,
        found: Gender,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterGuest {
    pub name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterRoom {
    pub name: String,
    pub capacity: usize,
    pub gender: Gender,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterWish {
    pub guests: Vec<String>,
    #[serde(default)]
    pub submitter: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Raw roster document as read from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    pub guests: Vec<RosterGuest>,
    pub rooms: Vec<RosterRoom>,
    #[serde(default)]
    pub wishes: Vec<RosterWish>,
    #[serde(default)]
    pub config: Option<JuggleOptions>,
}

/// Typed lists ready for partitioning.
#[derive(Debug, Clone, PartialEq)]
pub struct Lists {
    pub guests: Vec<Guest>,
    pub wishes: Vec<Wish>,
    pub rooms: Vec<Room>,
}

impl Roster {
    pub fn from_json(s: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Resolves wish members by name and checks gender tags.
    pub fn into_lists(self) -> Result<Lists, InputError> {
        let mut index: HashMap<&str, GuestId> = HashMap::new();
        for (id, g) in self.guests.iter().enumerate() {
            if index.insert(g.name.as_str(), id).is_some() {
                return Err(InputError::DuplicateGuest(g.name.clone()));
            }
        }

        let mut wishes = Vec::with_capacity(self.wishes.len());
        for (w, raw) in self.wishes.iter().enumerate() {
            let Some(first) = raw.guests.first() else {
                return Err(InputError::EmptyWish(w));
            };
            let mut guest_ids = Vec::with_capacity(raw.guests.len());
            let mut tag = raw.gender;
            for name in &raw.guests {
                let &id = index.get(name.as_str()).ok_or_else(|| InputError::UnknownGuest {
                    wish: w,
                    name: name.clone(),
                })?;
                let found = self.guests[id].gender;
                match tag {
                    Some(expected) if expected != found => {
                        return Err(InputError::WishGender {
                            wish: w,
                            tag: expected,
                            name: name.clone(),
                            found,
                        });
                    }
                    Some(_) => {}
                    None => tag = Some(found),
                }
                guest_ids.push(id);
            }
            let Some(gender) = tag else {
                return Err(InputError::EmptyWish(w));
            };
            wishes.push(Wish {
                guest_ids,
                submitter: raw.submitter.clone().unwrap_or_else(|| first.clone()),
                gender,
            });
        }

        let guests = self
            .guests
            .into_iter()
            .map(|g| Guest::new(g.name, g.gender))
            .collect();
        let rooms = self
            .rooms
            .into_iter()
            .map(|r| Room::new(r.name, r.capacity, r.gender))
            .collect();
        Ok(Lists {
            guests,
            wishes,
            rooms,
        })
    }
}
