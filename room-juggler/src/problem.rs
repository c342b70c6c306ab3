use crate::model::{Gender, Guest, GuestId, Room, RoomId, Wish, WishId};
use crate::relations::RelationMatrix;

#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("not enough beds: {guests} guests but only {beds} beds")]
    Capacity { guests: usize, beds: usize },
    #[error("room {room:?} has no beds")]
    EmptyRoom { room: String },
    #[error("wish #{wish} references guest #{guest}, but there are only {n_guests} guests")]
    UnknownGuest {
        wish: WishId,
        guest: GuestId,
        n_guests: usize,
    },
    #[error("wish #{wish} lists guest #{guest} more than once")]
    DuplicateMember { wish: WishId, guest: GuestId },
    #[error("{what} {name:?} is {found}, but this problem is {expected}")]
    MixedGenders {
        what: &'static str,
        name: String,
        expected: Gender,
        found: Gender,
    },
}

/// Immutable definition of one room occupancy problem.
///
/// Guests, wishes and rooms are arenas addressed by dense indices. The
/// mutable side of a solution lives in [`crate::assignment::AssignmentState`].
#[derive(Clone, Debug)]
pub struct RoomOccupancyProblem {
    guests: Vec<Guest>,
    wishes: Vec<Wish>,
    rooms: Vec<Room>,
    relations: RelationMatrix,
    wish_ids_of_guest: Vec<Vec<WishId>>,
    n_beds: usize,
    max_happiness: usize,
}

impl RoomOccupancyProblem {
    pub fn new(
        guests: Vec<Guest>,
        wishes: Vec<Wish>,
        rooms: Vec<Room>,
    ) -> Result<Self, ProblemError> {
        let n_guests = guests.len();

        if let Some(room) = rooms.iter().find(|r| r.capacity == 0) {
            return Err(ProblemError::EmptyRoom {
                room: room.name.clone(),
            });
        }
        let n_beds = rooms.iter().map(|r| r.capacity).sum::<usize>();
        if n_guests > n_beds {
            return Err(ProblemError::Capacity {
                guests: n_guests,
                beds: n_beds,
            });
        }

        // One problem, one gender: all rooms must match the first guest (or room).
        let gender = guests
            .first()
            .map(|g| g.gender)
            .or_else(|| rooms.first().map(|r| r.gender));
        if let Some(expected) = gender {
            let offenders = guests
                .iter()
                .map(|g| ("guest", &g.name, g.gender))
                .chain(rooms.iter().map(|r| ("room", &r.name, r.gender)));
            for (what, name, found) in offenders {
                if found != expected {
                    return Err(ProblemError::MixedGenders {
                        what,
                        name: name.clone(),
                        expected,
                        found,
                    });
                }
            }
        }

        let mut wish_ids_of_guest = vec![Vec::new(); n_guests];
        for (w, wish) in wishes.iter().enumerate() {
            for (x, &g) in wish.guest_ids.iter().enumerate() {
                if g >= n_guests {
                    return Err(ProblemError::UnknownGuest {
                        wish: w,
                        guest: g,
                        n_guests,
                    });
                }
                if wish.guest_ids[..x].contains(&g) {
                    return Err(ProblemError::DuplicateMember { wish: w, guest: g });
                }
                wish_ids_of_guest[g].push(w);
            }
        }

        let relations = RelationMatrix::from_wishes(&wishes, n_guests);
        let max_happiness = relations.n_pairs();

        Ok(Self {
            guests,
            wishes,
            rooms,
            relations,
            wish_ids_of_guest,
            n_beds,
            max_happiness,
        })
    }

    pub fn n_guests(&self) -> usize {
        self.guests.len()
    }

    pub fn n_wishes(&self) -> usize {
        self.wishes.len()
    }

    pub fn n_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn n_beds(&self) -> usize {
        self.n_beds
    }

    /// Number of guest pairs that share at least one wish.
    ///
    /// Equals the best reachable happiness whenever no pair shares more than
    /// one wish; see [`Self::max_weighted_happiness`] for the strict bound.
    pub fn max_happiness(&self) -> usize {
        self.max_happiness
    }

    /// Happiness if every related pair shared a room.
    pub fn max_weighted_happiness(&self) -> i64 {
        self.relations.total_weight() as i64
    }

    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    pub fn wishes(&self) -> &[Wish] {
        &self.wishes
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn relations(&self) -> &RelationMatrix {
        &self.relations
    }

    pub fn capacity(&self, room: RoomId) -> usize {
        self.rooms[room].capacity
    }

    pub fn wish_ids_of_guest(&self, guest: GuestId) -> &[WishId] {
        &self.wish_ids_of_guest[guest]
    }
}
