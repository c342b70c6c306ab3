use crate::model::{GuestId, RoomId, WishId};
use crate::problem::RoomOccupancyProblem;

/// Bookkeeping failure. Never raised by a correct annealer; if it is, the
/// state must not be used any further.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("room #{room} would hold {occupants} guests but has {capacity} beds")]
    RoomOverflow {
        room: RoomId,
        occupants: usize,
        capacity: usize,
    },
    #[error("guest #{guest} has no room")]
    GuestNotAssigned { guest: GuestId },
    #[error("guest #{guest} is already in room #{room}")]
    GuestAlreadyAssigned { guest: GuestId, room: RoomId },
    #[error("guests #{a} and #{b} are both in room #{room}")]
    SameRoom { a: GuestId, b: GuestId, room: RoomId },
    #[error("guest #{guest} and room #{room} disagree about each other")]
    Inconsistent { guest: GuestId, room: RoomId },
    #[error("running happiness {running} differs from recomputed {recomputed}")]
    HappinessDrift { running: i64, recomputed: i64 },
    #[error("fulfilment flag of wish #{wish} is stale")]
    WishDrift { wish: WishId },
}

/// Mutable solution of a [`RoomOccupancyProblem`].
///
/// `room_id_of_guest` and `guest_ids_of_room` are kept as exact inverses and
/// `happiness` / `fulfilled_wishes` are maintained incrementally by every
/// mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentState {
    room_id_of_guest: Vec<Option<RoomId>>,
    guest_ids_of_room: Vec<Vec<GuestId>>,
    fulfilled_wishes: Vec<bool>,
    happiness: i64,
}

impl AssignmentState {
    /// Nobody placed yet.
    pub fn new(problem: &RoomOccupancyProblem) -> Self {
        Self {
            room_id_of_guest: vec![None; problem.n_guests()],
            guest_ids_of_room: problem
                .rooms()
                .iter()
                .map(|r| Vec::with_capacity(r.capacity))
                .collect(),
            fulfilled_wishes: vec![false; problem.n_wishes()],
            happiness: 0,
        }
    }

    pub fn room_id_of_guest(&self) -> &[Option<RoomId>] {
        &self.room_id_of_guest
    }

    pub fn room_of(&self, guest: GuestId) -> Option<RoomId> {
        self.room_id_of_guest[guest]
    }

    pub fn guest_ids_of_room(&self) -> &[Vec<GuestId>] {
        &self.guest_ids_of_room
    }

    pub fn occupants(&self, room: RoomId) -> &[GuestId] {
        &self.guest_ids_of_room[room]
    }

    pub fn fulfilled_wishes(&self) -> &[bool] {
        &self.fulfilled_wishes
    }

    pub fn n_fulfilled(&self) -> usize {
        self.fulfilled_wishes.iter().filter(|&&f| f).count()
    }

    pub fn happiness(&self) -> i64 {
        self.happiness
    }

    pub fn free_beds(&self, problem: &RoomOccupancyProblem, room: RoomId) -> usize {
        problem.capacity(room) - self.guest_ids_of_room[room].len()
    }

    pub fn is_complete(&self) -> bool {
        self.room_id_of_guest.iter().all(Option::is_some)
    }

    /// Relation weight between `guest` and the current occupants of `room`,
    /// not counting `guest` itself.
    pub fn affinity(&self, problem: &RoomOccupancyProblem, guest: GuestId, room: RoomId) -> i64 {
        problem
            .relations()
            .affinity(guest, &self.guest_ids_of_room[room])
    }

    /// Puts an unplaced guest into a room with a free bed.
    pub fn place(
        &mut self,
        problem: &RoomOccupancyProblem,
        guest: GuestId,
        room: RoomId,
    ) -> Result<(), InvariantViolation> {
        if let Some(current) = self.room_id_of_guest[guest] {
            return Err(InvariantViolation::GuestAlreadyAssigned {
                guest,
                room: current,
            });
        }
        self.check_room_has_bed(problem, room)?;
        self.happiness += self.affinity(problem, guest, room);
        self.enter(guest, room);
        self.refresh_wishes_of(problem, guest);
        Ok(())
    }

    /// Happiness change if `guest` moved to `to`.
    pub fn relocate_delta(
        &self,
        problem: &RoomOccupancyProblem,
        guest: GuestId,
        to: RoomId,
    ) -> i64 {
        match self.room_id_of_guest[guest] {
            Some(from) if from != to => {
                self.affinity(problem, guest, to) - self.affinity(problem, guest, from)
            }
            _ => 0,
        }
    }

    /// Happiness change if guests `a` and `b` traded rooms.
    pub fn swap_delta(&self, problem: &RoomOccupancyProblem, a: GuestId, b: GuestId) -> i64 {
        let (Some(x), Some(y)) = (self.room_id_of_guest[a], self.room_id_of_guest[b]) else {
            return 0;
        };
        if x == y {
            return 0;
        }
        // a and b stay apart, so their own weight drops out of both sides.
        let r_ab = problem.relations().get(a, b) as i64;
        let gain = (self.affinity(problem, a, y) - r_ab) + (self.affinity(problem, b, x) - r_ab);
        let loss = self.affinity(problem, a, x) + self.affinity(problem, b, y);
        gain - loss
    }

    /// Moves an assigned guest into another room with a free bed.
    pub fn relocate(
        &mut self,
        problem: &RoomOccupancyProblem,
        guest: GuestId,
        to: RoomId,
    ) -> Result<i64, InvariantViolation> {
        let from = self.room_id_of_guest[guest]
            .ok_or(InvariantViolation::GuestNotAssigned { guest })?;
        if from == to {
            return Err(InvariantViolation::GuestAlreadyAssigned { guest, room: to });
        }
        self.check_room_has_bed(problem, to)?;

        let delta = self.relocate_delta(problem, guest, to);
        self.leave(guest, from)?;
        self.enter(guest, to);
        self.happiness += delta;
        self.refresh_wishes_of(problem, guest);
        Ok(delta)
    }

    /// Exchanges the rooms of two guests. Occupancy counts do not change.
    pub fn swap(
        &mut self,
        problem: &RoomOccupancyProblem,
        a: GuestId,
        b: GuestId,
    ) -> Result<i64, InvariantViolation> {
        let x = self.room_id_of_guest[a]
            .ok_or(InvariantViolation::GuestNotAssigned { guest: a })?;
        let y = self.room_id_of_guest[b]
            .ok_or(InvariantViolation::GuestNotAssigned { guest: b })?;
        if x == y {
            return Err(InvariantViolation::SameRoom { a, b, room: x });
        }

        let delta = self.swap_delta(problem, a, b);
        let slot_a = self.slot(a, x)?;
        let slot_b = self.slot(b, y)?;
        self.guest_ids_of_room[x][slot_a] = b;
        self.guest_ids_of_room[y][slot_b] = a;
        self.room_id_of_guest[a] = Some(y);
        self.room_id_of_guest[b] = Some(x);
        self.happiness += delta;
        self.refresh_wishes_of(problem, a);
        self.refresh_wishes_of(problem, b);
        Ok(delta)
    }

    /// Happiness of the current assignment, summed room by room.
    pub fn recompute_happiness(&self, problem: &RoomOccupancyProblem) -> i64 {
        let rel = problem.relations();
        let mut total = 0i64;
        for occupants in &self.guest_ids_of_room {
            for (x, &a) in occupants.iter().enumerate() {
                for &b in &occupants[x + 1..] {
                    total += rel.get(a, b) as i64;
                }
            }
        }
        total
    }

    /// True iff every member of the wish sits in the same room.
    pub fn is_wish_fulfilled(&self, problem: &RoomOccupancyProblem, wish: WishId) -> bool {
        let ids = &problem.wishes()[wish].guest_ids;
        let Some(&first) = ids.first() else {
            return false;
        };
        let Some(room) = self.room_id_of_guest[first] else {
            return false;
        };
        ids.iter().all(|&g| self.room_id_of_guest[g] == Some(room))
    }

    /// Full audit: inverse mappings, capacities, complete placement,
    /// happiness and wish flags.
    pub fn check_invariants(
        &self,
        problem: &RoomOccupancyProblem,
    ) -> Result<(), InvariantViolation> {
        for (room, occupants) in self.guest_ids_of_room.iter().enumerate() {
            let capacity = problem.capacity(room);
            if occupants.len() > capacity {
                return Err(InvariantViolation::RoomOverflow {
                    room,
                    occupants: occupants.len(),
                    capacity,
                });
            }
            for &g in occupants {
                if self.room_id_of_guest[g] != Some(room) {
                    return Err(InvariantViolation::Inconsistent { guest: g, room });
                }
            }
        }
        for (guest, room) in self.room_id_of_guest.iter().enumerate() {
            let room = room.ok_or(InvariantViolation::GuestNotAssigned { guest })?;
            let hits = self.guest_ids_of_room[room]
                .iter()
                .filter(|&&g| g == guest)
                .count();
            if hits != 1 {
                return Err(InvariantViolation::Inconsistent { guest, room });
            }
        }

        let recomputed = self.recompute_happiness(problem);
        if recomputed != self.happiness {
            return Err(InvariantViolation::HappinessDrift {
                running: self.happiness,
                recomputed,
            });
        }
        for wish in 0..problem.n_wishes() {
            if self.fulfilled_wishes[wish] != self.is_wish_fulfilled(problem, wish) {
                return Err(InvariantViolation::WishDrift { wish });
            }
        }
        Ok(())
    }

    fn check_room_has_bed(
        &self,
        problem: &RoomOccupancyProblem,
        room: RoomId,
    ) -> Result<(), InvariantViolation> {
        let occupants = self.guest_ids_of_room[room].len() + 1;
        let capacity = problem.capacity(room);
        if occupants > capacity {
            return Err(InvariantViolation::RoomOverflow {
                room,
                occupants,
                capacity,
            });
        }
        Ok(())
    }

    fn slot(&self, guest: GuestId, room: RoomId) -> Result<usize, InvariantViolation> {
        self.guest_ids_of_room[room]
            .iter()
            .position(|&g| g == guest)
            .ok_or(InvariantViolation::Inconsistent { guest, room })
    }

    fn enter(&mut self, guest: GuestId, room: RoomId) {
        self.guest_ids_of_room[room].push(guest);
        self.room_id_of_guest[guest] = Some(room);
    }

    fn leave(&mut self, guest: GuestId, room: RoomId) -> Result<(), InvariantViolation> {
        let slot = self.slot(guest, room)?;
        self.guest_ids_of_room[room].swap_remove(slot);
        self.room_id_of_guest[guest] = None;
        Ok(())
    }

    fn refresh_wishes_of(&mut self, problem: &RoomOccupancyProblem, guest: GuestId) {
        for &wish in problem.wish_ids_of_guest(guest) {
            self.fulfilled_wishes[wish] = self.is_wish_fulfilled(problem, wish);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Guest, Room, Wish};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn problem(n_guests: usize, wishes: &[&[GuestId]], caps: &[usize]) -> RoomOccupancyProblem {
        let guests = (0..n_guests)
            .map(|i| Guest::new(format!("g{i}"), Gender::M))
            .collect();
        let wishes = wishes
            .iter()
            .map(|ids| Wish::new(ids.to_vec(), "w", Gender::M))
            .collect();
        let rooms = caps
            .iter()
            .enumerate()
            .map(|(i, &c)| Room::new(format!("r{i}"), c, Gender::M))
            .collect();
        RoomOccupancyProblem::new(guests, wishes, rooms).unwrap()
    }

    fn placed(p: &RoomOccupancyProblem, rooms: &[RoomId]) -> AssignmentState {
        let mut st = AssignmentState::new(p);
        for (g, &r) in rooms.iter().enumerate() {
            st.place(p, g, r).unwrap();
        }
        st
    }

    #[test]
    fn starts_unassigned() {
        let p = problem(3, &[&[0, 1]], &[2, 2]);
        let st = AssignmentState::new(&p);
        assert!(st.room_id_of_guest().iter().all(Option::is_none));
        assert!(st.guest_ids_of_room().iter().all(Vec::is_empty));
        assert_eq!(st.fulfilled_wishes(), &[false]);
        assert_eq!(st.happiness(), 0);
        assert!(!st.is_complete());
        assert!(matches!(
            st.check_invariants(&p),
            Err(InvariantViolation::GuestNotAssigned { guest: 0 })
        ));
    }

    #[test]
    fn place_respects_capacity() {
        let p = problem(3, &[], &[1, 2]);
        let mut st = AssignmentState::new(&p);
        st.place(&p, 0, 0).unwrap();
        assert_eq!(
            st.place(&p, 1, 0),
            Err(InvariantViolation::RoomOverflow {
                room: 0,
                occupants: 2,
                capacity: 1
            })
        );
        assert!(matches!(
            st.place(&p, 0, 1),
            Err(InvariantViolation::GuestAlreadyAssigned { guest: 0, room: 0 })
        ));
        assert_eq!(st.free_beds(&p, 0), 0);
        assert_eq!(st.free_beds(&p, 1), 2);
    }

    #[test]
    fn relocate_updates_happiness_and_wishes() {
        let p = problem(3, &[&[0, 1], &[0, 1, 2]], &[3, 3]);
        let mut st = placed(&p, &[0, 1, 1]);
        assert_eq!(st.happiness(), 1);
        assert_eq!(st.fulfilled_wishes(), &[false, false]);

        assert_eq!(st.relocate_delta(&p, 0, 1), 3);
        assert_eq!(st.relocate(&p, 0, 1).unwrap(), 3);
        assert_eq!(st.happiness(), 4);
        assert_eq!(st.fulfilled_wishes(), &[true, true]);
        assert!(st.occupants(0).is_empty());
        st.check_invariants(&p).unwrap();

        assert!(matches!(
            st.relocate(&p, 0, 1),
            Err(InvariantViolation::GuestAlreadyAssigned { .. })
        ));
    }

    #[test]
    fn relocate_into_full_room_fails_without_change() {
        let p = problem(3, &[], &[1, 2]);
        let mut st = placed(&p, &[0, 1, 1]);
        let before = st.clone();
        assert!(matches!(
            st.relocate(&p, 1, 0),
            Err(InvariantViolation::RoomOverflow { room: 0, .. })
        ));
        assert_eq!(st, before);
    }

    #[test]
    fn swap_excludes_the_swapped_pair() {
        // 0 and 1 want each other; swapping them keeps them apart.
        let p = problem(4, &[&[0, 1], &[0, 3], &[1, 2]], &[2, 2]);
        let mut st = placed(&p, &[0, 0, 1, 1]);
        assert_eq!(st.happiness(), 1);

        let delta = st.swap_delta(&p, 0, 2);
        assert_eq!(st.swap(&p, 0, 2).unwrap(), delta);
        assert_eq!(st.happiness(), st.recompute_happiness(&p));
        st.check_invariants(&p).unwrap();

        let delta = st.swap_delta(&p, 0, 1);
        assert_eq!(st.swap(&p, 0, 1).unwrap(), delta);
        assert_eq!(st.happiness(), st.recompute_happiness(&p));
        assert!(matches!(
            st.swap(&p, 0, 0),
            Err(InvariantViolation::SameRoom { .. })
        ));
    }

    #[test]
    fn wishes_track_split_and_reunion() {
        let p = problem(4, &[&[0, 1, 2], &[3]], &[3, 3]);
        let mut st = placed(&p, &[0, 0, 0, 1]);
        assert_eq!(st.fulfilled_wishes(), &[true, true]);

        st.swap(&p, 2, 3).unwrap();
        assert_eq!(st.fulfilled_wishes(), &[false, true]);
        st.relocate(&p, 0, 1).unwrap();
        st.relocate(&p, 1, 1).unwrap();
        assert_eq!(st.fulfilled_wishes(), &[true, true]);
        assert_eq!(st.occupants(0), &[3]);
        st.check_invariants(&p).unwrap();
    }

    #[test]
    fn random_moves_keep_every_invariant() {
        let wishes: &[&[GuestId]] = &[&[0, 1], &[1, 2, 3], &[4, 5], &[6], &[7, 8, 0], &[2, 9]];
        let p = problem(10, wishes, &[3, 3, 2, 4]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut st = placed(&p, &[0, 0, 0, 1, 1, 1, 2, 3, 3, 3]);
        st.check_invariants(&p).unwrap();

        for _ in 0..2000 {
            let a = rng.gen_range(0..10);
            if rng.gen_bool(0.5) {
                let b = rng.gen_range(0..10);
                if st.room_of(a) != st.room_of(b) {
                    st.swap(&p, a, b).unwrap();
                }
            } else {
                let to = rng.gen_range(0..4);
                if Some(to) != st.room_of(a) && st.free_beds(&p, to) > 0 {
                    st.relocate(&p, a, to).unwrap();
                }
            }
            for room in 0..p.n_rooms() {
                assert!(st.occupants(room).len() <= p.capacity(room));
            }
            assert_eq!(st.happiness(), st.recompute_happiness(&p));
        }
        st.check_invariants(&p).unwrap();
    }
}
