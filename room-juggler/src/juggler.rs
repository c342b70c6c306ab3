//! Simulated annealing over room assignments.
//!
//! A run seeds a capacity-feasible assignment, then walks the temperature
//! schedule of a [`JuggleConfig`], trying `n_iter` swap / relocate moves per
//! temperature and accepting them by the Metropolis rule. Every move keeps
//! occupancy within capacity, so the state stays feasible throughout.

use crate::assignment::{AssignmentState, InvariantViolation};
use crate::config::JuggleConfig;
use crate::model::{GuestId, RoomId, WishId};
use crate::monitor::{Monitor, StepReport};
use crate::problem::RoomOccupancyProblem;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum JuggleError {
    #[error("assignment corrupted: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// One atomic change of the assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    /// Guest moves into a room with a free bed.
    Relocate { guest: GuestId, to: RoomId },
    /// Two guests in different rooms trade places.
    Swap { a: GuestId, b: GuestId },
}

impl Move {
    pub fn delta(&self, problem: &RoomOccupancyProblem, state: &AssignmentState) -> i64 {
        match *self {
            Move::Relocate { guest, to } => state.relocate_delta(problem, guest, to),
            Move::Swap { a, b } => state.swap_delta(problem, a, b),
        }
    }

    pub fn apply(
        &self,
        problem: &RoomOccupancyProblem,
        state: &mut AssignmentState,
    ) -> Result<i64, InvariantViolation> {
        match *self {
            Move::Relocate { guest, to } => state.relocate(problem, guest, to),
            Move::Swap { a, b } => state.swap(problem, a, b),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JuggleStats {
    pub attempted: u64,
    pub accepted: u64,
    pub improved: u64,
    pub steps: usize,
    pub seeded_happiness: i64,
    pub best_happiness: i64,
    /// Happiness of the walking state after each temperature step.
    pub happiness_history: Vec<i64>,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct JuggleOutcome {
    /// Best assignment seen during the run.
    pub state: AssignmentState,
    pub stats: JuggleStats,
}

/// Greedy, wish-aware first assignment.
///
/// Larger wishes go first; a wish's unplaced members are kept together when
/// some room still has enough beds for all of them. Everyone else fills the
/// remaining beds at random.
pub fn seed_assignment<R: Rng + ?Sized>(
    problem: &RoomOccupancyProblem,
    rng: &mut R,
) -> Result<AssignmentState, InvariantViolation> {
    let mut state = AssignmentState::new(problem);
    let wishes = problem.wishes();

    let mut order: Vec<WishId> = (0..wishes.len())
        .filter(|&w| wishes[w].guest_ids.len() >= 2)
        .collect();
    order.shuffle(rng);
    order.sort_by_key(|&w| Reverse(wishes[w].guest_ids.len()));

    for w in order {
        let ids = &wishes[w].guest_ids;
        let unplaced: Vec<GuestId> = ids
            .iter()
            .copied()
            .filter(|&g| state.room_of(g).is_none())
            .collect();
        if unplaced.is_empty() {
            continue;
        }
        let need = unplaced.len();

        // Join members that are already seated, if they have room.
        let joined = ids
            .iter()
            .filter_map(|&g| state.room_of(g))
            .find(|&r| state.free_beds(problem, r) >= need);
        let room = joined.or_else(|| {
            let fitting: Vec<RoomId> = (0..problem.n_rooms())
                .filter(|&r| state.free_beds(problem, r) >= need)
                .collect();
            fitting.choose(rng).copied()
        });

        match room {
            Some(room) => {
                for g in unplaced {
                    state.place(problem, g, room)?;
                }
            }
            None => {
                for g in unplaced {
                    let room = roomiest(problem, &state)
                        .ok_or(InvariantViolation::GuestNotAssigned { guest: g })?;
                    state.place(problem, g, room)?;
                }
            }
        }
    }

    let mut rest: Vec<GuestId> = (0..problem.n_guests())
        .filter(|&g| state.room_of(g).is_none())
        .collect();
    rest.shuffle(rng);
    for g in rest {
        let open: Vec<RoomId> = (0..problem.n_rooms())
            .filter(|&r| state.free_beds(problem, r) > 0)
            .collect();
        let room = *open
            .choose(rng)
            .ok_or(InvariantViolation::GuestNotAssigned { guest: g })?;
        state.place(problem, g, room)?;
    }
    Ok(state)
}

fn roomiest(problem: &RoomOccupancyProblem, state: &AssignmentState) -> Option<RoomId> {
    (0..problem.n_rooms())
        .filter(|&r| state.free_beds(problem, r) > 0)
        .max_by_key(|&r| state.free_beds(problem, r))
}

/// Draws a feasible move, or `None` when the problem admits none.
///
/// Half of the draws aim a guest with relations at the room of one of its
/// partners; the rest pick a guest and a different room uniformly. The target
/// room decides the move kind: relocate when it has a free bed (always when
/// it is empty, otherwise on a coin flip), swap with one of its occupants
/// when not.
pub fn propose<R: Rng + ?Sized>(
    problem: &RoomOccupancyProblem,
    state: &AssignmentState,
    related: &[GuestId],
    rng: &mut R,
) -> Option<Move> {
    let n_guests = problem.n_guests();
    let n_rooms = problem.n_rooms();
    if n_guests == 0 || n_rooms < 2 {
        return None;
    }

    let targeted = if !related.is_empty() && rng.gen_bool(0.5) {
        let guest = *related.choose(rng)?;
        let &(partner, _) = problem.relations().partners(guest).choose(rng)?;
        let to = state.room_of(partner)?;
        (state.room_of(guest)? != to).then_some((guest, to))
    } else {
        None
    };

    let (guest, to) = match targeted {
        Some(pick) => pick,
        None => {
            let guest = rng.gen_range(0..n_guests);
            let from = state.room_of(guest)?;
            let mut to = rng.gen_range(0..n_rooms - 1);
            if to >= from {
                to += 1;
            }
            (guest, to)
        }
    };

    let occupants = state.occupants(to);
    if state.free_beds(problem, to) > 0 && (occupants.is_empty() || rng.gen_bool(0.5)) {
        Some(Move::Relocate { guest, to })
    } else {
        let &other = occupants.choose(rng)?;
        Some(Move::Swap { a: guest, b: other })
    }
}

/// Seeds an assignment for `problem` and anneals it, see [`anneal`].
pub fn juggle<R, M>(
    problem: &RoomOccupancyProblem,
    config: &JuggleConfig,
    rng: &mut R,
    monitor: &mut M,
) -> Result<JuggleOutcome, JuggleError>
where
    R: Rng + ?Sized,
    M: Monitor + ?Sized,
{
    let state = seed_assignment(problem, rng)?;
    anneal(problem, config, state, rng, monitor)
}

/// Anneals a complete assignment and returns the best one seen.
///
/// Stops after the last temperature of the schedule, or before the next
/// temperature step once `monitor` reports cancellation.
pub fn anneal<R, M>(
    problem: &RoomOccupancyProblem,
    config: &JuggleConfig,
    mut state: AssignmentState,
    rng: &mut R,
    monitor: &mut M,
) -> Result<JuggleOutcome, JuggleError>
where
    R: Rng + ?Sized,
    M: Monitor + ?Sized,
{
    state.check_invariants(problem)?;

    let related: Vec<GuestId> = (0..problem.n_guests())
        .filter(|&g| !problem.relations().partners(g).is_empty())
        .collect();
    let schedule = config.t_history();
    let total_iter = config.n_total_iter();

    info!(
        guests = problem.n_guests(),
        beds = problem.n_beds(),
        wishes = problem.n_wishes(),
        max_happiness = problem.max_happiness(),
        seeded = state.happiness(),
        steps = schedule.len(),
        total_iter,
        "juggling"
    );

    let mut stats = JuggleStats {
        seeded_happiness: state.happiness(),
        happiness_history: Vec::with_capacity(schedule.len()),
        ..JuggleStats::default()
    };
    let mut best = state.clone();

    for (step, &t) in schedule.iter().enumerate() {
        if monitor.is_cancelled() {
            warn!(step, "cancelled, keeping best assignment so far");
            stats.cancelled = true;
            break;
        }

        let mut accepted = 0usize;
        for _ in 0..config.n_iter() {
            stats.attempted += 1;
            let Some(mv) = propose(problem, &state, &related, rng) else {
                continue;
            };
            let delta = mv.delta(problem, &state);
            // Metropolis: worse moves pass with probability exp(delta / t).
            if delta < 0 && !rng.gen_bool((delta as f64 / t).exp()) {
                continue;
            }
            mv.apply(problem, &mut state)?;
            accepted += 1;
            if delta > 0 {
                stats.improved += 1;
            }
            if state.happiness() > best.happiness() {
                best.clone_from(&state);
            }
        }
        stats.accepted += accepted as u64;
        stats.steps += 1;
        stats.happiness_history.push(state.happiness());

        if cfg!(debug_assertions) {
            state.check_invariants(problem)?;
        }

        monitor.on_step(&StepReport {
            step,
            n_steps: schedule.len(),
            temperature: t,
            happiness: state.happiness(),
            best_happiness: best.happiness(),
            max_happiness: problem.max_happiness(),
            accepted,
            n_iter: config.n_iter(),
            done_iter: stats.attempted,
            total_iter,
        });
    }

    best.check_invariants(problem)?;
    stats.best_happiness = best.happiness();
    info!(
        happiness = best.happiness(),
        max_happiness = problem.max_happiness(),
        fulfilled = best.n_fulfilled(),
        wishes = problem.n_wishes(),
        accepted = stats.accepted,
        attempted = stats.attempted,
        "juggling finished"
    );

    Ok(JuggleOutcome { state: best, stats })
}
