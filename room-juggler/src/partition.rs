use crate::model::{Gender, Guest, GuestId, Room, Wish};
use tracing::warn;

/// The guests, wishes and rooms of one gender, with guest ids renumbered
/// densely in their original order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub gender: Gender,
    pub guests: Vec<Guest>,
    pub wishes: Vec<Wish>,
    pub rooms: Vec<Room>,
    /// `original_guest_ids[new_id]` is the guest's index in the full list.
    pub original_guest_ids: Vec<GuestId>,
}

/// Restricts the full lists to one gender.
///
/// Wishes with a member of another gender (or an unknown member) are dropped.
pub fn filter_genders(
    guests: &[Guest],
    wishes: &[Wish],
    rooms: &[Room],
    gender: Gender,
) -> Partition {
    let mut new_id: Vec<Option<GuestId>> = vec![None; guests.len()];
    let mut original_guest_ids = Vec::new();
    let mut kept_guests = Vec::new();
    for (old, guest) in guests.iter().enumerate() {
        if guest.gender == gender {
            new_id[old] = Some(kept_guests.len());
            original_guest_ids.push(old);
            kept_guests.push(guest.clone());
        }
    }

    let mut kept_wishes = Vec::new();
    for (w, wish) in wishes.iter().enumerate() {
        let ids: Option<Vec<GuestId>> = wish
            .guest_ids
            .iter()
            .map(|&g| new_id.get(g).copied().flatten())
            .collect();
        match ids {
            Some(guest_ids) if !guest_ids.is_empty() => kept_wishes.push(Wish {
                guest_ids,
                submitter: wish.submitter.clone(),
                gender,
            }),
            // Entirely of the other gender: belongs to the other partition.
            _ if wish.gender != gender => {}
            _ => warn!(
                wish = w,
                submitter = %wish.submitter,
                %gender,
                "dropping wish with members outside the partition"
            ),
        }
    }

    let kept_rooms = rooms.iter().filter(|r| r.gender == gender).cloned().collect();

    Partition {
        gender,
        guests: kept_guests,
        wishes: kept_wishes,
        rooms: kept_rooms,
        original_guest_ids,
    }
}
