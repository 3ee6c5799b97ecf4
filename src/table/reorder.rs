//! Manual row reordering
//!
//! Rows are matched by identifier, not positional index, so a reorder
//! stays correct while a sort or filter changes what is on screen. The
//! move mutates only the in-memory order; no persistence hook exists.

use uuid::Uuid;

/// Move the element at `from` to `to`, shifting the elements between
/// the two positions by one slot
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Move the row with id `active` to the position of the row with id
/// `over`
///
/// A drop onto itself or onto an unknown id is a no-op. Returns whether
/// the order changed.
pub fn move_by_id<T>(rows: &mut Vec<T>, id_of: impl Fn(&T) -> Uuid, active: Uuid, over: Uuid) -> bool {
    if active == over {
        return false;
    }

    let from = rows.iter().position(|r| id_of(r) == active);
    let to = rows.iter().position(|r| id_of(r) == over);

    match (from, to) {
        (Some(from), Some(to)) if from != to => {
            array_move(rows, from, to);
            true
        }
        _ => false,
    }
}
