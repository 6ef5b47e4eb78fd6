//! Collision checks between a candidate reservation and existing ones.
//!
//! Both sides are widened by their own buffers before the half-open overlap
//! test, so a candidate's trailing buffer can hit an existing reservation and an
//! existing reservation's buffers can hit the candidate. Touching padded
//! endpoints are not a collision.
//!
//! Blocked reservations are exact: against one, neither side is padded.

use crate::range::BufferedInterval;
use crate::reservation::ReservationInterval;

/// Returns true if the padded candidate overlaps the padded existing interval.
///
/// A bare `TimeRange` can be passed via `BufferedInterval::from(range)`.
pub fn does_interval_collide(candidate: &BufferedInterval, existing: &BufferedInterval) -> bool {
    candidate.padded().overlaps(&existing.padded())
}

/// All existing reservations the candidate collides with, in input order.
///
/// `ignore_pk` skips the reservation being moved, which is usually part of the
/// fetched list itself.
pub fn find_collisions<'a>(
    candidate: &BufferedInterval,
    existing: &'a [ReservationInterval],
    ignore_pk: Option<i64>,
) -> Vec<&'a ReservationInterval> {
    existing
        .iter()
        .filter(|r| !is_ignored(r, ignore_pk))
        .filter(|r| collides_with(candidate, r))
        .collect()
}

/// Short-circuiting form of [`find_collisions`].
pub fn collides_with_any(
    candidate: &BufferedInterval,
    existing: &[ReservationInterval],
    ignore_pk: Option<i64>,
) -> bool {
    existing
        .iter()
        .any(|r| !is_ignored(r, ignore_pk) && collides_with(candidate, r))
}

fn collides_with(candidate: &BufferedInterval, existing: &ReservationInterval) -> bool {
    if existing.reservation_type.is_blocked() {
        does_interval_collide(
            &candidate.without_buffers(),
            &existing.interval.without_buffers(),
        )
    } else {
        does_interval_collide(candidate, &existing.interval)
    }
}

fn is_ignored(reservation: &ReservationInterval, ignore_pk: Option<i64>) -> bool {
    ignore_pk.is_some() && reservation.pk == ignore_pk
}
