//! Core reservation logic for the slot checker.
//!
//! This crate contains the fundamental types and logic for:
//! - Collision: buffer-aware overlap checks between reservations
//! - Series: expanding a recurring pattern into individual reservations
//! - Constraints: unit duration limits and start-interval alignment
//! - Mapping: turning raw API reservation records into typed intervals

mod collision;
pub mod constraint;
pub mod range;
mod reservation;
pub mod reservation_type;
pub mod series;
mod types;

pub use collision::{collides_with_any, does_interval_collide, find_collisions};
pub use constraint::{
    ConstraintViolation, IntervalConstraint, day_start_times, get_min_reservation,
    get_valid_ending_time,
};
pub use range::{BufferedInterval, Buffers, TimeRange};
pub use reservation::{
    AffectingReservations, ReservationInterval, ReservationRecord, ReservationUnitConfig,
    candidate_interval, combine_affecting_reservations, reservation_to_interval,
    reservations_to_intervals,
};
pub use reservation_type::{ReservationType, UnknownReservationType};
pub use series::{
    Cadence, Occurrence, RecurrencePattern, active_occurrences, generate_reservations,
    mark_overlapping,
};
pub use types::{ReservationStartInterval, ValidationError};
