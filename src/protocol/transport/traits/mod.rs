//! Abstraction traits used by the supervisor (CAN bus endpoints and the
//! pacing clock source).
pub mod can_bus;
pub mod tap_clock;
