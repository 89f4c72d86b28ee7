//! High-level components of the CAN tap: per-mode frame routing, the ISO-TP
//! transport engine, the wire-level transport model, and the supervisor
//! service that drives everything over asynchronous bus endpoints.
pub mod isotp;
pub mod router;
pub mod tap;
pub mod transport;
