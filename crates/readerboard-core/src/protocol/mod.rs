//! Command protocol: wire primitives, the incremental command parser,
//! and the USB / RS-485 transport receivers.

pub mod bus;
pub mod command;
pub mod wire;
