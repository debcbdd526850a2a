// Request handlers, split by security tier:
// public (no auth) and protected (bearer auth via middleware).

pub mod protected;
pub mod public;

pub use protected::*;
pub use public::*;
