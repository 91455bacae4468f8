mod clock;
mod ids;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::new_transfer_id;
