pub mod delivery_choice;

pub use crate::domain::model::{format_shipping_date, Credentials, Parameters, Record, RemoteOutcome};
pub use crate::domain::pickup_point::{Address, Coordinates, Holiday, OpeningHours, PickupPoint};
pub use crate::domain::ports::Transport;
pub use crate::utils::error::Result;
