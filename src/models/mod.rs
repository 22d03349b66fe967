pub mod item;
pub mod lookup;
pub mod request;
pub mod status;
pub mod user;

pub use item::{Item, ItemStatus, NewItem, PhotoUpload};
pub use lookup::{Category, Location};
pub use request::{
    Destination, MovementRequest, NewMovementRequest, ReceiverParty, Transport, TransportMode,
};
pub use status::{LoadingDetails, Outcome, Stage, StageRecord, StatusListing, StatusRecord};
pub use user::UserProfile;
