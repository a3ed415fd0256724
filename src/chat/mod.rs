pub mod controller;
pub mod model;
pub mod store;
pub mod worker;

pub use controller::{MessageStore, ScrollMetrics, ScrollReadController, ViewPort};
pub use model::{ChatPreview, Conversation, Message, PeerInfo, UserProfile};
pub use store::{ChatStore, StoreCommand, StoreEvent, StoreUpdate};
