pub mod event_service;
pub mod feed_service;
pub mod friendship_service;
pub mod invite_service;
pub mod player_service;

pub use event_service::EventService;
pub use feed_service::FeedService;
pub use friendship_service::FriendshipService;
pub use invite_service::InviteService;
pub use player_service::PlayerService;
