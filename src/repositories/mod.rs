pub mod course_repository;
pub mod event_repository;
pub mod friendship_repository;
pub mod player_repository;
pub mod post_repository;

// Re-export all repositories for convenient access
pub use course_repository::CourseRepository;
pub use event_repository::EventRepository;
pub use friendship_repository::FriendshipRepository;
pub use player_repository::PlayerRepository;
pub use post_repository::PostRepository;
