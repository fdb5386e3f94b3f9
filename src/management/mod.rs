mod assembler;
mod coordinator;
mod resolver;
mod store;

pub use assembler::PlaylistAssembler;
pub use assembler::collect_tracks;
pub use assembler::{PLAYLIST_COLLABORATIVE, PLAYLIST_PUBLIC};
pub use coordinator::AuthState;
pub use coordinator::AuthorizationCoordinator;
pub use coordinator::AuthorizationPrompt;
pub use coordinator::PendingAuth;
pub use resolver::TrackResolver;
pub use resolver::select_track;
pub use store::TokenStore;
