//! Catalog domain module (artists and the albums they own).
//!
//! Entities, write payloads with their field whitelists, and the canonical
//! response serializers. Pure domain logic: no IO, no HTTP, no storage.

pub mod album;
pub mod artist;
pub mod resource;
mod validate;

pub use album::{Album, AlbumChanges, AlbumWithArtist, NewAlbum};
pub use artist::{Age, Artist, ArtistChanges, NewArtist};
pub use resource::{AlbumResource, ArtistResource};

/// Fixed page size of the artist listing.
pub const ARTISTS_PER_PAGE: u64 = 1;
