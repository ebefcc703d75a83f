//! # Spotify Integration Module
//!
//! A small client for the parts of the Spotify Web API this tool needs.
//!
//! - [`auth`] - OAuth 2.0 authorization code flow, code exchange and refresh
//! - [`client`] - [`SpotifyClient`]: bearer requests with retry handling and
//!   pagination
//! - [`playlists`] - listing, creating and unfollowing playlists, adding items
//! - [`tracks`] - playlist items and audio features
//!
//! ## Retry Policy
//!
//! - `502 Bad Gateway` is retried after 10 seconds
//! - `429 Too Many Requests` waits out `Retry-After` up to 120 seconds
//! - every request gives up after 5 attempts
//!
//! ## API Coverage
//!
//! - `GET /me`
//! - `GET /me/playlists`
//! - `POST /users/{user_id}/playlists`
//! - `DELETE /playlists/{playlist_id}/followers`
//! - `GET /playlists/{playlist_id}/tracks`
//! - `POST /playlists/{playlist_id}/tracks`
//! - `GET /audio-features`
//! - `POST /api/token`

pub mod auth;
pub mod client;
pub mod playlists;
pub mod tracks;

pub use client::SpotifyClient;
