//! Data models for Librest

pub mod author;
pub mod book;
pub mod genre;
pub mod rating;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookRow};
pub use genre::Genre;
pub use rating::Rating;
pub use review::Review;
pub use user::{User, UserClaims};
