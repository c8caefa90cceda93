pub mod auth;
pub mod favorites;
pub mod movies;
pub mod reviews;
pub mod users;
pub mod watchlist;
