// HTTP request handlers

pub mod documents;
pub mod health;
pub(crate) mod multipart;
pub mod reports;
pub mod upload;
