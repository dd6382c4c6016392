// Clients for the external services the handlers delegate to

pub mod documents;
pub mod docx;
pub mod objects;
