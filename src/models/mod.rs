// Request/response payloads and the application error type

pub mod errors;
pub mod report;
pub mod responses;
