pub mod attachments;
pub mod classification;
pub mod config;
pub mod email_data;
pub mod error;
pub mod fields;
pub mod registry;
pub mod responses;
pub mod submission;
pub mod validation;
