pub mod client;

pub use client::{BackendCall, BackendClient, REQUEST_ID_HEADER};
