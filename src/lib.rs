//! Controlled vocabulary server with content negotiation by profile, media type and language.
#![allow(rustdoc::bare_urls)]
pub mod about;
pub mod cache;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod negotiate;
pub mod ns;
pub mod profile;
pub mod rdf;
pub mod render;
pub mod resource;
pub mod server;
pub mod source;
