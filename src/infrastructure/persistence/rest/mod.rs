//! Hosted relational store over its REST interface

mod client;
mod filter;

pub use client::RestStore;
