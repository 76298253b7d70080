//! Station resolver server.
//!
//! Turns the CTS stop feed into a catalog of named stations, resolves
//! free-text queries against it and serves live departures for the
//! place a user picked.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod cts;
pub mod domain;
pub mod geocode;
pub mod schedule;
pub mod search;
pub mod web;
