#![doc = "dreisam-pegel-core: core logic library for dreisam-pegel."]

//! This crate contains the gauge pipeline and everything derived from it:
//! fetching the feed, keeping the history ledger, computing the trend,
//! composing the status text, rendering the chart and the schedule gate.
//! The Mastodon client itself lives in the CLI crate and plugs in through
//! [`contract::Poster`].
//!
//! # Usage
//! Add this as a dependency wherever a [`contract::Snapshot`] is needed.

pub mod chart;
pub mod config;
pub mod contract;
pub mod download;
pub mod error;
pub mod history;
pub mod message;
pub mod parse;
pub mod pipeline;
pub mod publish;
pub mod schedule;
