//! ZeroTier Central API integration
//!
//! This module provides the REST client for the ZeroTier Central control
//! plane and the member-record model it reads and writes.

mod client;
mod member;

pub use client::CentralClient;
pub use member::Member;
