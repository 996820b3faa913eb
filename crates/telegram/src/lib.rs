//! Telegram integration - long-polling bot interface
//!
//! This crate provides the chat interface for presence:
//! - **Wire types** (`api`) - Bot API payloads (updates, messages, keyboards)
//! - **Client** (`client`) - `getUpdates`/`sendMessage` over HTTPS
//! - **Replies** (`replies`) - menu keyboards and canned reply texts
//! - **Commands** (`commands`) - text-to-command decoding and the router
//! - **Poller** (`poller`) - long-poll loop with bounded reconnects
//!
//! # Architecture
//!
//! ```text
//! getUpdates → LongPollRunner → decode → CommandRouter → AttendanceService
//!                                   ↓
//!                           Reply + keyboard → sendMessage
//! ```

pub mod api;
pub mod client;
pub mod commands;
pub mod poller;
pub mod replies;
