// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message pipeline for the Socio webhook service.
//!
//! The [`Dispatcher`] takes one inbound message at a time and hands it to
//! the first handler that claims it:
//! - account-number questions get the help image
//! - invoice requests are looked up, delivered, confirmed and counted
//! - everything else goes to the chatbot fallback
//!
//! Non-text messages get a short "text only" reply. Messages from the same
//! sender are processed one at a time.

pub mod context;
pub mod copy;
pub mod dispatcher;
pub mod handlers;
pub mod locks;
pub mod prompt;
pub mod shutdown;

pub use context::{Collaborators, PipelineContext, TEXT_RETRY_DELAY, TextMessage};
pub use copy::Replies;
pub use dispatcher::Dispatcher;
pub use handlers::{HandlerOutcome, MessageHandler};
pub use locks::SenderLocks;
pub use prompt::load_system_prompt;
