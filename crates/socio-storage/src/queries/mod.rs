// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the three persisted tables.

pub mod conversations;
pub mod invoice_requests;
pub mod messages;
