// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Lumen.
//!
//! This crate provides a pre-configured `reqwest` client builder with a
//! consistent User-Agent header, so every SDK request identifies itself the
//! same way.

mod client;

pub use client::{builder, builder_with_user_agent, user_agent};
