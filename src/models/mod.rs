// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod token;
pub mod user;
pub mod workout;

pub use token::{Token, TokenScope};
pub use user::{Identity, User, UserId};
pub use workout::{Workout, WorkoutEntry, WorkoutId};
