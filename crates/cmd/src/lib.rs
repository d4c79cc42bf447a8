// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod commands;
pub mod common;

pub use commands::add::add_command;
pub use commands::list::list_command;
pub use commands::paste::paste_command;
pub use commands::query::{OutputFormat, QueryArgs, query_command};
pub use commands::rm::rm_command;
pub use common::{LensContext, Session};
