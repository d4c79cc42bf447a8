// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod add;
pub mod list;
pub mod paste;
pub mod query;
pub mod rm;
