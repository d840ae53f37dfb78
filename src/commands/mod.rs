// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod debts;
pub mod doctor;
pub mod emis;
pub mod expenses;
pub mod exporter;
pub mod items;
pub mod remote;
pub mod reports;
