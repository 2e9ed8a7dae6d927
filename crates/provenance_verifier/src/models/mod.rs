// SPDX-License-Identifier: Apache-2.0

pub mod dsse;
pub mod slsa;
pub mod statement;
