// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod baseline;
mod export;
mod fixtures;
