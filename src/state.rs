// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::datasets::Datasets;

#[derive(Clone)]
pub struct AppState {
    pub datasets: Datasets,
}

impl AppState {
    pub fn new(datasets: Datasets) -> Self {
        Self { datasets }
    }
}
