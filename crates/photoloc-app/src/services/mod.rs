// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: wires the platform bridge into the resolver, exporter and
// launcher, and exposes the calls the embedded page makes.

pub mod app_services;
pub mod data_dir;
