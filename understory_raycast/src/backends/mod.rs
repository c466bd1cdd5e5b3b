// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple, the default).
//! - `grid`: uniform grid with an origin offset; cheap probes when spaces are
//!   roughly cell-sized.
//!
//! Raycasts issue one tiny rectangle query per unit step, so the grid backend
//! usually wins once a scene holds more than a few dozen spaces.

pub mod flatvec;
pub mod grid;

pub use flatvec::FlatVec;
pub use grid::Grid;
