//! # permeon Core Library
//!
//! A library for annotating ion-permeation pathways in molecular dynamics
//! trajectories of transmembrane channel proteins. For every trajectory frame
//! it locates the pathway through the protein pore with a probe-based
//! maximum-inscribed-sphere search, models the pathway as a pair of splines,
//! maps residues and solvent particles onto curvilinear pathway coordinates,
//! and estimates solvent density and hydrophobicity profiles along the pore.
//! A second streaming pass aggregates the per-frame records into
//! time-averaged profiles and time series.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (particles, selections, topology), the spline geometry kit, the generic
//!   two-stage optimizer, streaming statistics and density estimators, and
//!   the van-der-Waals radius / hydrophobicity databases.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates the
//!   per-frame analysis: path finding, the molecular path model with its
//!   curvilinear mapping, the frame pipeline, and the two-pass aggregator.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties `engine`, `core`, and [`io`] together to run a complete
//!   trajectory analysis from frame source to result documents.
//!
//! The [`io`] layer implements the documented external contracts: the
//! per-frame JSON Lines stream, the final results document, and the OBJ/PDB
//! auxiliary outputs.

pub mod core;
pub mod engine;
pub mod io;
pub mod workflows;
