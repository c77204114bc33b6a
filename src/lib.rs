#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Computational core for blending-function curves and tensor-product surfaces.
//!
//! Everything lives in [`geom`]: dense matrices, an LU solver, the cyclic and
//! cubic B-spline blending families, curves and surfaces built on them,
//! separable surface interpolation and uniform-grid tessellation into a
//! [`geom::TriangulatedMesh`].
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod geom;
