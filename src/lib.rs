//! SPIR-V shader module viewer: ingest binary or textual SPIR-V, decompile
//! it to GLSL, HLSL and MSL, reflect its resources and infer its pipeline
//! stage by compiling the generated GLSL back.

pub mod app;
pub mod compile;
pub mod dialog;
pub mod ingest;
pub mod module;
pub mod reflect;
pub mod report;
pub mod toolchain;
