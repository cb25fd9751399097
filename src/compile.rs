//! Module compilation: fan the IR out to every source target, capture
//! reflection from the canonical GLSL pass, then infer the pipeline stage
//! by compiling that GLSL back.
//!
//! Nothing in here fails the load. Targets that cannot be generated stay
//! absent, a failed stage inference leaves the module marked invalid, and
//! every problem is reported back to the caller as a [`CompileIssue`].

use thiserror::Error;
use tracing::{debug, warn};

use crate::module::{ShaderModule, Stage, Target};
use crate::toolchain::{Toolchain, ToolchainError};

/// Stage probes run in this order and the first success wins, so GLSL that
/// is valid in several stage flavors always resolves to the earliest entry.
pub const PROBE_ORDER: [Stage; 6] = [
    Stage::Vertex,
    Stage::Fragment,
    Stage::Compute,
    Stage::Geometry,
    Stage::TessControl,
    Stage::TessEvaluation,
];

/// Non-fatal problems collected while compiling one module.
#[derive(Clone, Debug, Error)]
pub enum CompileIssue {
    #[error("{target} generation failed: {diagnostic}")]
    Decompile { target: Target, diagnostic: String },
    #[error("stage inference failed: {diagnostic}")]
    StageInference { diagnostic: String },
}

/// Run the full compile pipeline over `module` in place.
///
/// Pass order is GLSL, HLSL, MSL, then stage inference; reflection and
/// common options come from the GLSL pass alone. Inference needs the
/// generated GLSL, so a failed GLSL pass leaves the stage untouched.
pub fn compile_module(module: &mut ShaderModule, toolchain: &dyn Toolchain) -> Vec<CompileIssue> {
    let mut issues = Vec::new();

    // Baseline assembly text for binary-born modules. A successful stage
    // probe replaces it below; textual modules already carry their file.
    if module.assembly_text.is_empty() && !module.words.is_empty() {
        match toolchain.disassemble(&module.words) {
            Ok(text) => module.assembly_text = text,
            Err(e) => warn!("disassembly unavailable: {e}"),
        }
    }

    match toolchain.decompile_glsl(&module.words) {
        Ok(artifact) => {
            module.resources = Some(artifact.resources);
            module.options = Some(artifact.options);
            module.set_source(Target::Glsl, with_trailing_newline(artifact.source));
        }
        Err(e) => record_failure(Target::Glsl, &e, &mut issues),
    }
    match toolchain.decompile_hlsl(&module.words) {
        Ok(source) => module.set_source(Target::Hlsl, with_trailing_newline(source)),
        Err(e) => record_failure(Target::Hlsl, &e, &mut issues),
    }
    match toolchain.decompile_msl(&module.words) {
        Ok(source) => module.set_source(Target::Msl, with_trailing_newline(source)),
        Err(e) => record_failure(Target::Msl, &e, &mut issues),
    }

    if let Some(glsl) = module.source(Target::Glsl).map(str::to_owned) {
        match infer_stage(&glsl, toolchain) {
            Ok((stage, assembly)) => {
                debug!(stage = %stage, "stage inferred");
                module.stage = stage;
                module.assembly_text = assembly;
            }
            Err(diagnostic) => {
                module.stage = Stage::Invalid;
                module.assembly_text = diagnostic.clone();
                warn!("no candidate stage accepted the generated GLSL");
                issues.push(CompileIssue::StageInference { diagnostic });
            }
        }
    }

    issues
}

/// Probe `glsl` against every candidate stage in [`PROBE_ORDER`]. Returns
/// the winning stage together with the textual SPIR-V of its compile, or
/// the last probe's diagnostic when every stage rejects the source.
pub fn infer_stage(glsl: &str, toolchain: &dyn Toolchain) -> Result<(Stage, String), String> {
    let mut last_diagnostic = String::new();
    for stage in PROBE_ORDER {
        match toolchain.assemble_glsl(glsl, stage) {
            Ok(assembly) => return Ok((stage, assembly)),
            Err(e) => last_diagnostic = e.to_string(),
        }
    }
    Err(last_diagnostic)
}

fn record_failure(target: Target, error: &ToolchainError, issues: &mut Vec<CompileIssue>) {
    warn!("{target} decompilation failed: {error}");
    issues.push(CompileIssue::Decompile {
        target,
        diagnostic: error.to_string(),
    });
}

fn with_trailing_newline(mut source: String) -> String {
    if !source.is_empty() && !source.ends_with('\n') {
        source.push('\n');
    }
    source
}
