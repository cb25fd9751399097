//! Shader toolchain seam.
//!
//! Everything the viewer needs from the surrounding compiler ecosystem goes
//! through the [`Toolchain`] trait: decompiling IR words into the three
//! source dialects, assembling textual SPIR-V, and compiling GLSL back to
//! textual SPIR-V for stage probing. The production implementation is
//! [`CrossToolchain`] (naga for translation, shaderc for assembly, rspirv
//! for disassembly); tests substitute scripted implementations.

use thiserror::Error;

use crate::module::{GlslCommonOptions, ShaderResources, Stage};
use crate::reflect;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("toolchain initialization failed: {0}")]
    Init(String),
    #[error("SPIR-V parse failed: {0}")]
    Parse(String),
    #[error("module validation failed: {0}")]
    Validate(String),
    #[error("code generation failed: {0}")]
    Codegen(String),
    #[error("module has no entry point")]
    NoEntryPoint,
    #[error("{0}")]
    Assemble(String),
    #[error("stage '{0}' has no GLSL compilation kind")]
    UnsupportedStage(Stage),
}

/// Everything produced by the GLSL pass in one go. GLSL is the canonical
/// pass: reflection and common options are captured here and nowhere else.
#[derive(Clone, Debug)]
pub struct GlslArtifact {
    pub source: String,
    pub resources: ShaderResources,
    pub options: GlslCommonOptions,
}

pub trait Toolchain {
    /// Decompile IR words to GLSL, capturing reflection and the dialect
    /// options of the pass.
    fn decompile_glsl(&self, words: &[u32]) -> Result<GlslArtifact, ToolchainError>;

    fn decompile_hlsl(&self, words: &[u32]) -> Result<String, ToolchainError>;

    fn decompile_msl(&self, words: &[u32]) -> Result<String, ToolchainError>;

    /// Assemble textual SPIR-V into IR words.
    fn assemble_text(&self, text: &str) -> Result<Vec<u32>, ToolchainError>;

    /// Compile GLSL as the given stage and return the textual SPIR-V of the
    /// result. Success doubles as a verdict that `source` is valid for
    /// `stage`, which is what stage probing relies on.
    fn assemble_glsl(&self, source: &str, stage: Stage) -> Result<String, ToolchainError>;

    /// Disassemble IR words into textual SPIR-V.
    fn disassemble(&self, words: &[u32]) -> Result<String, ToolchainError>;
}

/// Production toolchain: naga front/back ends plus a shaderc compiler held
/// for the lifetime of the app.
pub struct CrossToolchain {
    compiler: shaderc::Compiler,
}

impl CrossToolchain {
    pub fn new() -> Result<Self, ToolchainError> {
        let compiler = shaderc::Compiler::new()
            .ok_or_else(|| ToolchainError::Init("failed to acquire a shaderc compiler".into()))?;
        Ok(Self { compiler })
    }

    fn parse_and_validate(
        words: &[u32],
    ) -> Result<(naga::Module, naga::valid::ModuleInfo), ToolchainError> {
        let options = naga::front::spv::Options {
            adjust_coordinate_space: false,
            strict_capabilities: false,
            block_ctx_dump_prefix: None,
        };
        let module = naga::front::spv::Frontend::new(words.iter().cloned(), &options)
            .parse()
            .map_err(|e| ToolchainError::Parse(format!("{e:?}")))?;
        let info = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| ToolchainError::Validate(format!("{e:?}")))?;
        Ok((module, info))
    }

    /// Desktop 450 output with every resource binding mapped through, so the
    /// generated GLSL stays acceptable to a Vulkan-rules recompile.
    fn glsl_options(module: &naga::Module) -> naga::back::glsl::Options {
        let mut binding_map = naga::back::glsl::BindingMap::default();
        for (_, var) in module.global_variables.iter() {
            if let Some(ref binding) = var.binding {
                let slot = (binding.group * 16 + binding.binding).min(u32::from(u8::MAX)) as u8;
                binding_map.insert(binding.clone(), slot);
            }
        }
        naga::back::glsl::Options {
            version: naga::back::glsl::Version::Desktop(450),
            binding_map,
            ..Default::default()
        }
    }

    fn compile_options() -> Result<shaderc::CompileOptions<'static>, ToolchainError> {
        let mut options = shaderc::CompileOptions::new()
            .ok_or_else(|| ToolchainError::Init("failed to acquire compile options".into()))?;
        // Re-bind anything the GLSL writer left unbound; probes care about
        // stage validity, not binding layout.
        options.set_auto_bind_uniforms(true);
        Ok(options)
    }
}

impl Toolchain for CrossToolchain {
    fn decompile_glsl(&self, words: &[u32]) -> Result<GlslArtifact, ToolchainError> {
        let (module, info) = Self::parse_and_validate(words)?;
        let entry_point = module
            .entry_points
            .first()
            .ok_or(ToolchainError::NoEntryPoint)?;
        let pipeline_options = naga::back::glsl::PipelineOptions {
            shader_stage: entry_point.stage,
            entry_point: entry_point.name.clone(),
            multiview: None,
        };
        let options = Self::glsl_options(&module);

        let mut source = String::new();
        let mut writer = naga::back::glsl::Writer::new(
            &mut source,
            &module,
            &info,
            &options,
            &pipeline_options,
            naga::proc::BoundsCheckPolicies::default(),
        )
        .map_err(|e| ToolchainError::Codegen(format!("GLSL: {e:?}")))?;
        writer
            .write()
            .map_err(|e| ToolchainError::Codegen(format!("GLSL: {e:?}")))?;

        let (version, es) = match options.version {
            naga::back::glsl::Version::Desktop(v) => (u32::from(v), false),
            naga::back::glsl::Version::Embedded { version, .. } => (u32::from(version), true),
        };
        Ok(GlslArtifact {
            source,
            resources: reflect::reflect_module(&module),
            options: GlslCommonOptions {
                version,
                es,
                ..GlslCommonOptions::default()
            },
        })
    }

    fn decompile_hlsl(&self, words: &[u32]) -> Result<String, ToolchainError> {
        let (module, info) = Self::parse_and_validate(words)?;
        let options = naga::back::hlsl::Options {
            shader_model: naga::back::hlsl::ShaderModel::V5_0,
            ..Default::default()
        };
        let mut source = String::new();
        let mut writer = naga::back::hlsl::Writer::new(&mut source, &options);
        writer
            .write(&module, &info)
            .map_err(|e| ToolchainError::Codegen(format!("HLSL: {e:?}")))?;
        Ok(source)
    }

    fn decompile_msl(&self, words: &[u32]) -> Result<String, ToolchainError> {
        let (module, info) = Self::parse_and_validate(words)?;
        let (source, _) = naga::back::msl::write_string(
            &module,
            &info,
            &naga::back::msl::Options::default(),
            &naga::back::msl::PipelineOptions::default(),
        )
        .map_err(|e| ToolchainError::Codegen(format!("MSL: {e:?}")))?;
        Ok(source)
    }

    fn assemble_text(&self, text: &str) -> Result<Vec<u32>, ToolchainError> {
        let artifact = self
            .compiler
            .assemble(text, None)
            .map_err(|e| ToolchainError::Assemble(e.to_string()))?;
        Ok(artifact.as_binary().to_vec())
    }

    fn assemble_glsl(&self, source: &str, stage: Stage) -> Result<String, ToolchainError> {
        let kind = shader_kind(stage).ok_or(ToolchainError::UnsupportedStage(stage))?;
        let options = Self::compile_options()?;
        let artifact = self
            .compiler
            .compile_into_spirv_assembly(source, kind, stage.label(), "main", Some(&options))
            .map_err(|e| ToolchainError::Assemble(e.to_string()))?;
        Ok(artifact.as_text())
    }

    fn disassemble(&self, words: &[u32]) -> Result<String, ToolchainError> {
        use rspirv::binary::Disassemble;
        let module =
            rspirv::dr::load_words(words).map_err(|e| ToolchainError::Parse(format!("{e:?}")))?;
        Ok(module.disassemble())
    }
}

/// Pipeline stages that have a GLSL compilation kind. `Kernel`, `Unknown`
/// and `Invalid` have none and can never be probed.
fn shader_kind(stage: Stage) -> Option<shaderc::ShaderKind> {
    match stage {
        Stage::Vertex => Some(shaderc::ShaderKind::Vertex),
        Stage::Fragment => Some(shaderc::ShaderKind::Fragment),
        Stage::Compute => Some(shaderc::ShaderKind::Compute),
        Stage::Geometry => Some(shaderc::ShaderKind::Geometry),
        Stage::TessControl => Some(shaderc::ShaderKind::TessControl),
        Stage::TessEvaluation => Some(shaderc::ShaderKind::TessEvaluation),
        Stage::Kernel | Stage::Unknown | Stage::Invalid => None,
    }
}
