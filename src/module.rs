//! Data model for one decompiled shader unit.
//!
//! A [`ShaderModule`] is created once per load: the ingestion layer fills
//! `words` (and `assembly_text` for textual input), the compile layer fills
//! the per-target sources, reflection and stage. Nothing mutates a module
//! after stage inference; display strings are recomputed in `report`.

use serde::Serialize;

/// A generated source dialect. Absent entries in a module mean that target
/// failed or was not attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Glsl,
    Hlsl,
    Msl,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Glsl, Target::Hlsl, Target::Msl];

    /// The selector captions the viewer shows for each target.
    pub fn label(self) -> &'static str {
        match self {
            Self::Glsl => "GLSL source code",
            Self::Hlsl => "HLSL source code",
            Self::Msl => "MSL source code",
        }
    }
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "glsl" => Ok(Self::Glsl),
            "hlsl" => Ok(Self::Hlsl),
            "msl" => Ok(Self::Msl),
            other => Err(format!("unknown target: {other} (expected glsl, hlsl or msl)")),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Glsl => "GLSL",
            Self::Hlsl => "HLSL",
            Self::Msl => "MSL",
        };
        f.write_str(name)
    }
}

/// Pipeline role of a shader.
///
/// `Invalid` means stage inference ran and no candidate stage accepted the
/// generated GLSL; `Unknown` means inference was never attempted (a module
/// ingested from textual assembly that has not been through a successful
/// GLSL pass yet).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
    Kernel,
    Unknown,
    #[default]
    Invalid,
}

impl Stage {
    /// The stage-button captions from the module type column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::TessControl => "tess control",
            Self::TessEvaluation => "tess evaluation",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
            Self::Kernel => "kernel",
            Self::Unknown => "unknown",
            Self::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// GLSL default precision for a scalar class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    High,
    Medium,
    Low,
    #[default]
    Unspecified,
}

impl Precision {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unspecified => "N/A",
        }
    }
}

/// Common options captured from the GLSL decompilation pass. These describe
/// the dialect the canonical GLSL source was generated for and are the
/// module's only source of precision information.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlslCommonOptions {
    pub version: u32,
    pub es: bool,
    pub float_precision: Precision,
    pub int_precision: Precision,
}

impl Default for GlslCommonOptions {
    fn default() -> Self {
        // The cross-compiler's observable defaults for desktop Vulkan GLSL.
        Self {
            version: 450,
            es: false,
            float_precision: Precision::Medium,
            int_precision: Precision::High,
        }
    }
}

/// One reflected resource: numeric id, debug name (may be empty when the
/// module carries no name information) and the id of its type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: u32,
    pub name: String,
    pub type_id: u32,
}

impl Resource {
    pub fn new(id: u32, name: impl Into<String>, type_id: u32) -> Self {
        Self {
            id,
            name: name.into(),
            type_id,
        }
    }
}

/// Resource listing captured in one reflection pass over the module.
/// Buckets are ordered the way the viewer displays them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderResources {
    pub atomic_counters: Vec<Resource>,
    pub push_constant_buffers: Vec<Resource>,
    pub sampled_images: Vec<Resource>,
    pub stage_inputs: Vec<Resource>,
    pub stage_outputs: Vec<Resource>,
    pub storage_buffers: Vec<Resource>,
    pub storage_images: Vec<Resource>,
    pub subpass_inputs: Vec<Resource>,
    pub uniform_buffers: Vec<Resource>,
}

/// One decompiled shader unit.
#[derive(Clone, Debug, Default)]
pub struct ShaderModule {
    /// Canonical intermediate representation: little-endian 32-bit words.
    /// Empty only while a textual module is waiting for assembly.
    pub words: Vec<u32>,
    pub glsl_source: Option<String>,
    pub hlsl_source: Option<String>,
    pub msl_source: Option<String>,
    /// Textual SPIR-V: the raw file content for textual ingestion, then the
    /// reassembled disassembly once a stage probe succeeds. Holds the last
    /// probe's diagnostic when every candidate stage was rejected.
    pub assembly_text: String,
    /// Captured together with `options` from the GLSL pass, or both absent.
    pub resources: Option<ShaderResources>,
    pub options: Option<GlslCommonOptions>,
    pub stage: Stage,
}

impl ShaderModule {
    /// A module freshly ingested from a binary IR file.
    pub fn from_words(words: Vec<u32>) -> Self {
        Self {
            words,
            ..Self::default()
        }
    }

    /// A module freshly ingested from textual assembly; `words` stays empty
    /// until the assembler has run.
    pub fn from_assembly_text(text: impl Into<String>) -> Self {
        Self {
            assembly_text: text.into(),
            stage: Stage::Unknown,
            ..Self::default()
        }
    }

    pub fn source(&self, target: Target) -> Option<&str> {
        match target {
            Target::Glsl => self.glsl_source.as_deref(),
            Target::Hlsl => self.hlsl_source.as_deref(),
            Target::Msl => self.msl_source.as_deref(),
        }
    }

    pub fn set_source(&mut self, target: Target, source: String) {
        let slot = match target {
            Target::Glsl => &mut self.glsl_source,
            Target::Hlsl => &mut self.hlsl_source,
            Target::Msl => &mut self.msl_source,
        };
        *slot = Some(source);
    }
}
