//! File ingestion: decide what kind of SPIR-V a path holds and build the
//! initial module for it.
//!
//! Two formats are recognized. A `.spv` extension (case sensitive, matching
//! how pipeline bakers name their output) means binary IR: little-endian
//! 32-bit words, rejected outright when the byte length is not word
//! aligned. Anything else is sniffed as textual assembly by its first
//! line, which must be byte-for-byte `"; SPIR-V\n"`, the banner every
//! standard disassembler emits. Textual input is assembled to words here
//! so the rest of the pipeline only ever sees IR.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::module::ShaderModule;
use crate::toolchain::Toolchain;

/// First line of textual SPIR-V, trailing newline included.
pub const ASSEMBLY_HEADER: &str = "; SPIR-V\n";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no file path given")]
    EmptyPath,
    #[error("{path}: not a SPIR-V binary or textual assembly file")]
    UnrecognizedFormat { path: PathBuf },
    #[error("binary length {len} is not a multiple of 4 bytes")]
    TruncatedBinary { len: usize },
    #[error("assembly rejected: {0}")]
    Assembly(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Classify `path` and build a module from its content.
///
/// Binary ingestion only decodes words; textual ingestion keeps the whole
/// file (header line included) as the module's assembly text and runs it
/// through the assembler. Any error here leaves the caller's state alone.
pub fn classify(path: &Path, toolchain: &dyn Toolchain) -> Result<ShaderModule, IngestError> {
    if path.as_os_str().is_empty() {
        return Err(IngestError::EmptyPath);
    }

    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext == "spv") {
        let words = decode_words(&bytes)?;
        debug!(path = %path.display(), words = words.len(), "ingested binary SPIR-V");
        return Ok(ShaderModule::from_words(words));
    }

    match std::str::from_utf8(&bytes) {
        Ok(text) if text.starts_with(ASSEMBLY_HEADER) => {
            let words = toolchain
                .assemble_text(text)
                .map_err(|e| IngestError::Assembly(e.to_string()))?;
            debug!(path = %path.display(), words = words.len(), "assembled textual SPIR-V");
            let mut module = ShaderModule::from_assembly_text(text);
            module.words = words;
            Ok(module)
        }
        _ => Err(IngestError::UnrecognizedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Little-endian byte stream to IR words. A length that is not word aligned
/// is a truncated write, not something to round away.
fn decode_words(bytes: &[u8]) -> Result<Vec<u32>, IngestError> {
    if bytes.len() % 4 != 0 {
        return Err(IngestError::TruncatedBinary { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Stage;
    use crate::toolchain::{GlslArtifact, ToolchainError};

    /// Assembler stub for exercising the textual path without shaderc.
    struct StubAssembler {
        result: Result<Vec<u32>, &'static str>,
    }

    impl StubAssembler {
        fn ok(words: Vec<u32>) -> Self {
            Self { result: Ok(words) }
        }

        fn rejecting(diagnostic: &'static str) -> Self {
            Self {
                result: Err(diagnostic),
            }
        }
    }

    impl Toolchain for StubAssembler {
        fn decompile_glsl(&self, _: &[u32]) -> Result<GlslArtifact, ToolchainError> {
            unreachable!("ingestion never decompiles")
        }

        fn decompile_hlsl(&self, _: &[u32]) -> Result<String, ToolchainError> {
            unreachable!("ingestion never decompiles")
        }

        fn decompile_msl(&self, _: &[u32]) -> Result<String, ToolchainError> {
            unreachable!("ingestion never decompiles")
        }

        fn assemble_text(&self, _: &str) -> Result<Vec<u32>, ToolchainError> {
            self.result
                .clone()
                .map_err(|e| ToolchainError::Assemble(e.to_string()))
        }

        fn assemble_glsl(&self, _: &str, _: Stage) -> Result<String, ToolchainError> {
            unreachable!("ingestion never probes")
        }

        fn disassemble(&self, _: &[u32]) -> Result<String, ToolchainError> {
            unreachable!("ingestion never disassembles")
        }
    }

    fn scratch_file(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join("spirv_viewer_ingest_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}_{name}", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn empty_path_is_rejected_before_touching_the_filesystem() {
        let err = classify(Path::new(""), &StubAssembler::ok(vec![])).unwrap_err();
        assert!(matches!(err, IngestError::EmptyPath));
    }

    #[test]
    fn spv_extension_decodes_little_endian_words() {
        let path = scratch_file(
            "two_words.spv",
            &[0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00],
        );
        let module = classify(&path, &StubAssembler::ok(vec![])).unwrap();
        assert_eq!(module.words, vec![0x0723_0203, 0x0001_0000]);
        assert_eq!(module.stage, Stage::Invalid);
        assert!(module.assembly_text.is_empty());
    }

    #[test]
    fn misaligned_spv_length_is_a_truncated_binary() {
        let path = scratch_file("truncated.spv", &[0x03, 0x02, 0x23, 0x07, 0x99]);
        let err = classify(&path, &StubAssembler::ok(vec![])).unwrap_err();
        assert!(matches!(err, IngestError::TruncatedBinary { len: 5 }));
    }

    #[test]
    fn zero_length_spv_ingests_as_an_empty_module() {
        let path = scratch_file("empty.spv", &[]);
        let module = classify(&path, &StubAssembler::ok(vec![])).unwrap();
        assert!(module.words.is_empty());
    }

    #[test]
    fn uppercase_spv_extension_is_not_binary() {
        // Extension matching is case sensitive; this content has no
        // assembly header either, so the file is simply unrecognized.
        let path = scratch_file("shouty.SPV", &[0x03, 0x02, 0x23, 0x07]);
        let err = classify(&path, &StubAssembler::ok(vec![])).unwrap_err();
        assert!(matches!(err, IngestError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn header_file_assembles_and_keeps_the_full_text() {
        let text = "; SPIR-V\n; Version: 1.0\nOpCapability Shader\n";
        let path = scratch_file("module.spvasm", text.as_bytes());
        let module = classify(&path, &StubAssembler::ok(vec![0x0723_0203, 7])).unwrap();
        assert_eq!(module.words, vec![0x0723_0203, 7]);
        assert_eq!(module.assembly_text, text);
        assert_eq!(module.stage, Stage::Unknown);
    }

    #[test]
    fn assembler_rejection_aborts_textual_ingestion() {
        let path = scratch_file("broken.spvasm", b"; SPIR-V\nOpNothingOfTheSort\n");
        let err = classify(&path, &StubAssembler::rejecting("unknown opcode")).unwrap_err();
        match err {
            IngestError::Assembly(diagnostic) => assert!(diagnostic.contains("unknown opcode")),
            other => panic!("expected an assembly error, got {other:?}"),
        }
    }

    #[test]
    fn header_comparison_is_byte_exact() {
        for (name, content) in [
            ("no_space.txt", ";SPIR-V\nOpCapability Shader\n"),
            ("trailing_space.txt", "; SPIR-V \nOpCapability Shader\n"),
            ("lowercase.txt", "; spir-v\nOpCapability Shader\n"),
            ("no_newline.txt", "; SPIR-V"),
        ] {
            let path = scratch_file(name, content.as_bytes());
            let err = classify(&path, &StubAssembler::ok(vec![])).unwrap_err();
            assert!(
                matches!(err, IngestError::UnrecognizedFormat { .. }),
                "{name} should be unrecognized"
            );
        }
    }

    #[test]
    fn non_utf8_content_without_spv_extension_is_unrecognized() {
        let path = scratch_file("opaque.bin", &[0xFF, 0xFE, 0x03, 0x02, 0x23, 0x07]);
        let err = classify(&path, &StubAssembler::ok(vec![])).unwrap_err();
        assert!(matches!(err, IngestError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn missing_file_surfaces_the_read_error() {
        let path = std::env::temp_dir().join("spirv_viewer_ingest_tests/nope_does_not_exist.spv");
        let err = classify(&path, &StubAssembler::ok(vec![])).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
