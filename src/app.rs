//! Viewer application state.
//!
//! One list of loaded modules, one selected module, one selected source
//! target and the working file name. All mutation funnels through
//! [`ViewerApp::load`]; rendering state out of the struct belongs to
//! `report`.

use std::path::Path;

use crate::compile::{self, CompileIssue};
use crate::ingest::{self, IngestError};
use crate::module::{ShaderModule, Target};
use crate::toolchain::Toolchain;

pub struct ViewerApp {
    pub modules: Vec<ShaderModule>,
    pub current_module: usize,
    pub current_target: Target,
    /// Working name, seeds the save-file name. Starts with the classic
    /// placeholder and tracks the last successfully loaded path.
    pub file_name: String,
}

impl Default for ViewerApp {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            current_module: 0,
            current_target: Target::Glsl,
            file_name: "default.vert.spv".to_string(),
        }
    }
}

impl ViewerApp {
    /// Ingest `path`, compile the resulting module and make it the list.
    ///
    /// The previous list is replaced only once ingestion has succeeded;
    /// any [`IngestError`] leaves the app exactly as it was. Compile
    /// problems never reject the module, they come back as issues.
    pub fn load(
        &mut self,
        path: &Path,
        toolchain: &dyn Toolchain,
    ) -> Result<Vec<CompileIssue>, IngestError> {
        let mut module = ingest::classify(path, toolchain)?;
        let issues = compile::compile_module(&mut module, toolchain);

        self.modules.clear();
        self.modules.push(module);
        self.current_module = 0;
        self.file_name = path.display().to_string();
        Ok(issues)
    }

    pub fn current(&self) -> Option<&ShaderModule> {
        self.modules.get(self.current_module)
    }

    /// Point the selection at `index`. Out-of-range indices are ignored so
    /// the selection always refers to a loaded module (or an empty list).
    pub fn select_module(&mut self, index: usize) {
        if index < self.modules.len() {
            self.current_module = index;
        }
    }

    pub fn select_target(&mut self, target: Target) {
        self.current_target = target;
    }

    /// Name a pipeline save of the current state would be written to, or
    /// empty when no working name is set.
    ///
    /// The result always ends in `.vkpipeline.json`: a name already ending
    /// in `.vkpipeline` gains `.json`, anything else gains the full suffix.
    pub fn save_file_name(&self) -> String {
        let mut name = self.file_name.clone();
        if name.is_empty() {
            return name;
        }
        if name.ends_with(".vkpipeline") {
            name.push_str(".json");
        } else if !name.ends_with(".vkpipeline.json") {
            name.push_str(".vkpipeline.json");
        }
        name
    }
}
