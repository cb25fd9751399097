//! Render viewer state for the terminal.
//!
//! The plain summary mirrors the reflection panel: module stage, GLSL
//! dialect options, the nine resource buckets in display order, then the
//! assembly text. The JSON form carries the same data for scripting.

use std::fmt::Write;

use serde::Serialize;

use crate::app::ViewerApp;
use crate::module::{GlslCommonOptions, Resource, ShaderModule, ShaderResources, Stage, Target};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppReport<'a> {
    pub file_name: &'a str,
    pub save_file_name: String,
    pub current_module: usize,
    pub current_target: Target,
    pub modules: Vec<ModuleReport<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport<'a> {
    pub stage: Stage,
    pub words: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glsl: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hlsl: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msl: Option<&'a str>,
    pub assembly_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<&'a ShaderResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a GlslCommonOptions>,
}

pub fn app_report(app: &ViewerApp) -> AppReport<'_> {
    AppReport {
        file_name: &app.file_name,
        save_file_name: app.save_file_name(),
        current_module: app.current_module,
        current_target: app.current_target,
        modules: app.modules.iter().map(module_report).collect(),
    }
}

fn module_report(module: &ShaderModule) -> ModuleReport<'_> {
    ModuleReport {
        stage: module.stage,
        words: module.words.len(),
        glsl: module.glsl_source.as_deref(),
        hlsl: module.hlsl_source.as_deref(),
        msl: module.msl_source.as_deref(),
        assembly_text: &module.assembly_text,
        resources: module.resources.as_ref(),
        options: module.options.as_ref(),
    }
}

pub fn json(app: &ViewerApp) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&app_report(app))
}

pub fn summary(app: &ViewerApp) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File: {}", app.file_name);
    let _ = writeln!(out, "Save target: {}", app.save_file_name());
    let _ = writeln!(out, "Modules: {}", app.modules.len());

    if app.modules.is_empty() {
        let _ = writeln!(out, "(no modules loaded)");
        return out;
    }

    for (index, module) in app.modules.iter().enumerate() {
        let marker = if index == app.current_module {
            " (selected)"
        } else {
            ""
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "Module {}{marker}", index + 1);
        write_module(&mut out, module);
    }
    out
}

fn write_module(out: &mut String, module: &ShaderModule) {
    let _ = writeln!(out, "Shader module type: {}", module.stage);
    let _ = writeln!(out, "Words: {}", module.words.len());
    for target in Target::ALL {
        match module.source(target) {
            Some(source) => {
                let _ = writeln!(out, "{}: {} bytes", target.label(), source.len());
            }
            None => {
                let _ = writeln!(out, "{}: missing", target.label());
            }
        }
    }

    match module.options {
        Some(options) => {
            let _ = writeln!(out, "GLSL Version: {}", options.version);
            let _ = writeln!(out, "Uses OpenGL ES: {}", options.es);
            let _ = writeln!(
                out,
                "Floating point precision: {}",
                options.float_precision.label()
            );
            let _ = writeln!(out, "Integer precision: {}", options.int_precision.label());
        }
        None => {
            let _ = writeln!(out, "GLSL options: not captured");
        }
    }

    if let Some(resources) = &module.resources {
        write_bucket(out, "Atomic counters", &resources.atomic_counters);
        write_bucket(out, "Push constant buffers", &resources.push_constant_buffers);
        write_bucket(out, "Sampled images", &resources.sampled_images);
        write_bucket(out, "Stage inputs", &resources.stage_inputs);
        write_bucket(out, "Stage outputs", &resources.stage_outputs);
        write_bucket(out, "Storage buffers", &resources.storage_buffers);
        write_bucket(out, "Storage images", &resources.storage_images);
        write_bucket(out, "Subpass inputs", &resources.subpass_inputs);
        write_bucket(out, "Uniform buffers", &resources.uniform_buffers);
    } else {
        let _ = writeln!(out, "Reflection: not captured");
    }

    let _ = writeln!(out, "Assembly:");
    if module.assembly_text.is_empty() {
        let _ = writeln!(out, "  (none)");
    } else {
        for line in module.assembly_text.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
}

fn write_bucket(out: &mut String, title: &str, entries: &[Resource]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for (index, resource) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{index}] id {} type {} name {:?}",
            resource.id, resource.type_id, resource.name
        );
    }
}
