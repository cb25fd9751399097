//! Reflection over a parsed shader module.
//!
//! Fills the viewer's resource buckets from the IR itself rather than from
//! any generated source, so every target shows the same listing. Ids are
//! arena indices (stage IO uses the location instead), which are stable for
//! a given module.

use naga::{AddressSpace, Binding, ImageClass, TypeInner};

use crate::module::{Resource, ShaderResources};

/// Walk `module` and bucket every resource the viewer can display.
///
/// Stage IO is taken from the first entry point, matching the entry point
/// the source generators translate. Samplers are deliberately not listed:
/// the viewer shows sampled images only, the way combined-image samplers
/// surface in classic reflection output.
pub fn reflect_module(module: &naga::Module) -> ShaderResources {
    let mut resources = ShaderResources::default();

    for (handle, var) in module.global_variables.iter() {
        let id = handle.index() as u32;
        let name = var.name.clone().unwrap_or_default();
        let type_id = var.ty.index() as u32;
        let entry = Resource::new(id, name, type_id);

        match var.space {
            AddressSpace::Uniform => resources.uniform_buffers.push(entry),
            AddressSpace::Storage { .. } => resources.storage_buffers.push(entry),
            AddressSpace::PushConstant => resources.push_constant_buffers.push(entry),
            AddressSpace::Handle => match module.types[var.ty].inner {
                TypeInner::Image {
                    class: ImageClass::Storage { .. },
                    ..
                } => resources.storage_images.push(entry),
                TypeInner::Image { .. } => resources.sampled_images.push(entry),
                // Standalone samplers carry no data to display.
                _ => {}
            },
            // Function, Private and WorkGroup variables are not resources.
            _ => {}
        }
    }

    if let Some(entry_point) = module.entry_points.first() {
        for arg in &entry_point.function.arguments {
            collect_io(
                module,
                arg.ty,
                arg.name.as_deref(),
                arg.binding.as_ref(),
                &mut resources.stage_inputs,
            );
        }
        if let Some(result) = &entry_point.function.result {
            collect_io(
                module,
                result.ty,
                None,
                result.binding.as_ref(),
                &mut resources.stage_outputs,
            );
        }
    }

    resources
}

/// Record one entry-point input or output. Bindings either sit directly on
/// the argument/result or, for IR lifted from binary modules, on the members
/// of a wrapping struct. Builtins are not user resources and are skipped.
fn collect_io(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    name: Option<&str>,
    binding: Option<&Binding>,
    bucket: &mut Vec<Resource>,
) {
    match binding {
        Some(&Binding::Location { location, .. }) => {
            bucket.push(Resource::new(
                location,
                name.unwrap_or_default(),
                ty.index() as u32,
            ));
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { ref members, .. } = module.types[ty].inner {
                for member in members {
                    if let Some(&Binding::Location { location, .. }) = member.binding.as_ref() {
                        bucket.push(Resource::new(
                            location,
                            member.name.clone().unwrap_or_default(),
                            member.ty.index() as u32,
                        ));
                    }
                }
            }
        }
    }
}
