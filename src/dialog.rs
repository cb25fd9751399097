//! Native file dialog used when no path is given on the command line.

use std::path::PathBuf;

/// Ask the user for a shader module file. `None` when the dialog was
/// dismissed.
pub fn pick_module_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("SPIR-V binary", &["spv"])
        .add_filter("SPIR-V assembly", &["spvasm", "txt"])
        .pick_file()
}

/// Ask the user where a pipeline save would go, seeded with the normalized
/// name. Only the path comes back; writing it is not this module's job.
pub fn pick_save_target(default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter("Vulkan pipeline", &["json"])
        .save_file()
}
