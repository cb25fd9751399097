use std::path::PathBuf;

use anyhow::{Result, anyhow};
use spirv_viewer::app::ViewerApp;
use spirv_viewer::module::Target;
use spirv_viewer::toolchain::CrossToolchain;
use spirv_viewer::{dialog, report};

#[derive(Debug, Default, Clone)]
struct Cli {
    path: Option<PathBuf>,
    json: bool,
    target: Option<Target>,
    open_dialog: bool,
    save_dialog: bool,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                cli.json = true;
                i += 1;
            }
            "--open-dialog" => {
                cli.open_dialog = true;
                i += 1;
            }
            "--save-dialog" => {
                cli.save_dialog = true;
                i += 1;
            }
            "--target" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --target"));
                };
                cli.target = Some(v.parse().map_err(|e: String| anyhow!(e))?);
                i += 2;
            }
            other if !other.starts_with('-') => {
                if cli.path.is_some() {
                    return Err(anyhow!("more than one module file given: {other}"));
                }
                cli.path = Some(PathBuf::from(other));
                i += 1;
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: <module file>, --target <glsl|hlsl|msl>, --json, --open-dialog, --save-dialog)"
                ));
            }
        }
    }
    Ok(cli)
}

fn main() -> Result<()> {
    // Keep stdout clean for reports; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;

    let path = match cli.path {
        Some(path) => Some(path),
        None if cli.open_dialog => {
            let picked = dialog::pick_module_file();
            if picked.is_none() {
                eprintln!("no file selected");
                return Ok(());
            }
            picked
        }
        // No path means an empty viewer, same as launching without a file.
        None => None,
    };

    let toolchain = CrossToolchain::new()?;
    let mut app = ViewerApp::default();
    if let Some(target) = cli.target {
        app.select_target(target);
    }

    if let Some(path) = path {
        let issues = app.load(&path, &toolchain)?;
        for issue in &issues {
            eprintln!("warning: {issue}");
        }
    }

    if cli.save_dialog {
        // Saving is a stub: the dialog picks a destination, nothing is
        // written to it.
        match dialog::pick_save_target(&app.save_file_name()) {
            Some(target) => eprintln!("save target chosen: {}", target.display()),
            None => eprintln!("save canceled"),
        }
    }

    if cli.json {
        println!("{}", report::json(&app)?);
        return Ok(());
    }

    print!("{}", report::summary(&app));
    if let Some(module) = app.current() {
        println!();
        match module.source(app.current_target) {
            Some(source) => {
                println!("{}:", app.current_target.label());
                print!("{source}");
            }
            None => println!("{}: missing", app.current_target.label()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cli_accepts_path_target_and_json() {
        let args = vec![
            "shader.vert.spv".to_string(),
            "--target".to_string(),
            "msl".to_string(),
            "--json".to_string(),
        ];
        let cli = parse_cli(&args).unwrap();
        assert_eq!(cli.path.as_ref().unwrap(), &PathBuf::from("shader.vert.spv"));
        assert_eq!(cli.target, Some(Target::Msl));
        assert!(cli.json);
        assert!(!cli.open_dialog);
        assert!(!cli.save_dialog);
    }

    #[test]
    fn parse_cli_accepts_the_dialog_flags() {
        let args = vec!["--open-dialog".to_string(), "--save-dialog".to_string()];
        let cli = parse_cli(&args).unwrap();
        assert!(cli.open_dialog);
        assert!(cli.save_dialog);
        assert!(cli.path.is_none());
    }

    #[test]
    fn parse_cli_rejects_a_second_path() {
        let args = vec!["a.spv".to_string(), "b.spv".to_string()];
        assert!(parse_cli(&args).is_err());
    }

    #[test]
    fn parse_cli_rejects_unknown_flags_and_bad_targets() {
        assert!(parse_cli(&["--frobnicate".to_string()]).is_err());
        assert!(parse_cli(&["--target".to_string(), "wgsl".to_string()]).is_err());
        assert!(parse_cli(&["--target".to_string()]).is_err());
    }
}
