use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use avatar_swap::config::{default_config_path, load_settings, AvatarSettings};
use avatar_swap::scene::SceneGraph;
use avatar_swap::substitution::AvatarSystem;
use avatar_swap::utils::logging::init_logging;

const USAGE: &str = "\
Usage: avatar-swap [CONFIG] [--dump-textures DIR]

Preloads every avatar named in the settings file and reports which of them
import and convert cleanly. CONFIG defaults to the user config location.

Options:
  --dump-textures DIR   write each template's baked main textures as PNG
  -h, --help            show this help
";

fn main() -> ExitCode {
    init_logging();

    let mut config_path: Option<PathBuf> = None;
    let mut dump_dir: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            "--dump-textures" => match args.next() {
                Some(dir) => dump_dir = Some(PathBuf::from(dir)),
                None => {
                    eprintln!("error: --dump-textures requires a directory");
                    return ExitCode::FAILURE;
                }
            },
            other => config_path = Some(PathBuf::from(other)),
        }
    }

    match run(config_path, dump_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<PathBuf>, dump_dir: Option<PathBuf>) -> Result<()> {
    let settings = match config_path.or_else(default_config_path) {
        Some(path) if path.exists() => load_settings(&path)?,
        Some(path) => {
            warn!(path = %path.display(), "No settings file; using defaults");
            AvatarSettings::default()
        }
        None => bail!("no config path given and no user config directory available"),
    };

    let models = settings.configured_models();
    let mut system = AvatarSystem::new(settings);

    let mut loaded = 0;
    for name in &models {
        match system.template(name) {
            Some(template) => {
                loaded += 1;
                info!(
                    model = %name,
                    meshes = template.meshes.len(),
                    bones = template.skeleton.len(),
                    materials = template.materials.len(),
                    "Avatar ready"
                );
                if let Some(dir) = &dump_dir {
                    dump_baked_textures(dir, &template)?;
                }
            }
            None => warn!(model = %name, "Avatar failed to load"),
        }
    }

    info!(loaded, total = models.len(), "Preload complete");
    Ok(())
}

/// Write each converted material's baked main texture next to the others,
/// named `<asset>_mat<N>.png`, for visual inspection.
fn dump_baked_textures(dir: &Path, template: &SceneGraph) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create dump dir: {}", dir.display()))?;

    for (index, material) in template.materials.iter().enumerate() {
        let Some(texture_index) = material.slots.main_texture else {
            continue;
        };
        let Some(texture) = template.textures.get(texture_index) else {
            continue;
        };
        let path = dir.join(format!("{}_mat{}.png", template.name, index));
        texture
            .save_png(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Baked texture written");
    }
    Ok(())
}
