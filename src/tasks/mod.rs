pub mod clean;
pub mod compile;
pub mod declarations;
pub mod package;

use tracing::info;

use crate::config::Config;
use crate::core::task::TaskRegistry;
use crate::error::StagehandResult;

/// Register the built-in build tasks against the project configuration
pub fn register_builtin(registry: &mut TaskRegistry, config: &Config) -> StagehandResult<()> {
    let project = &config.project;

    registry.register(clean::create(
        "clean-compiled",
        "Remove the compiled output directory",
        vec![project.build_dir.clone()],
    ))?;

    registry.register(clean::create(
        "clean-package",
        "Remove the staged package directory",
        vec![project.package_dir.clone()],
    ))?;

    registry.register(compile::create("compile", &config.compile, None))?;

    registry.register(package::create_copy(
        "package-files",
        project.build_dir.clone(),
        project.package_dir.clone(),
    ))?;

    registry.register(package::create_manifest(
        "package-manifest",
        project.manifest_path.clone(),
        project.package_dir.clone(),
    ))?;

    registry.register(package::create_readme(
        "package-readme",
        project.readme_path.clone(),
        project.package_dir.clone(),
        &config.readme.rewrite_from,
        &config.readme.rewrite_to,
    ))?;

    registry.register(declarations::create(
        "package-declarations",
        &project.name,
        project.source_dir.clone(),
        project.package_dir.clone(),
        &project.declaration_file,
    ))?;

    info!("Registered {} built-in tasks", registry.task_count());
    Ok(())
}
