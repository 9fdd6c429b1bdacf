use std::path::Path;

use crate::error::LoadError;

/// Vertex and fragment stages of one program. Entry points are `vs_main` and
/// `fs_main`.
#[derive(Debug)]
pub struct ShaderPair {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

/// Turns a pair of shader sources into GPU modules.
pub trait ProgramLoader {
    fn load_program(
        &self,
        device: &wgpu::Device,
        vertex: &Path,
        fragment: &Path,
    ) -> Result<ShaderPair, LoadError>;
}

/// Reads WGSL sources from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct WgslLoader;

impl ProgramLoader for WgslLoader {
    fn load_program(
        &self,
        device: &wgpu::Device,
        vertex: &Path,
        fragment: &Path,
    ) -> Result<ShaderPair, LoadError> {
        let module = |path: &Path| -> Result<wgpu::ShaderModule, LoadError> {
            let source = read_source(path)?;
            let label = path.display().to_string();
            Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            }))
        };
        Ok(ShaderPair {
            vertex: module(vertex)?,
            fragment: module(fragment)?,
        })
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if source.trim().is_empty() {
        return Err(LoadError::EmptyShader {
            path: path.to_path_buf(),
        });
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_source_is_rejected() {
        let path = std::env::temp_dir().join(format!("orrery-blank-{}.wgsl", std::process::id()));
        std::fs::write(&path, "  \n").unwrap();
        let result = read_source(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(LoadError::EmptyShader { .. })));
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let result = read_source(Path::new("shaders/nowhere.wgsl"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn bundled_shaders_are_present() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders");
        for name in [
            "3d.vs.wgsl",
            "normals.fs.wgsl",
            "light.vs.wgsl",
            "light.fs.wgsl",
            "texture_light.fs.wgsl",
            "skybox.vs.wgsl",
            "skybox.fs.wgsl",
        ] {
            assert!(read_source(&root.join(name)).is_ok(), "{name}");
        }
    }
}
