use std::{iter::ExactSizeIterator, mem::offset_of, path::Path};

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use gltf::{buffer, mesh::util::ReadTexCoords, Gltf};
use log::debug;
use wgpu::util::DeviceExt;

use lib_geometry::Aabb;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Default)]
pub struct Vertex {
    // Geometric properties
    pub position: Vec4,
    // ---- 16 byte alignment
    pub normal: Vec4,
    // Material properties
    // ---- 16 byte alignment
    pub base_color_factor: Vec4,
    // ---- 16 byte alignment
    pub base_color_texture_coordinates: Vec2,
    pub _padding: Vec2,
}

impl Vertex {
    pub(crate) fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(Vertex, base_color_factor) as wgpu::BufferAddress,
                    shader_location: 2,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: offset_of!(Vertex, base_color_texture_coordinates)
                        as wgpu::BufferAddress,
                    shader_location: 3,
                },
            ],
        }
    }
}

/// CPU-side contents of a loaded model, decoupled from any GPU resources so
/// loading can fail before a device exists.
pub struct ModelData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Object-space bounds over all primitives, used for ray tests.
    pub bounds: Aabb,
}

impl ModelData {
    /// Read a `.gltf`/`.glb` file and flatten all mesh primitives into one
    /// vertex/index pair.
    ///
    /// # Errors
    /// Returns an error when the file or one of its buffers cannot be read
    /// or parsed. Callers are expected to abort setup in that case instead
    /// of continuing with a missing model.
    pub fn load(model_path: &Path) -> anyhow::Result<Self> {
        let file_content = std::fs::read(model_path)
            .with_context(|| format!("reading model file {}", model_path.display()))?;
        let gltf = Gltf::from_slice(&file_content)
            .with_context(|| format!("parsing {}", model_path.display()))?;

        // Load buffers; binary glb files carry their payload as a blob
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                buffer::Source::Bin => {
                    let blob = gltf
                        .blob
                        .as_deref()
                        .context("model declares a binary buffer but has no blob")?;
                    buffer_data.push(blob.to_vec());
                }
                buffer::Source::Uri(uri) => {
                    let path = model_path.with_file_name(uri);
                    let bin = std::fs::read(&path)
                        .with_context(|| format!("reading model buffer {}", path.display()))?;
                    buffer_data.push(bin);
                }
            }
        }

        let mut vertices = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut bounds = Aabb::default();

        for (mesh_index, mesh) in gltf.meshes().enumerate() {
            debug!("loading mesh {mesh_index} of {}", model_path.display());
            for primitive in mesh.primitives() {
                let base_color_factor =
                    Vec4::from_array(primitive.material().pbr_metallic_roughness().base_color_factor());

                let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

                let mut positions = reader.read_positions();
                let mut normals = reader.read_normals();
                let mut tex_coords = reader.read_tex_coords(0).map(ReadTexCoords::into_f32);

                let vertex_count = [
                    positions.as_ref().map(ExactSizeIterator::len),
                    normals.as_ref().map(ExactSizeIterator::len),
                    tex_coords.as_ref().map(ExactSizeIterator::len),
                ]
                .into_iter()
                .flatten()
                .max()
                .unwrap_or_default();

                let index_offset = u32::try_from(vertices.len())
                    .context("model exceeds the 32 bit index range")?;

                for _ in 0..vertex_count {
                    let position = positions
                        .as_mut()
                        .and_then(Iterator::next)
                        .unwrap_or_default();
                    let normal = normals
                        .as_mut()
                        .and_then(Iterator::next)
                        .unwrap_or_default();
                    let tex_coord = tex_coords
                        .as_mut()
                        .and_then(Iterator::next)
                        .unwrap_or_default();

                    bounds.extend(Vec3::from(position));
                    vertices.push(Vertex {
                        position: (Vec3::from(position), 1.0).into(),
                        normal: (Vec3::from(normal), 1.0).into(),
                        base_color_factor,
                        base_color_texture_coordinates: tex_coord.into(),
                        _padding: Vec2::default(),
                    });
                }

                if let Some(indices_raw) = reader.read_indices() {
                    indices.extend(indices_raw.into_u32().map(|index| index + index_offset));
                }
            }
        }

        anyhow::ensure!(
            !vertices.is_empty(),
            "model {} contains no renderable primitives",
            model_path.display()
        );

        Ok(Self {
            vertices,
            indices,
            bounds,
        })
    }
}

pub(crate) struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    pub(crate) fn upload(data: &ModelData, device: &wgpu::Device, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: u32::try_from(data.indices.len())
                .unwrap_or_else(|_| unreachable!("checked during load")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_file_is_an_error() {
        let path = PathBuf::from("assets/does-not-exist.glb");
        let result = ModelData::load(&path);
        assert!(result.is_err());
    }
}
