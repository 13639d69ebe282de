//! WGSL source and the CPU-side layouts it reads.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::camera::Camera;
use crate::field::SimulationObject;
use crate::theme::{rgb, srgb_to_linear, ThemeStyle};

pub const CUBE_SHADER: &str = include_str!("shaders/cube.wgsl");

/// Ambient light color (0x444444) and intensity.
const AMBIENT: (u32, f32) = (0x444444, 0.7);
/// Directional light color, intensity and direction toward the light.
const SUN: (u32, f32) = (0xffffff, 0.6);
const SUN_DIRECTION: Vec3 = Vec3::new(1.0, 2.0, 3.0);

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
    pub material: [f32; 4],
}

impl Uniforms {
    pub fn new(camera: &Camera, style: &ThemeStyle) -> Self {
        let ambient = srgb_to_linear(rgb(AMBIENT.0)) * AMBIENT.1;
        let sun = srgb_to_linear(rgb(SUN.0)) * SUN.1;
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light_dir: SUN_DIRECTION.normalize().extend(0.0).to_array(),
            light_color: sun.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            material: [style.metalness, style.roughness, 0.0, 0.0],
        }
    }
}

/// Unit-cube vertex with a face normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-object draw data. Colors are linear.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub position: [f32; 3],
    pub opacity: f32,
    pub scale: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
    pub emissive: [f32; 3],
    pub _pad2: f32,
}

impl Instance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 2,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32,
            offset: 12,
            shader_location: 3,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 16,
            shader_location: 4,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 32,
            shader_location: 5,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 48,
            shader_location: 6,
        },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Instance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    pub fn from_object(obj: &SimulationObject) -> Self {
        let r = &obj.render;
        Self {
            position: r.position.to_array(),
            opacity: r.opacity,
            scale: (r.scale * obj.size).to_array(),
            _pad0: 0.0,
            color: srgb_to_linear(r.color).to_array(),
            _pad1: 0.0,
            emissive: srgb_to_linear(r.emissive).to_array(),
            _pad2: 0.0,
        }
    }
}

/// Instances for every object, farthest from `eye` first so translucent
/// cubes blend over what is behind them.
pub fn build_instances(objects: &[SimulationObject], eye: Vec3) -> Vec<Instance> {
    let mut order: Vec<(f32, &SimulationObject)> = objects
        .iter()
        .map(|o| (o.render.position.distance_squared(eye), o))
        .collect();
    order.sort_by(|a, b| b.0.total_cmp(&a.0));
    order.into_iter().map(|(_, o)| Instance::from_object(o)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldParams};

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 144);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<Instance>(), 64);
    }

    #[test]
    fn test_instances_sorted_back_to_front() {
        let params = FieldParams {
            count: 64,
            ..Default::default()
        };
        let field = Field::spawn(&params, Some(2), 60.0);
        let eye = Vec3::new(0.0, 0.0, 60.0);
        let instances = build_instances(field.objects(), eye);
        assert_eq!(instances.len(), 64);

        let dists: Vec<f32> = instances
            .iter()
            .map(|i| Vec3::from_array(i.position).distance_squared(eye))
            .collect();
        assert!(dists.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_instance_scale_includes_size() {
        let field = Field::spawn(&FieldParams::default(), Some(4), 60.0);
        let obj = &field.objects()[0];
        let inst = Instance::from_object(obj);
        assert!((inst.scale[0] - obj.size).abs() < 1e-6);
    }
}
