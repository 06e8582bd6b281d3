//! Ion trap rendering
//!
//! Ions, Bloch indicators, and the cooling wash are drawn as glowing
//! billboards; beams, the entanglement arc, and the trap rails as lines.

use crate::demo::IonTrapDemo;
use common::{Camera3D, CameraUniform, GraphicsContext};
use glam::Vec3;
use wgpu::util::DeviceExt;

/// Instance data for a glowing billboard
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

impl PointInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        2 => Float32x3,  // position
        3 => Float32,    // size
        4 => Float32x4,  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Quad vertex for billboards
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Line vertex for beams, arcs, and rails
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

pub type Line = (Vec3, Vec3, [f32; 4]);

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.04,
    a: 1.0,
};

const RAIL_COLOR: [f32; 4] = [0.55, 0.5, 0.35, 0.6];

/// Renderer for the ion chain and its effects
pub struct IonRenderer {
    point_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    point_buffer: wgpu::Buffer,
    max_points: usize,

    line_pipeline: wgpu::RenderPipeline,
    line_buffer: wgpu::Buffer,
    max_lines: usize,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl IonRenderer {
    pub fn new(ctx: &GraphicsContext, max_points: usize, max_lines: usize) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ion Trap Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ion_trap.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ion Trap Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let blend = Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        });

        let point_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_point",
                buffers: &[QuadVertex::layout(), PointInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_point",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_line",
                buffers: &[LineVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_line",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let point_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Instance Buffer"),
            size: (std::mem::size_of::<PointInstance>() * max_points) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Buffer"),
            size: (std::mem::size_of::<LineVertex>() * max_lines * 2) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            point_pipeline,
            quad_buffer,
            point_buffer,
            max_points,
            line_pipeline,
            line_buffer,
            max_lines,
            camera_buffer,
            camera_bind_group,
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera3D) {
        let uniform = CameraUniform::from_camera_3d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Upload points, returning how many fit in the buffer
    pub fn update_points(&self, queue: &wgpu::Queue, points: &[PointInstance]) -> u32 {
        let data = &points[..points.len().min(self.max_points)];
        queue.write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(data));
        data.len() as u32
    }

    /// Upload lines, returning how many fit in the buffer
    pub fn update_lines(&self, queue: &wgpu::Queue, lines: &[Line]) -> u32 {
        let vertices: Vec<LineVertex> = lines
            .iter()
            .take(self.max_lines)
            .flat_map(|(v1, v2, color)| {
                [
                    LineVertex {
                        position: v1.to_array(),
                        color: *color,
                    },
                    LineVertex {
                        position: v2.to_array(),
                        color: *color,
                    },
                ]
            })
            .collect();

        queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&vertices));
        (vertices.len() / 2) as u32
    }

    fn begin_pass<'a>(
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
        label: &str,
        clear: bool,
    ) -> wgpu::RenderPass<'a> {
        let load = if clear {
            wgpu::LoadOp::Clear(BACKGROUND)
        } else {
            wgpu::LoadOp::Load
        };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    pub fn render_points(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        num_points: u32,
        clear: bool,
    ) {
        let mut render_pass = Self::begin_pass(encoder, view, "Point Render Pass", clear);
        render_pass.set_pipeline(&self.point_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.point_buffer.slice(..));
        render_pass.draw(0..6, 0..num_points);
    }

    pub fn render_lines(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        num_lines: u32,
        clear: bool,
    ) {
        let mut render_pass = Self::begin_pass(encoder, view, "Line Render Pass", clear);
        render_pass.set_pipeline(&self.line_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
        render_pass.draw(0..(num_lines * 2), 0..1);
    }
}

// ============================================
// Scene assembly
// ============================================

/// Billboards for the current frame: cooling wash first so ions draw on top
pub fn scene_points(demo: &IonTrapDemo) -> Vec<PointInstance> {
    let config = demo.config();
    let mut points = Vec::new();

    for wash in &demo.effects().washes {
        let opacity = wash.opacity();
        let length = (wash.end - wash.start).length();
        let samples = ((length / (wash.radius * 0.5)).ceil() as usize).max(1);
        for i in 0..=samples {
            let p = wash.start.lerp(wash.end, i as f32 / samples as f32);
            points.push(PointInstance {
                position: p.to_array(),
                size: wash.radius,
                color: [wash.color[0], wash.color[1], wash.color[2], opacity],
            });
        }
    }

    for ion in demo.ions() {
        let look = ion.appearance;
        let glow = look.emissive_intensity * 0.4;
        let color = [
            (look.color[0] + look.emissive[0] * glow).min(1.0),
            (look.color[1] + look.emissive[1] * glow).min(1.0),
            (look.color[2] + look.emissive[2] * glow).min(1.0),
            1.0,
        ];
        let size = config.ion_radius * look.scale;
        points.push(PointInstance {
            position: ion.display_position.to_array(),
            size,
            color,
        });

        let tip = ion.display_position + ion.level.bloch_vector() * (size + 0.2);
        points.push(PointInstance {
            position: tip.to_array(),
            size: 0.06,
            color: [1.0, 1.0, 1.0, 0.8],
        });
    }

    points.push(PointInstance {
        position: config.laser_anchor.to_array(),
        size: 0.15,
        color: [1.0, 0.9, 0.6, 1.0],
    });

    points
}

/// Line segments for the current frame
pub fn scene_lines(demo: &IonTrapDemo) -> Vec<Line> {
    let config = demo.config();
    let mut lines = Vec::new();

    // Trap electrodes either side of the chain
    if let (Some(first), Some(last)) = (demo.ions().first(), demo.ions().last()) {
        let margin = Vec3::X * config.ion_spacing;
        let start = first.base_position() - margin;
        let end = last.base_position() + margin;
        for offset in [Vec3::new(0.0, -0.8, 0.8), Vec3::new(0.0, -0.8, -0.8)] {
            lines.push((start + offset, end + offset, RAIL_COLOR));
        }
    }

    for beam in &demo.effects().beams {
        let alpha = beam.color[3] * (1.0 - beam.life.fraction() * 0.5);
        lines.push((beam.from, beam.to, [beam.color[0], beam.color[1], beam.color[2], alpha]));
    }

    for curve in &demo.effects().curves {
        lines.extend(curve.segments().map(|(a, b)| (a, b, curve.color)));
    }

    lines
}
