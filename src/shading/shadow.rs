use anyhow::{bail, Result};
use glam::Mat4;

use crate::config::ShadowConfig;
use crate::core::GpuContext;
use crate::model::Model;
use crate::types::{DepthUniforms, Vertex};

use super::uniform_ring::UniformRing;

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// WGSL of the depth-only shadow pass
pub const SHADOW_SHADER_SOURCE: &str = include_str!("shaders/shadow.wgsl");

/// Depth texture rendered from the light and sampled by the full shader
pub struct ShadowMap {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    size: u32,
}

impl ShadowMap {
    pub fn new(gpu: &GpuContext, size: u32) -> Result<Self> {
        let max = gpu.device().limits().max_texture_dimension_2d;
        if size == 0 || size > max {
            bail!("Shadow map size {} outside 1..={}", size, max);
        }

        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Map Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        log::info!("Created {}x{} shadow map", size, size);
        Ok(Self {
            texture,
            view,
            sampler,
            size,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Start a depth-only pass that clears the map to the far plane
    pub fn begin_pass<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

/// Pipeline that renders models into a [`ShadowMap`]
pub struct ShadowPass {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    ring: UniformRing,
}

impl ShadowPass {
    pub fn new(gpu: &GpuContext, config: &ShadowConfig) -> Self {
        let device = gpu.device();
        let ring = UniformRing::new(
            device,
            "Shadow Uniform Ring",
            std::mem::size_of::<DepthUniforms>() as u64,
            config.max_draws_per_frame,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Uniform Layout"),
            entries: &[ring.layout_entry(wgpu::ShaderStages::VERTEX)],
        });
        let bind_group = ring.create_bind_group(device, &bind_group_layout);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: config.depth_bias_constant,
                    slope_scale: config.depth_bias_slope_scale,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            gpu: gpu.clone(),
            pipeline,
            bind_group,
            ring,
        }
    }

    pub fn begin_frame(&mut self) {
        self.ring.reset();
    }

    /// Render one model's depth with its light model-view-projection
    pub fn draw_depth(&mut self, pass: &mut wgpu::RenderPass<'_>, model: &Model, light_mvp: &Mat4) -> Result<()> {
        let uniforms = DepthUniforms {
            light_model_view_projection: light_mvp.to_cols_array_2d(),
        };
        let offset = self.ring.push(self.gpu.queue(), &uniforms)?;

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[offset]);
        model.draw(pass);
        Ok(())
    }
}
