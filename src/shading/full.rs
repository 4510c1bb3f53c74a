use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3};

use crate::config::FullShaderConfig;
use crate::core::GpuContext;
use crate::model::Model;
use crate::types::{FullUniforms, LightParams, Vertex};

use super::shadow::ShadowMap;
use super::uniform_ring::UniformRing;

/// Bind groups available to a pipeline (wgpu's default `max_bind_groups`)
pub const MAX_TEXTURE_UNITS: u32 = 4;

/// Depth format of the colour pass the full shader draws into
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Bind-group index the shadow map is bound at.
///
/// Group 0 holds the per-draw uniforms, so valid units are
/// `1..MAX_TEXTURE_UNITS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureUnit(pub u32);

impl TextureUnit {
    pub fn validate(self) -> Result<Self> {
        if self.0 == 0 || self.0 >= MAX_TEXTURE_UNITS {
            bail!(
                "Texture unit {} unavailable: group 0 holds draw uniforms, valid units are 1..{}",
                self.0,
                MAX_TEXTURE_UNITS
            );
        }
        Ok(self)
    }
}

impl Default for TextureUnit {
    fn default() -> Self {
        Self(1)
    }
}

/// WGSL of the full pass with the shadow map bound at `texture_unit`
pub fn full_shader_source(texture_unit: TextureUnit) -> String {
    include_str!("shaders/full.wgsl").replace("SHADOW_GROUP", &texture_unit.0.to_string())
}

/// "Full" shading pass: lit, shadowed, per-draw shaded models.
///
/// Owns the compiled pipeline and its per-draw uniform ring; create one per
/// renderer and drop it with the renderer.
pub struct FullShader {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
    shadow_layout: wgpu::BindGroupLayout,
    shadow_bind_group: Option<wgpu::BindGroup>,
    /// Empty groups between 0 and the texture unit
    filler_bind_group: Option<wgpu::BindGroup>,
    texture_unit: TextureUnit,
    ring: UniformRing,
    light: LightParams,
}

impl FullShader {
    /// Compile the shader and build the pipeline for the given colour target
    pub fn new(
        gpu: &GpuContext,
        config: &FullShaderConfig,
        texture_unit: TextureUnit,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let texture_unit = texture_unit.validate()?;
        let device = gpu.device();
        let available = device.limits().max_bind_groups;
        if texture_unit.0 >= available {
            bail!("Texture unit {} exceeds device limit of {} bind groups", texture_unit.0, available);
        }

        let ring = UniformRing::new(
            device,
            "Full Uniform Ring",
            std::mem::size_of::<FullUniforms>() as u64,
            config.max_draws_per_frame,
        );

        let source = full_shader_source(texture_unit);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Full Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Full Uniform Layout"),
            entries: &[ring.layout_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let uniform_bind_group = ring.create_bind_group(device, &uniform_layout);

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Full Shadow Map Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let filler_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Full Empty Layout"),
            entries: &[],
        });
        let filler_bind_group = (texture_unit.0 > 1).then(|| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Full Empty Bind Group"),
                layout: &filler_layout,
                entries: &[],
            })
        });

        let mut layouts: Vec<&wgpu::BindGroupLayout> = vec![&uniform_layout];
        layouts.extend((1..texture_unit.0).map(|_| &filler_layout));
        layouts.push(&shadow_layout);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Full Pipeline Layout"),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Full Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: config.cull_back_faces.then_some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!(
            "Full shader ready: shadow map on texture unit {}, {} draws per frame",
            texture_unit.0,
            ring.capacity()
        );

        Ok(Self {
            gpu: gpu.clone(),
            pipeline,
            uniform_bind_group,
            shadow_layout,
            shadow_bind_group: None,
            filler_bind_group,
            texture_unit,
            ring,
            light: LightParams {
                direction: Vec3::from_array(config.light_direction),
                ambient: config.ambient,
                shadow_bias: config.shadow_bias,
                shadow_map_size: 1,
            },
        })
    }

    pub fn texture_unit(&self) -> TextureUnit {
        self.texture_unit
    }

    pub fn light(&self) -> &LightParams {
        &self.light
    }

    pub fn set_light_direction(&mut self, direction: Vec3) {
        self.light.direction = direction;
    }

    /// Bind the shadow map sampled by every following draw
    pub fn bind_shadow_map(&mut self, shadow_map: &ShadowMap) {
        let bind_group = self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Full Shadow Map Bind Group"),
            layout: &self.shadow_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(shadow_map.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(shadow_map.sampler()),
                },
            ],
        });
        self.shadow_bind_group = Some(bind_group);
        self.light.shadow_map_size = shadow_map.size();
    }

    /// Rewind the per-draw uniforms; call once per frame before drawing
    pub fn begin_frame(&mut self) {
        self.ring.reset();
    }

    pub fn draws_this_frame(&self) -> u32 {
        self.ring.used()
    }

    /// Draw one model with the full shading pass
    pub fn draw_full(
        &mut self,
        pass: &mut wgpu::RenderPass<'_>,
        model: &Model,
        model_view_projection: &Mat4,
        shadow_map_transform: &Mat4,
        model_transform: &Mat4,
        shade: f32,
    ) -> Result<()> {
        let shadow_bind_group = self
            .shadow_bind_group
            .as_ref()
            .context("Full shader has no shadow map bound")?;

        let uniforms = FullUniforms::new(
            model_view_projection,
            shadow_map_transform,
            model_transform,
            model.base_color(),
            shade,
            &self.light,
        );
        let offset = self.ring.push(self.gpu.queue(), &uniforms)?;

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
        if let Some(filler) = &self.filler_bind_group {
            for group in 1..self.texture_unit.0 {
                pass.set_bind_group(group, filler, &[]);
            }
        }
        pass.set_bind_group(self.texture_unit.0, shadow_bind_group, &[]);
        model.draw(pass);
        Ok(())
    }
}
