use std::num::NonZeroU64;

use anyhow::{bail, Result};

/// Fixed-capacity uniform buffer handing out one dynamic-offset slot per draw.
///
/// Writes go through `Queue::write_buffer`, which lands before the next
/// submit, so every draw recorded in a frame sees its own slot.
pub struct UniformRing {
    buffer: wgpu::Buffer,
    item_size: u64,
    stride: u64,
    capacity: u32,
    cursor: u32,
    label: &'static str,
}

impl UniformRing {
    pub fn new(device: &wgpu::Device, label: &'static str, item_size: u64, capacity: u32) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_up(item_size, alignment);
        let capacity = capacity.max(1);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            item_size,
            stride,
            capacity,
            cursor: 0,
            label,
        }
    }

    /// Layout entry for binding 0 of the per-draw group
    pub fn layout_entry(&self, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(self.item_size),
            },
            count: None,
        }
    }

    pub fn create_bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &self.buffer,
                    offset: 0,
                    size: NonZeroU64::new(self.item_size),
                }),
            }],
        })
    }

    /// Write the next slot and return its dynamic offset
    pub fn push<T: bytemuck::Pod>(&mut self, queue: &wgpu::Queue, value: &T) -> Result<u32> {
        if self.cursor >= self.capacity {
            bail!(
                "{} is full ({} draws this frame); call begin_frame or raise the draw limit",
                self.label,
                self.capacity
            );
        }
        let offset = self.cursor as u64 * self.stride;
        queue.write_buffer(&self.buffer, offset, bytemuck::bytes_of(value));
        self.cursor += 1;
        Ok(offset as u32)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn used(&self) -> u32 {
        self.cursor
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }
}

pub(crate) fn align_up(value: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}
