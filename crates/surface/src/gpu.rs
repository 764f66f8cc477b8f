//! wgpu backend: `clouds.wgsl` drawn into an offscreen texture and read back.

use shading::{GpuUniforms, Uniforms};
use tracing::{debug, error, info};
use wgpu::util::DeviceExt;

use crate::{check_max_dimension, check_size, Node, RenderSurface, SurfaceDesc, SurfaceElement, SurfaceError, SHADER_SOURCE};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch of the readback buffer, rounded up to the copy alignment.
fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

/// Check that a `width` x `height` target and its readback buffer fit within
/// `limits`, before any resource is created.
fn check_target(limits: &wgpu::Limits, width: u32, height: u32) -> Result<(), SurfaceError> {
    check_max_dimension(width, height, limits.max_texture_dimension_2d)?;
    let bytes = u64::from(padded_bytes_per_row(width)) * u64::from(height);
    if bytes > limits.max_buffer_size {
        return Err(SurfaceError::Gpu(format!(
            "readback buffer of {bytes} bytes exceeds the device limit of {}",
            limits.max_buffer_size
        )));
    }
    Ok(())
}

/// Size-dependent resources.
struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    padded_bytes_per_row: u32,
}

impl Target {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Clouds Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_bytes_per_row = padded_bytes_per_row(width);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Clouds Readback"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            readback,
            padded_bytes_per_row,
        }
    }
}

struct Gpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    target: Target,
    limits: wgpu::Limits,
}

pub struct GpuSurface {
    width: u32,
    height: u32,
    clear: wgpu::Color,
    gpu: Option<Gpu>,
    pixels: Vec<u8>,
    element: SurfaceElement,
}

impl std::fmt::Debug for GpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("released", &self.gpu.is_none())
            .finish_non_exhaustive()
    }
}

impl GpuSurface {
    pub fn new(desc: &SurfaceDesc) -> Result<Self, SurfaceError> {
        desc.validate()?;
        let gpu = pollster::block_on(Gpu::new(desc.width, desc.height))?;
        let [r, g, b, _] = desc.clear_rgba();
        let element = SurfaceElement::new(desc);
        element.set_size(desc.width, desc.height);
        Ok(Self {
            width: desc.width,
            height: desc.height,
            clear: wgpu::Color {
                r: f64::from(r) / 255.0,
                g: f64::from(g) / 255.0,
                b: f64::from(b) / 255.0,
                a: 1.0,
            },
            gpu: Some(gpu),
            pixels: desc.clear_rgba().repeat(desc.width as usize * desc.height as usize),
            element,
        })
    }

    /// Longest side the device accepts, `None` once released.
    pub fn max_dimension(&self) -> Option<u32> {
        self.gpu.as_ref().map(|gpu| gpu.limits.max_texture_dimension_2d)
    }
}

impl Gpu {
    async fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| SurfaceError::BackendUnavailable("no suitable adapter".to_owned()))?;
        info!(adapter = ?adapter.get_info().name, "gpu surface adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Clouds Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| SurfaceError::BackendUnavailable(e.to_string()))?;
        device.on_uncaptured_error(Box::new(|e| error!("uncaptured wgpu error: {e}")));

        let limits = device.limits();
        check_target(&limits, width, height)?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Clouds Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Clouds Uniforms"),
            contents: bytemuck::bytes_of(&GpuUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Clouds Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Clouds Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Clouds Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Clouds Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let target = Target::new(&device, width, height);

        Ok(Self {
            device,
            queue,
            pipeline,
            uniform_buffer,
            bind_group,
            target,
            limits,
        })
    }

    fn draw(&self, uniforms: &Uniforms, clear: wgpu::Color, width: u32, height: u32) -> Result<Vec<u8>, SurfaceError> {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&GpuUniforms::from(uniforms)));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clouds Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clouds Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.target.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(self.target.padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = self.target.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| SurfaceError::Gpu(e.to_string()))?
            .map_err(|e| SurfaceError::Gpu(e.to_string()))?;

        let row_bytes = (width * BYTES_PER_PIXEL) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(self.target.padded_bytes_per_row as usize).take(height as usize) {
                pixels.extend_from_slice(&row[..row_bytes]);
            }
        }
        self.target.readback.unmap();
        Ok(pixels)
    }
}

impl RenderSurface for GpuSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn element(&self) -> &Node {
        self.element.node()
    }

    fn attach(&mut self, parent: &Node) -> Result<(), SurfaceError> {
        if self.gpu.is_none() {
            return Err(SurfaceError::Released);
        }
        self.element.attach(parent);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let gpu = self.gpu.as_mut().ok_or(SurfaceError::Released)?;
        check_size(width, height)?;
        check_target(&gpu.limits, width, height)?;
        gpu.target = Target::new(&gpu.device, width, height);
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.element.set_size(width, height);
        debug!(width, height, "gpu surface resized");
        Ok(())
    }

    fn render(&mut self, uniforms: &Uniforms) -> Result<(), SurfaceError> {
        let gpu = self.gpu.as_ref().ok_or(SurfaceError::Released)?;
        self.pixels = gpu.draw(uniforms, self.clear, self.width, self.height)?;
        Ok(())
    }

    fn release(&mut self) {
        if self.gpu.take().is_some() {
            self.element.detach();
            self.pixels = Vec::new();
            debug!("gpu surface released");
        }
    }

    fn is_released(&self) -> bool {
        self.gpu.is_none()
    }

    fn pixels(&self) -> Option<&[u8]> {
        (self.gpu.is_some() && !self.pixels.is_empty()).then_some(self.pixels.as_slice())
    }
}
