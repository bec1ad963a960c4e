use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::{DrawCommand, Flip, Frame, TextureHandle};

// ── Vertex ───────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
        2 => Float32x4,  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Orthographic projection matrix (column-major) mapping pixel coords to clip space.
pub fn orthographic_projection(width: f32, height: f32) -> [f32; 16] {
    [
        2.0 / width, 0.0,           0.0, 0.0,
        0.0,         -2.0 / height, 0.0, 0.0,
        0.0,         0.0,           1.0, 0.0,
        -1.0,        1.0,           0.0, 1.0,
    ]
}

// ── Batching (pure, GPU-free) ────────────────────────────────────────────────

/// A run of consecutive vertices sharing one texture.
#[derive(Debug, PartialEq)]
pub(crate) struct Batch {
    pub texture_id: u32,
    /// Vertex range into the frame's vertex buffer.
    pub start: u32,
    pub end: u32,
}

/// Expand recorded draw commands into a vertex list plus per-texture batches.
///
/// Commands are kept in submission order; consecutive commands against the
/// same texture share a batch so the render pass issues one draw per run.
pub(crate) fn build_batches(
    commands: &[DrawCommand],
    texture_dims: impl Fn(u32) -> (u32, u32),
) -> (Vec<SpriteVertex>, Vec<Batch>) {
    let mut vertices = Vec::with_capacity(commands.len() * 6);
    let mut batches: Vec<Batch> = Vec::new();

    for cmd in commands {
        let (tex_w, tex_h) = texture_dims(cmd.texture.id);
        if tex_w == 0 || tex_h == 0 {
            continue;
        }

        // Source region in normalised UV coordinates.
        let (mut u0, v0, mut u1, v1) = match cmd.src {
            Some(src) => (
                src.x as f32 / tex_w as f32,
                src.y as f32 / tex_h as f32,
                src.right() as f32 / tex_w as f32,
                src.bottom() as f32 / tex_h as f32,
            ),
            None => (0.0, 0.0, 1.0, 1.0),
        };
        if cmd.flip == Flip::Horizontal {
            std::mem::swap(&mut u0, &mut u1);
        }

        let px = cmd.dst.x as f32;
        let py = cmd.dst.y as f32;
        let pw = cmd.dst.w as f32;
        let ph = cmd.dst.h as f32;
        let c = cmd.tint.0;

        let tl = SpriteVertex { position: [px,      py     ], uv: [u0, v0], color: c };
        let tr = SpriteVertex { position: [px + pw, py     ], uv: [u1, v0], color: c };
        let bl = SpriteVertex { position: [px,      py + ph], uv: [u0, v1], color: c };
        let br = SpriteVertex { position: [px + pw, py + ph], uv: [u1, v1], color: c };
        vertices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);

        let end = vertices.len() as u32;
        match batches.last_mut() {
            Some(batch) if batch.texture_id == cmd.texture.id => batch.end = end,
            _ => batches.push(Batch { texture_id: cmd.texture.id, start: end - 6, end }),
        }
    }

    (vertices, batches)
}

// ── Renderer ─────────────────────────────────────────────────────────────────

struct GpuTexture {
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

/// GPU renderer — owns the WGPU surface, the single sprite pipeline, and all
/// loaded textures.  Texture id 0 is always a built-in 1×1 opaque white
/// texture used for untextured fills.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: Vec<GpuTexture>,
    by_name: HashMap<String, TextureHandle>,
    /// Persistent vertex buffer; reallocated only when a frame outgrows it.
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(Arc::clone(&window)).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .expect("no suitable GPU adapter found");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to create device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let projection_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("projection_bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture_bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&projection_bind_group_layout, &texture_bind_group_layout],
            ..Default::default()
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let proj = orthographic_projection(config.width as f32, config.height as f32);
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("projection_buffer"),
            contents: bytemuck::cast_slice(&proj),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("projection_bg"),
            layout: &projection_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut renderer = Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            projection_buffer,
            projection_bind_group,
            texture_bind_group_layout,
            sampler,
            textures: Vec::new(),
            by_name: HashMap::new(),
            vertex_buffer: None,
            vertex_capacity: 0,
        };

        // Texture id 0: the 1×1 white fill texture.
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        renderer.upload(&white);

        renderer
    }

    /// Handle of the built-in 1×1 white texture (solid fills, overlays).
    pub fn blank(&self) -> TextureHandle {
        TextureHandle { id: 0, width: 1, height: 1 }
    }

    /// Load a single PNG file.  Returns `None` (with a logged warning) when
    /// the file cannot be read or decoded.
    pub fn load_texture(&mut self, path: &Path) -> Option<TextureHandle> {
        match image::open(path) {
            Ok(img) => Some(self.upload(&img.to_rgba8())),
            Err(e) => {
                eprintln!("renderer: failed to load {:?}: {e}", path);
                None
            }
        }
    }

    /// Scan `path` recursively for `.png` files and load each one, keyed by
    /// file stem for later lookup via [`Renderer::get`].  Duplicate stems are
    /// skipped with a warning — only the first occurrence is kept.
    pub fn load_folder(&mut self, path: &str) {
        for entry in walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let file_path = entry.path();
            if file_path.extension().and_then(|s| s.to_str()) != Some("png") {
                continue;
            }
            let name = match file_path.file_stem().and_then(|s| s.to_str()) {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => continue,
            };
            if self.by_name.contains_key(&name) {
                eprintln!("renderer: duplicate texture name '{name}' from {:?}; skipping", file_path);
                continue;
            }
            if let Some(handle) = self.load_texture(file_path) {
                self.by_name.insert(name, handle);
            }
        }
    }

    /// Look up a texture previously loaded by [`Renderer::load_folder`].
    pub fn get(&self, name: &str) -> Option<TextureHandle> {
        self.by_name.get(name).copied()
    }

    fn upload(&mut self, img: &RgbaImage) -> TextureHandle {
        let (w, h) = img.dimensions();
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("sprite_texture"),
                size: wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            img.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_texture_bg"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = self.textures.len() as u32;
        self.textures.push(GpuTexture { bind_group, width: w, height: h });
        TextureHandle { id, width: w, height: h }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);

        let proj = orthographic_projection(self.config.width as f32, self.config.height as f32);
        self.queue
            .write_buffer(&self.projection_buffer, 0, bytemuck::cast_slice(&proj));
    }

    /// Replay a recorded frame: one vertex upload, one render pass, one draw
    /// per texture run.  Clears to white (the overworld background).
    pub fn render(&mut self, frame: &Frame) -> Result<(), wgpu::SurfaceError> {
        let (vertices, batches) = build_batches(&frame.commands, |id| {
            self.textures
                .get(id as usize)
                .map_or((0, 0), |t| (t.width, t.height))
        });

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        if !vertices.is_empty() {
            let needed = vertices.len() * std::mem::size_of::<SpriteVertex>();
            if self.vertex_buffer.is_none() || self.vertex_capacity < needed {
                self.vertex_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("sprite_vertex_buffer"),
                    size: needed as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }));
                self.vertex_capacity = needed;
            }
            if let Some(buffer) = &self.vertex_buffer {
                self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&vertices));
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame_encoder") });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(buffer) = &self.vertex_buffer {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.projection_bind_group, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                for batch in &batches {
                    let Some(texture) = self.textures.get(batch.texture_id as usize) else {
                        continue;
                    };
                    pass.set_bind_group(1, &texture.bind_group, &[]);
                    pass.draw(batch.start..batch.end, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
