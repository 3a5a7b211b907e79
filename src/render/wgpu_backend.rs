use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::image::Image;
use crate::render::backend::{
    MeshHandle, ProgramHandle, RenderBackend, TextureHandle, UniformValue,
};
use crate::render::Vertex;

/// Byte size of one per-draw uniform block; matches the `Uniforms` struct in
/// the WGSL sources field for field.
const UNIFORM_BLOCK_SIZE: u64 = 512;

/// One shared uniform buffer per frame, sliced per draw with dynamic
/// offsets. 2048 draws per frame before `draw` starts failing.
const MAX_DRAWS_PER_FRAME: u64 = 2048;
const UNIFORM_BUFFER_SIZE: u64 = UNIFORM_BLOCK_SIZE * MAX_DRAWS_PER_FRAME;

const MAX_TEXTURE_UNITS: usize = 4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Named uniforms and their (offset, size) slots inside the uniform block.
/// Writes land directly in the CPU staging copy; the whole block is uploaded
/// per draw.
const UNIFORM_LAYOUT: &[(&str, u64, u64)] = &[
    ("model", 0, 64),
    ("view", 64, 64),
    ("proj", 128, 64),
    ("normalMat", 192, 64),
    ("lamb", 256, 16),
    ("ldif", 272, 16),
    ("lspe", 288, 16),
    ("lpos", 304, 16),
    ("ldir", 320, 16),
    ("mamb", 336, 16),
    ("mdif", 352, 16),
    ("mspe", 368, 16),
    ("fogColor", 384, 12),
    ("fogStart", 396, 4),
    ("fogEnd", 400, 4),
    ("roughFactor", 404, 4),
    ("envStrength", 408, 4),
    ("mshi", 412, 4),
    ("att", 416, 12),
    ("spotCutoff", 428, 4),
    ("spotExponent", 432, 4),
    ("useSpot", 436, 4),
    ("clipCount", 440, 4),
    ("clipPlane", 448, 64),
];

/// Fixed bind slots per sampler name: (texture binding, sampler binding).
const SAMPLER_SLOTS: &[(&str, u32, u32)] = &[
    ("decal", 1, 2),
    ("roughness", 3, 4),
    ("envMap", 5, 6),
    ("normal", 7, 8),
];

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct GpuTexture {
    view: wgpu::TextureView,
    is_cube: bool,
}

struct GpuProgram {
    module: wgpu::ShaderModule,
    /// Pipelines per depth-bias setting, created on first use. `None` is the
    /// unbiased pipeline; a `Some` key carries the bias (factor, units) bit
    /// patterns.
    pipelines: HashMap<Option<(u32, u32)>, wgpu::RenderPipeline>,
}

struct FrameState {
    surface_texture: wgpu::SurfaceTexture,
    encoder: wgpu::CommandEncoder,
    pass: wgpu::RenderPass<'static>,
    next_offset: u64,
}

/// GPU implementation of the render backend on top of a window surface.
///
/// The GL-style named-uniform surface is bridged by staging one uniform
/// block on the CPU and uploading it at a fresh dynamic offset for every
/// draw, so each draw in the frame keeps the uniform values it was issued
/// with. Texture units are a bind-group rebuild away; the group is rebuilt
/// lazily when the unit stack changed since the previous draw.
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    depth_view: wgpu::TextureView,

    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    programs: Vec<GpuProgram>,
    active_program: Option<usize>,

    staging: [u8; UNIFORM_BLOCK_SIZE as usize],
    shadow: HashMap<String, UniformValue>,
    uniform_buffer: wgpu::Buffer,

    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    dummy_2d: wgpu::TextureView,
    dummy_normal: wgpu::TextureView,
    dummy_cube: wgpu::TextureView,

    /// Bound texture units, innermost last. The innermost binding for a
    /// sampler name wins when the bind group is built.
    texture_stack: Vec<(String, TextureHandle)>,
    bind_group: Option<wgpu::BindGroup>,
    bindings_dirty: bool,

    polygon_offset: Option<(f32, f32)>,

    frame: Option<FrameState>,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("could not create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;

        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("could not create device")?;

        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .context("surface is incompatible with the adapter")?;
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, config.width, config.height);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Per-draw uniforms"),
            size: UNIFORM_BUFFER_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = create_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = Image::solid(1.0, 1.0, 1.0);
        let dummy_2d = upload_2d_texture(
            &device,
            &queue,
            &white,
            "Dummy 2D",
            wgpu::TextureFormat::Rgba8UnormSrgb,
        );
        // Normal maps carry vectors, not colors, so the flat fallback must
        // stay in a linear format or (0.5, 0.5, 1.0) decodes tilted.
        let flat_normal = Image::solid(0.5, 0.5, 1.0);
        let dummy_normal = upload_2d_texture(
            &device,
            &queue,
            &flat_normal,
            "Dummy normal",
            wgpu::TextureFormat::Rgba8Unorm,
        );
        let dummy_cube = upload_cube_texture(
            &device,
            &queue,
            &[&white, &white, &white, &white, &white, &white],
            "Dummy cube",
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            meshes: Vec::new(),
            textures: Vec::new(),
            programs: Vec::new(),
            active_program: None,
            staging: [0; UNIFORM_BLOCK_SIZE as usize],
            shadow: HashMap::new(),
            uniform_buffer,
            bind_group_layout,
            pipeline_layout,
            sampler,
            dummy_2d,
            dummy_normal,
            dummy_cube,
            texture_stack: Vec::new(),
            bind_group: None,
            bindings_dirty: true,
            polygon_offset: None,
            frame: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, width, height);
    }

    fn resolve_binding(&self, name: &str) -> Option<&GpuTexture> {
        self.texture_stack
            .iter()
            .rev()
            .find(|(sampler, _)| sampler == name)
            .and_then(|(_, handle)| self.textures.get(handle.0 as usize))
    }

    fn build_bind_group(&self) -> wgpu::BindGroup {
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &self.uniform_buffer,
                offset: 0,
                size: wgpu::BufferSize::new(UNIFORM_BLOCK_SIZE),
            }),
        }];

        for &(name, texture_binding, sampler_binding) in SAMPLER_SLOTS {
            let is_cube_slot = name == "envMap";
            let view = match self.resolve_binding(name) {
                Some(texture) if texture.is_cube == is_cube_slot => &texture.view,
                _ if is_cube_slot => &self.dummy_cube,
                _ if name == "normal" => &self.dummy_normal,
                _ => &self.dummy_2d,
            };
            entries.push(wgpu::BindGroupEntry {
                binding: texture_binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: sampler_binding,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });
        }

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }
}

impl RenderBackend for WgpuBackend {
    fn create_program(&mut self, source: &str) -> Result<ProgramHandle> {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Scene shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        self.programs.push(GpuProgram {
            module,
            pipelines: HashMap::new(),
        });
        Ok(ProgramHandle(self.programs.len() as u64 - 1))
    }

    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<MeshHandle> {
        ensure!(!indices.is_empty(), "mesh has no indices");

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh vertices"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.meshes.push(GpuMesh {
            vertices: vertex_buffer,
            indices: index_buffer,
            index_count: indices.len() as u32,
        });
        Ok(MeshHandle(self.meshes.len() as u64 - 1))
    }

    fn create_texture(&mut self, image: &Image) -> Result<TextureHandle> {
        let view = upload_2d_texture(
            &self.device,
            &self.queue,
            image,
            "Scene texture",
            wgpu::TextureFormat::Rgba8UnormSrgb,
        );
        self.textures.push(GpuTexture {
            view,
            is_cube: false,
        });
        Ok(TextureHandle(self.textures.len() as u64 - 1))
    }

    fn create_cube_texture(&mut self, faces: &[Image; 6]) -> Result<TextureHandle> {
        let (w, h) = (faces[0].width(), faces[0].height());
        ensure!(
            faces.iter().all(|f| f.width() == w && f.height() == h),
            "cube faces differ in size"
        );

        let refs = [
            &faces[0], &faces[1], &faces[2], &faces[3], &faces[4], &faces[5],
        ];
        let view = upload_cube_texture(&self.device, &self.queue, &refs, "Scene cube texture");
        self.textures.push(GpuTexture {
            view,
            is_cube: true,
        });
        Ok(TextureHandle(self.textures.len() as u64 - 1))
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        ensure!(
            (program.0 as usize) < self.programs.len(),
            "unknown program handle {}",
            program.0
        );
        self.active_program = Some(program.0 as usize);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(&(_, offset, size)) = UNIFORM_LAYOUT.iter().find(|(n, _, _)| *n == name) else {
            log::debug!("ignoring write to undeclared uniform {name}");
            return;
        };

        let offset = offset as usize;
        let size = size as usize;
        match &value {
            UniformValue::Int(i) => {
                self.staging[offset..offset + 4].copy_from_slice(&i.to_le_bytes());
            }
            UniformValue::Float(f) => {
                self.staging[offset..offset + 4].copy_from_slice(&f.to_le_bytes());
            }
            UniformValue::Vec3(v) => {
                self.staging[offset..offset + 12].copy_from_slice(bytemuck::bytes_of(v));
            }
            UniformValue::Vec4(v) => {
                self.staging[offset..offset + 16].copy_from_slice(bytemuck::bytes_of(v));
            }
            UniformValue::Mat4(m) => {
                self.staging[offset..offset + 64].copy_from_slice(bytemuck::bytes_of(m));
            }
            UniformValue::Vec4Array(vs) => {
                let n = vs.len().min(size / 16);
                self.staging[offset..offset + n * 16]
                    .copy_from_slice(bytemuck::cast_slice(&vs[..n]));
            }
        }
        self.shadow.insert(name.to_owned(), value);
    }

    fn get_uniform(&self, name: &str) -> Option<UniformValue> {
        self.shadow.get(name).cloned()
    }

    fn clear_uniform(&mut self, name: &str) {
        if self.shadow.remove(name).is_none() {
            return;
        }
        if let Some(&(_, offset, size)) = UNIFORM_LAYOUT.iter().find(|(n, _, _)| *n == name) {
            let (offset, size) = (offset as usize, size as usize);
            self.staging[offset..offset + size].fill(0);
        }
    }

    fn bind_texture(&mut self, sampler: &str, texture: TextureHandle) -> Result<u32> {
        ensure!(
            SAMPLER_SLOTS.iter().any(|(name, _, _)| *name == sampler),
            "unknown sampler {sampler}"
        );
        ensure!(
            (texture.0 as usize) < self.textures.len(),
            "unknown texture handle {}",
            texture.0
        );
        ensure!(
            self.texture_stack.len() < MAX_TEXTURE_UNITS,
            "out of texture units ({MAX_TEXTURE_UNITS} in use)"
        );

        self.texture_stack.push((sampler.to_owned(), texture));
        self.bindings_dirty = true;
        Ok(self.texture_stack.len() as u32 - 1)
    }

    fn unbind_texture(&mut self) {
        if self.texture_stack.pop().is_none() {
            log::warn!("unbind_texture with no bound texture");
        }
        self.bindings_dirty = true;
    }

    fn set_polygon_offset(&mut self, bias: Option<(f32, f32)>) {
        self.polygon_offset = bias;
    }

    fn draw(&mut self, mesh: MeshHandle) -> Result<()> {
        let program_idx = self
            .active_program
            .context("draw without an active program")?;
        let mesh = self
            .meshes
            .get(mesh.0 as usize)
            .with_context(|| format!("unknown mesh handle {}", mesh.0))?;

        if self.bindings_dirty || self.bind_group.is_none() {
            self.bind_group = Some(self.build_bind_group());
            self.bindings_dirty = false;
        }
        let bind_group = self
            .bind_group
            .as_ref()
            .context("bind group was not built")?;

        let frame = self
            .frame
            .as_mut()
            .context("draw outside begin_frame/end_frame")?;
        ensure!(
            frame.next_offset + UNIFORM_BLOCK_SIZE <= UNIFORM_BUFFER_SIZE,
            "more than {MAX_DRAWS_PER_FRAME} draws in one frame"
        );

        // A fresh offset per draw; the writes all land before the frame's
        // command buffer is submitted, so earlier draws keep their values.
        self.queue
            .write_buffer(&self.uniform_buffer, frame.next_offset, &self.staging);

        let bias = self.polygon_offset;
        let bias_key = bias.map(|(factor, units)| (factor.to_bits(), units.to_bits()));
        let GpuProgram { module, pipelines } = &mut self.programs[program_idx];
        let device = &self.device;
        let pipeline_layout = &self.pipeline_layout;
        let format = self.config.format;
        let pipeline = pipelines
            .entry(bias_key)
            .or_insert_with(|| create_pipeline(device, pipeline_layout, module, format, bias));

        frame.pass.set_pipeline(pipeline);
        frame
            .pass
            .set_bind_group(0, bind_group, &[frame.next_offset as u32]);
        frame.pass.set_vertex_buffer(0, mesh.vertices.slice(..));
        frame
            .pass
            .set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        frame.pass.draw_indexed(0..mesh.index_count, 0, 0..1);

        frame.next_offset += UNIFORM_BLOCK_SIZE;
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<()> {
        ensure!(self.frame.is_none(), "begin_frame while a frame is open");

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .context("surface stayed unavailable after reconfigure")?
            }
            Err(e) => return Err(e).context("could not acquire surface texture"),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame encoder"),
            });

        let pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.06,
                            g: 0.06,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();

        self.frame = Some(FrameState {
            surface_texture,
            encoder,
            pass,
            next_offset: 0,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        let frame = self.frame.take().context("end_frame without begin_frame")?;

        // The pass borrows the encoder; it has to go first.
        drop(frame.pass);
        self.queue.submit([frame.encoder.finish()]);
        frame.surface_texture.present();
        Ok(())
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: wgpu::BufferSize::new(UNIFORM_BLOCK_SIZE),
        },
        count: None,
    }];

    for &(name, texture_binding, sampler_binding) in SAMPLER_SLOTS {
        let view_dimension = if name == "envMap" {
            wgpu::TextureViewDimension::Cube
        } else {
            wgpu::TextureViewDimension::D2
        };
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: texture_binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension,
                multisampled: false,
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: sampler_binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Scene bind group layout"),
        entries: &entries,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    bias: Option<(f32, f32)>,
) -> wgpu::RenderPipeline {
    // GL-style polygon offset maps onto the pipeline's depth bias: units to
    // the constant term, factor to the slope scale.
    let depth_bias = match bias {
        Some((factor, units)) => wgpu::DepthBiasState {
            constant: units as i32,
            slope_scale: factor,
            clamp: 0.0,
        },
        None => wgpu::DepthBiasState::default(),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRS,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Thin shapes (disks, the table page) are visible from both
            // sides.
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: depth_bias,
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn upload_2d_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &Image,
    label: &str,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    write_texture_layer(queue, &texture, image, 0);
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn upload_cube_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    faces: &[&Image; 6],
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: faces[0].width(),
            height: faces[0].height(),
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (layer, face) in faces.iter().enumerate() {
        write_texture_layer(queue, &texture, face, layer as u32);
    }

    texture.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

fn write_texture_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &Image, layer: u32) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        &image.to_rgba(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
    );
}
