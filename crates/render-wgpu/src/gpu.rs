use crate::shaders;
use crate::uniforms::{Globals, ObjectUniform, pack_globals, pack_helper, pack_object};
use moonfield_common::{ObjectId, TextureImage};
use moonfield_render::Renderer;
use moonfield_scene::{Geometry, ObjectKind, PerspectiveCamera, Scene, TextureHandle, Vertex};
use std::collections::{HashMap, HashSet};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// How a texture's bytes are interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ColorSpace {
    /// Color data, decoded from sRGB on sampling.
    Srgb,
    /// Data textures such as normal maps.
    Linear,
}

impl ColorSpace {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A texture slot as the GPU sees it: which loaded texture version, or the
/// fallback when the slot is empty or still loading.
type SlotKey = Option<(TextureHandle, u32)>;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    edge_buffer: Option<(wgpu::Buffer, u32)>,
    edges: Vec<u32>,
}

struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuTexture {
    version: u32,
    view: wgpu::TextureView,
}

struct DrawItem {
    mesh_key: String,
    object: ObjectId,
    material: [SlotKey; 3],
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes: u32,
    pub helpers: u32,
    pub background: bool,
    pub textures_uploaded: u32,
}

/// wgpu scene renderer: background image, lit meshes, light helpers.
pub struct WgpuRenderer {
    standard_pipeline: wgpu::RenderPipeline,
    helper_pipeline: wgpu::RenderPipeline,
    background_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    background_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white_texture: wgpu::TextureView,
    flat_normal_texture: wgpu::TextureView,
    meshes: HashMap<String, GpuMesh>,
    objects: HashMap<ObjectId, ObjectSlot>,
    helpers: HashMap<ObjectId, ObjectSlot>,
    textures: HashMap<(TextureHandle, ColorSpace), GpuTexture>,
    material_groups: HashMap<[SlotKey; 3], wgpu::BindGroup>,
    /// Textures skipped for exceeding the device limit, warned once each.
    oversized: HashSet<(TextureHandle, u32)>,
    background_group: Option<((TextureHandle, u32), wgpu::BindGroup)>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    warned_light_overflow: bool,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[uniform_entry],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry],
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
        });
        let background_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("background_bind_group_layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let depth_state = |write: bool, compare: wgpu::CompareFunction| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: write,
            depth_compare: compare,
            stencil: Default::default(),
            bias: Default::default(),
        };
        let color_target = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // Standard pipeline
        let standard_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("standard_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::STANDARD_SHADER.into()),
        });
        let standard_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("standard_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let standard_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("standard_pipeline"),
            layout: Some(&standard_layout),
            vertex: wgpu::VertexState {
                module: &standard_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                        3 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &standard_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Helper pipeline
        let helper_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("helper_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::HELPER_SHADER.into()),
        });
        let helper_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("helper_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let helper_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("helper_pipeline"),
            layout: Some(&helper_layout),
            vertex: wgpu::VertexState {
                module: &helper_shader,
                entry_point: Some("vs_helper"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &helper_shader,
                entry_point: Some("fs_helper"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Background pipeline
        let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("background_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BACKGROUND_SHADER.into()),
        });
        let background_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("background_pipeline_layout"),
                bind_group_layouts: &[&background_layout],
                push_constant_ranges: &[],
            });
        let background_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("background_pipeline"),
            layout: Some(&background_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &background_shader,
                entry_point: Some("vs_background"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &background_shader,
                entry_point: Some("fs_background"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Always)),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_texture = upload_texture(
            device,
            queue,
            "white_texture",
            &TextureImage::solid([255, 255, 255, 255]),
            ColorSpace::Srgb,
        );
        let flat_normal_texture = upload_texture(
            device,
            queue,
            "flat_normal_texture",
            &TextureImage::solid([128, 128, 255, 255]),
            ColorSpace::Linear,
        );

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            standard_pipeline,
            helper_pipeline,
            background_pipeline,
            globals_buffer,
            globals_bind_group,
            object_layout,
            material_layout,
            background_layout,
            sampler,
            white_texture,
            flat_normal_texture,
            meshes: HashMap::new(),
            objects: HashMap::new(),
            helpers: HashMap::new(),
            textures: HashMap::new(),
            material_groups: HashMap::new(),
            oversized: HashSet::new(),
            background_group: None,
            depth_texture,
            surface_format,
            warned_light_overflow: false,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: background, lit meshes, then light helpers.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> FrameStats {
        let mut stats = FrameStats::default();

        let (globals, dropped) = pack_globals(scene, camera);
        if dropped > 0 && !self.warned_light_overflow {
            tracing::warn!(dropped, "scene has more point lights than the shader supports");
            self.warned_light_overflow = true;
        }
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        // Prepare GPU resources, then record the pass with shared borrows only.
        let mut draws = Vec::new();
        for (id, object, mesh) in scene.meshes() {
            let mesh_key = self.ensure_mesh(device, &mesh.geometry);
            let uniform = pack_object(&object.transform, &mesh.material);
            Self::write_slot(&mut self.objects, device, queue, &self.object_layout, id, &uniform);

            let [map, normal, emissive] = mesh.material.texture_slots();
            let material = [
                self.ensure_texture(device, queue, scene, map, ColorSpace::Srgb, &mut stats),
                self.ensure_texture(device, queue, scene, normal, ColorSpace::Linear, &mut stats),
                self.ensure_texture(device, queue, scene, emissive, ColorSpace::Srgb, &mut stats),
            ];
            self.ensure_material_group(device, material);
            draws.push(DrawItem {
                mesh_key,
                object: id,
                material,
            });
        }

        let mut helper_draws = Vec::new();
        for (id, object) in scene.objects() {
            let ObjectKind::PointLightHelper(helper) = &object.kind else {
                continue;
            };
            let Some(light) = scene.get(helper.light) else {
                continue;
            };
            // The marker geometry already has the helper's radius.
            let mesh_key = self.ensure_mesh(device, &Geometry::from(helper.geometry()));
            self.ensure_edges(device, &mesh_key);
            let uniform = pack_helper(light.transform.position, 1.0, helper.color);
            Self::write_slot(&mut self.helpers, device, queue, &self.object_layout, id, &uniform);
            helper_draws.push((mesh_key, id));
        }

        let background = self.ensure_background(device, queue, scene, &mut stats);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if background {
                if let Some((_, group)) = &self.background_group {
                    pass.set_pipeline(&self.background_pipeline);
                    pass.set_bind_group(0, group, &[]);
                    pass.draw(0..3, 0..1);
                    stats.background = true;
                }
            }

            pass.set_pipeline(&self.standard_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for draw in &draws {
                let (Some(mesh), Some(slot), Some(material)) = (
                    self.meshes.get(&draw.mesh_key),
                    self.objects.get(&draw.object),
                    self.material_groups.get(&draw.material),
                ) else {
                    continue;
                };
                pass.set_bind_group(1, &slot.bind_group, &[]);
                pass.set_bind_group(2, material, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                stats.meshes += 1;
            }

            pass.set_pipeline(&self.helper_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (mesh_key, id) in &helper_draws {
                let (Some(mesh), Some(slot)) = (self.meshes.get(mesh_key), self.helpers.get(id))
                else {
                    continue;
                };
                let Some((edges, edge_count)) = &mesh.edge_buffer else {
                    continue;
                };
                pass.set_bind_group(1, &slot.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(edges.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..*edge_count, 0, 0..1);
                stats.helpers += 1;
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        stats
    }

    /// Upload a geometry the first time it is seen; returns its cache key.
    fn ensure_mesh(&mut self, device: &wgpu::Device, geometry: &Geometry) -> String {
        let key = geometry.cache_key();
        if !self.meshes.contains_key(&key) {
            let data = geometry.build();
            tracing::debug!(
                key = %key,
                vertices = data.vertices.len(),
                triangles = data.triangle_count(),
                "uploading mesh"
            );
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.meshes.insert(
                key.clone(),
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: data.indices.len() as u32,
                    edge_buffer: None,
                    edges: data.edge_indices(),
                },
            );
        }
        key
    }

    fn ensure_edges(&mut self, device: &wgpu::Device, key: &str) {
        let Some(mesh) = self.meshes.get_mut(key) else {
            return;
        };
        if mesh.edge_buffer.is_none() && !mesh.edges.is_empty() {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_edge_buffer"),
                contents: bytemuck::cast_slice(&mesh.edges),
                usage: wgpu::BufferUsages::INDEX,
            });
            mesh.edge_buffer = Some((buffer, mesh.edges.len() as u32));
        }
    }

    fn write_slot(
        slots: &mut HashMap<ObjectId, ObjectSlot>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        id: ObjectId,
        uniform: &ObjectUniform,
    ) {
        let slot = slots.entry(id).or_insert_with(|| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("object_buffer"),
                size: std::mem::size_of::<ObjectUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("object_bind_group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            ObjectSlot { buffer, bind_group }
        });
        queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Make sure a ready texture is on the GPU at its current version.
    /// Empty, pending and failed slots map to `None` (fallback texture).
    fn ensure_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        slot: Option<TextureHandle>,
        space: ColorSpace,
        stats: &mut FrameStats,
    ) -> SlotKey {
        let handle = slot?;
        let texture = scene.texture(handle)?;
        let image = texture.image()?;
        let max = device.limits().max_texture_dimension_2d;
        if image.width > max || image.height > max {
            if self.oversized.insert((handle, texture.version)) {
                tracing::warn!(
                    handle = handle.0,
                    source = %texture.source.display(),
                    width = image.width,
                    height = image.height,
                    max,
                    "texture exceeds device limit, drawing untextured"
                );
            }
            return None;
        }
        let current = self
            .textures
            .get(&(handle, space))
            .is_some_and(|gpu| gpu.version == texture.version);
        if !current {
            tracing::debug!(
                handle = handle.0,
                source = %texture.source.display(),
                width = image.width,
                height = image.height,
                ?space,
                "uploading texture"
            );
            let view = upload_texture(device, queue, "scene_texture", image, space);
            prune_stale_groups(&mut self.material_groups, handle, texture.version);
            self.textures.insert(
                (handle, space),
                GpuTexture {
                    version: texture.version,
                    view,
                },
            );
            stats.textures_uploaded += 1;
        }
        Some((handle, texture.version))
    }

    fn ensure_material_group(&mut self, device: &wgpu::Device, key: [SlotKey; 3]) {
        if self.material_groups.contains_key(&key) {
            return;
        }
        let spaces = [ColorSpace::Srgb, ColorSpace::Linear, ColorSpace::Srgb];
        let fallbacks = [
            &self.white_texture,
            &self.flat_normal_texture,
            &self.white_texture,
        ];
        let views: Vec<&wgpu::TextureView> = key
            .iter()
            .zip(spaces)
            .zip(fallbacks)
            .map(|((slot, space), fallback)| {
                slot.and_then(|(handle, _)| self.textures.get(&(handle, space)))
                    .map(|gpu| &gpu.view)
                    .unwrap_or(fallback)
            })
            .collect();
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material_bind_group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(views[1]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(views[2]),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.material_groups.insert(key, group);
    }

    /// True when a background image is ready to draw.
    fn ensure_background(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        stats: &mut FrameStats,
    ) -> bool {
        let background = scene.background();
        let Some(key) = self.ensure_texture(device, queue, scene, background, ColorSpace::Srgb, stats)
        else {
            return false;
        };
        if matches!(&self.background_group, Some((cached, _)) if *cached == key) {
            return true;
        }
        let Some(gpu) = self.textures.get(&(key.0, ColorSpace::Srgb)) else {
            return false;
        };
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("background_bind_group"),
            layout: &self.background_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&gpu.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.background_group = Some((key, group));
        true
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// Drop cached groups that bind an older version of `handle`.
fn prune_stale_groups<V>(groups: &mut HashMap<[SlotKey; 3], V>, handle: TextureHandle, version: u32) {
    groups.retain(|key, _| {
        !key.iter()
            .flatten()
            .any(|&(h, v)| h == handle && v != version)
    });
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TextureImage,
    space: ColorSpace,
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: space.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    texture.create_view(&Default::default())
}

/// Binds a [`WgpuRenderer`] to one frame's device, queue and target view so
/// it can be driven through the renderer-agnostic [`Renderer`] trait.
pub struct FrameTarget<'a> {
    pub renderer: &'a mut WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for FrameTarget<'_> {
    type Output = FrameStats;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> FrameStats {
        self.renderer
            .render(self.device, self.queue, self.view, scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reupload_prunes_only_stale_groups_of_that_texture() {
        let moon = TextureHandle(1);
        let detail = TextureHandle(2);
        let mut groups: HashMap<[SlotKey; 3], ()> = HashMap::new();
        groups.insert([Some((detail, 1)), Some((detail, 1)), Some((moon, 1))], ());
        groups.insert([Some((detail, 1)), Some((detail, 1)), Some((moon, 2))], ());
        groups.insert([None, None, Some((detail, 1))], ());
        groups.insert([None, None, None], ());

        prune_stale_groups(&mut groups, moon, 2);

        assert_eq!(groups.len(), 3);
        assert!(groups.contains_key(&[Some((detail, 1)), Some((detail, 1)), Some((moon, 2))]));
        assert!(!groups.contains_key(&[Some((detail, 1)), Some((detail, 1)), Some((moon, 1))]));
        assert!(groups.contains_key(&[None, None, None]));
    }
}
