/// Lit "standard" material: Lambert diffuse plus GGX specular from point
/// lights, ambient fill, normal mapping and an emissive term.
pub const STANDARD_SHADER: &str = r#"
const PI: f32 = 3.14159265;
const MAX_POINT_LIGHTS: u32 = 4u;

struct PointLight {
    position_range: vec4<f32>,
    color_decay: vec4<f32>,
};

struct Globals {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_count: vec4<u32>,
    lights: array<PointLight, 4>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    emissive: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;
@group(1) @binding(0) var<uniform> object: Object;
@group(2) @binding(0) var color_map: texture_2d<f32>;
@group(2) @binding(1) var normal_map: texture_2d<f32>;
@group(2) @binding(2) var emissive_map: texture_2d<f32>;
@group(2) @binding(3) var material_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) world_tangent: vec4<f32>,
    @location(3) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = object.model * vec4<f32>(vertex.position, 1.0);
    let tangent = (object.model * vec4<f32>(vertex.tangent.xyz, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize((object.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.world_tangent = vec4<f32>(tangent, vertex.tangent.w);
    // Image rows are stored top first; v = 1 is the top edge.
    out.uv = vec2<f32>(vertex.uv.x, 1.0 - vertex.uv.y);
    return out;
}

fn distance_attenuation(d: f32, range: f32, decay: f32) -> f32 {
    var falloff = 1.0 / max(pow(d, decay), 0.01);
    if (range > 0.0) {
        let window = saturate(1.0 - pow(d / range, 4.0));
        falloff = falloff * window * window;
    }
    return falloff;
}

fn specular_ggx(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>, f0: vec3<f32>, roughness: f32) -> vec3<f32> {
    let h = normalize(l + v);
    let ndl = saturate(dot(n, l));
    let ndv = saturate(dot(n, v));
    let ndh = saturate(dot(n, h));
    let vdh = saturate(dot(v, h));

    let fresnel = f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - vdh, 5.0);
    let alpha = roughness * roughness;
    let a2 = alpha * alpha;
    let gv = ndl * sqrt(a2 + (1.0 - a2) * ndv * ndv);
    let gl = ndv * sqrt(a2 + (1.0 - a2) * ndl * ndl);
    let visibility = 0.5 / max(gv + gl, 1e-6);
    let denom = ndh * ndh * (a2 - 1.0) + 1.0;
    let distribution = a2 / (PI * denom * denom);
    return fresnel * visibility * distribution;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(color_map, material_sampler, in.uv).rgb * object.color.rgb;
    let tangent_normal = textureSample(normal_map, material_sampler, in.uv).xyz * 2.0 - 1.0;
    let emissive_texel = textureSample(emissive_map, material_sampler, in.uv).rgb;

    let geometric = normalize(in.world_normal);
    let t = normalize(in.world_tangent.xyz - geometric * dot(geometric, in.world_tangent.xyz));
    let b = cross(geometric, t) * in.world_tangent.w;
    let scaled = vec3<f32>(tangent_normal.xy * object.params.zw, tangent_normal.z);
    let n = normalize(mat3x3<f32>(t, b, geometric) * scaled);
    let v = normalize(globals.camera_position.xyz - in.world_position);

    let roughness = clamp(object.params.x, 0.0525, 1.0);
    let metalness = saturate(object.params.y);
    let diffuse_color = albedo * (1.0 - metalness);
    let f0 = mix(vec3<f32>(0.04), albedo, metalness);

    var radiance = globals.ambient.rgb * diffuse_color / PI;
    let count = min(globals.light_count.x, MAX_POINT_LIGHTS);
    for (var i = 0u; i < count; i = i + 1u) {
        let light = globals.lights[i];
        let to_light = light.position_range.xyz - in.world_position;
        let d = length(to_light);
        let l = to_light / max(d, 1e-6);
        let attenuation = distance_attenuation(d, light.position_range.w, light.color_decay.w);
        let irradiance = light.color_decay.rgb * attenuation * saturate(dot(n, l));
        radiance = radiance + irradiance * (diffuse_color / PI + specular_ggx(n, l, v, f0, roughness));
    }

    let emissive = object.emissive.rgb * emissive_texel;
    return vec4<f32>(radiance + emissive, 1.0);
}
"#;

/// Unlit line drawing for light helpers.
pub const HELPER_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;
@group(1) @binding(0) var<uniform> object: Object;

@vertex
fn vs_helper(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.view_proj * object.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_helper() -> @location(0) vec4<f32> {
    return object.color;
}
"#;

/// Full-screen background image, stretched to the viewport.
pub const BACKGROUND_SHADER: &str = r#"
@group(0) @binding(0) var background: texture_2d<f32>;
@group(0) @binding(1) var background_sampler: sampler;

struct BackgroundOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_background(@builtin(vertex_index) index: u32) -> BackgroundOutput {
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: BackgroundOutput;
    out.clip_position = vec4<f32>(corner * 2.0 - 1.0, 1.0, 1.0);
    out.uv = vec2<f32>(corner.x, 1.0 - corner.y);
    return out;
}

@fragment
fn fs_background(in: BackgroundOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(background, background_sampler, in.uv).rgb, 1.0);
}
"#;
