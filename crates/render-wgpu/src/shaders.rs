/// Lit, textured cube ring. Instances are fetched through the visible-index
/// list, so `instance_index` counts surviving instances only.
pub const OPAQUE_SHADER: &str = r#"
struct SceneConstants {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_count: vec4<u32>,
    light_positions: array<vec4<f32>, 5>,
    light_colors: array<vec4<f32>, 5>,
    ambient: vec4<f32>,
};

struct Instance {
    world: mat4x4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> scene: SceneConstants;
@group(0) @binding(1) var<storage, read> instances: array<Instance>;
@group(0) @binding(2) var<storage, read> visible: array<u32>;
@group(0) @binding(3) var cube_texture: texture_2d<f32>;
@group(0) @binding(4) var cube_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) @interpolate(flat) params: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, @builtin(instance_index) slot: u32) -> VertexOutput {
    let inst = instances[visible[slot]];
    let world_pos = inst.world * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = (inst.world * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    out.params = inst.params;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Sampled unconditionally: derivatives need uniform control flow.
    let texel = textureSample(cube_texture, cube_sampler, in.uv).rgb;
    let base = select(texel, vec3<f32>(0.75, 0.75, 0.78), in.params.y > 0.5);

    let n = normalize(in.world_normal);
    let v = normalize(scene.camera_pos.xyz - in.world_pos);
    var color = scene.ambient.rgb * base;

    let count = min(scene.light_count.x, 5u);
    for (var i = 0u; i < count; i = i + 1u) {
        let to_light = scene.light_positions[i].xyz - in.world_pos;
        let dist2 = max(dot(to_light, to_light), 0.0001);
        let l = to_light * inverseSqrt(dist2);
        let attenuation = 1.0 / (1.0 + 0.02 * dist2);
        let diffuse = max(dot(n, l), 0.0);
        let h = normalize(l + v);
        let specular = pow(max(dot(n, h), 0.0), in.params.x);
        color += scene.light_colors[i].rgb * (base * diffuse + vec3<f32>(0.4) * specular) * attenuation;
    }

    return vec4<f32>(color, 1.0);
}
"#;

/// Cubemap sphere kept on the far plane.
pub const SKY_SHADER: &str = r#"
struct SkyUniforms {
    view_proj: mat4x4<f32>,
    world: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // x: clip depth of the far plane
    params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> sky: SkyUniforms;
@group(0) @binding(1) var sky_texture: texture_cube<f32>;
@group(0) @binding(2) var sky_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> VertexOutput {
    let world_pos = sky.world * vec4<f32>(position, 1.0);
    var clip = sky.view_proj * world_pos;
    clip.z = sky.params.x * clip.w;

    var out: VertexOutput;
    out.clip_position = clip;
    out.direction = world_pos.xyz - sky.camera_pos.xyz;
    return out;
}

@fragment
fn fs_sky(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(sky_texture, sky_sampler, normalize(in.direction));
    return vec4<f32>(color.rgb, 1.0);
}
"#;

/// Flat-colored quads; the instance index picks the quad.
pub const TRANSPARENT_SHADER: &str = r#"
struct Quad {
    world: mat4x4<f32>,
    color: vec4<f32>,
};

struct TransparentUniforms {
    view_proj: mat4x4<f32>,
    quads: array<Quad, 2>,
};

@group(0) @binding(0) var<uniform> uniforms: TransparentUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) @interpolate(flat) color: vec4<f32>,
};

@vertex
fn vs_quad(@location(0) position: vec3<f32>, @builtin(instance_index) quad: u32) -> VertexOutput {
    let q = uniforms.quads[quad];
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * q.world * vec4<f32>(position, 1.0);
    out.color = q.color;
    return out;
}

@fragment
fn fs_quad(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Full-screen triangle generated from the vertex index, no vertex buffer.
pub const POSTPROC_SHADER: &str = r#"
@group(0) @binding(0) var source_texture: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: VertexOutput;
    out.clip_position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(source_texture, source_sampler, in.uv);
}
"#;
