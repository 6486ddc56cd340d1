/// WGSL shader for every lit surface: instanced unit cubes and model meshes.
///
/// Lighting is a sky/ground hemisphere term plus one directional light,
/// followed by linear distance fog.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // rgb + intensity in w
    sky_color: vec4<f32>,
    ground_color: vec4<f32>,
    // rgb + intensity in w
    sun_color: vec4<f32>,
    sun_dir: vec4<f32>,
    fog_color: vec4<f32>,
    // x = near, y = far
    fog_range: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);

    let sky_weight = n.y * 0.5 + 0.5;
    let hemi = mix(uniforms.ground_color.rgb, uniforms.sky_color.rgb, sky_weight)
        * uniforms.sky_color.w;
    let sun = max(dot(n, normalize(uniforms.sun_dir.xyz)), 0.0)
        * uniforms.sun_color.rgb * uniforms.sun_color.w;
    let lit = in.color.rgb * (hemi + sun);

    let dist = length(in.world_pos - uniforms.camera_pos.xyz);
    let span = max(uniforms.fog_range.y - uniforms.fog_range.x, 0.00001);
    let fog = clamp((dist - uniforms.fog_range.x) / span, 0.0, 1.0);

    return vec4<f32>(mix(lit, uniforms.fog_color.rgb, fog), in.color.a);
}
"#;
