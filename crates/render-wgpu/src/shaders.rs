/// WGSL port of the scene's lighting shader: hemisphere ambient, a
/// smoothstep-attenuated point light in view space, Blinn-Phong specular,
/// a screen-height fog gradient, and manual gamma 2.2 at both ends.
///
/// The uniform block is the external shading contract: projection,
/// model-view, normal matrix (inverse-transpose of the model-view upper
/// 3×3), ambient color, view-space light position, light color, and
/// viewport size. Lighting happens entirely in view space, so the light
/// rides with the camera's view transform.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    projection: mat4x4<f32>,
    model_view: mat4x4<f32>,
    normal_matrix: mat3x3<f32>,
    ambient_color: vec3<f32>,
    light_position: vec3<f32>,
    light_color: vec3<f32>,
    viewport: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let view_position = uniforms.model_view * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.projection * view_position;
    out.view_position = view_position.xyz;
    out.view_normal = uniforms.normal_matrix * vertex.normal;
    out.color = vertex.color;
    return out;
}

const GAMMA: f32 = 2.2;
const GROUND_COLOR: vec3<f32> = vec3<f32>(0.173, 0.180, 0.301);
const SKY_COLOR: vec3<f32> = vec3<f32>(0.411, 0.279, 0.236);
const LIGHT_INNER_RADIUS: f32 = 4.0;
const LIGHT_OUTER_RADIUS: f32 = 5.0;
const SPECULAR_EXPONENT: f32 = 50.0;

@fragment
fn fs_main(
    in: VertexOutput,
    @builtin(front_facing) front_facing: bool,
) -> @location(0) vec4<f32> {
    // Work in linear light; inputs are authored in gamma space.
    var diffuse_color = pow(in.color.rgb, vec3<f32>(GAMMA));
    let light_color = pow(uniforms.light_color, vec3<f32>(GAMMA));
    let ground_color = pow(GROUND_COLOR, vec3<f32>(GAMMA));
    let sky_color = pow(SKY_COLOR, vec3<f32>(GAMMA));

    let light_direction = normalize(uniforms.light_position - in.view_position);
    let eye_direction = -normalize(in.view_position);
    let half_vector = normalize(light_direction + eye_direction);

    var surface_normal = normalize(in.view_normal);
    if (!front_facing) {
        surface_normal = -surface_normal;
    }

    // Hemisphere ambient: blend ground and sky by how much the surface
    // faces up.
    let hemisphere = mix(
        ground_color,
        sky_color,
        0.5 * (1.0 + dot(surface_normal, vec3<f32>(0.0, 1.0, 0.0))),
    );

    let diffuse_intensity = max(dot(surface_normal, light_direction), 0.0);
    let light_distance = length(in.view_position - uniforms.light_position);
    let attenuation =
        (1.0 - smoothstep(LIGHT_INNER_RADIUS, LIGHT_OUTER_RADIUS, light_distance)) * 3.0;

    let ambient = diffuse_color * hemisphere;
    var diffuse = diffuse_color * light_color * diffuse_intensity;
    var specular = vec3<f32>(0.0);
    if (diffuse_intensity > 0.0) {
        let specular_intensity = max(dot(surface_normal, half_vector), 0.0);
        specular = light_color * pow(specular_intensity, SPECULAR_EXPONENT);
    }
    diffuse = attenuation * diffuse;
    specular = attenuation * specular;

    let lit = vec4<f32>(ambient + diffuse + specular, 1.0);

    // Fog fades distant fragments toward a vertical screen gradient.
    // Framebuffer y grows downward here, so flip to keep ground at the
    // bottom.
    let screen_height = 1.0 - in.clip_position.y / uniforms.viewport.y;
    let fog_color = vec4<f32>(mix(ground_color, sky_color, screen_height), 1.0);
    let fog = smoothstep(5.0, 10.0, abs(in.view_position.z));

    var final_color = mix(lit, fog_color, fog);
    final_color = vec4<f32>(pow(final_color.rgb, vec3<f32>(1.0 / GAMMA)), final_color.a);
    return final_color;
}
"#;
