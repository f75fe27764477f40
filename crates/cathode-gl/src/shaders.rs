use cathode_core::ShaderId;

// ── Shared pieces ───────────────────────────────────────────────────

pub const FULLSCREEN_VERTEX: &str = r#"#version 330 core

layout(location = 0) in vec2 a_pos;
layout(location = 1) in vec2 a_uv;

out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_pos, 0.0, 1.0);
}
"#;

/// Prepended to every fragment body below.
pub const FRAGMENT_PRELUDE: &str = r#"#version 330 core

in vec2 v_uv;
out vec4 frag_color;

const float PI = 3.14159265359;
const float TAU = 6.28318530718;
const int SAMPLES_PER_CYCLE = 4;

// Column-major, FCC coefficients.
const mat3 RGB_TO_YIQ = mat3(
    0.299,  0.595716,  0.211456,
    0.587, -0.274453, -0.522591,
    0.114, -0.321263,  0.311135);
const mat3 YIQ_TO_RGB = mat3(
    1.0,        1.0,        1.0,
    0.9562957, -0.2721221, -1.1069890,
    0.6210244, -0.6473806,  1.7046150);

uint wang_hash(uint seed) {
    seed = (seed ^ 61u) ^ (seed >> 16u);
    seed *= 9u;
    seed = seed ^ (seed >> 4u);
    seed *= 0x27d4eb2du;
    seed = seed ^ (seed >> 15u);
    return seed;
}

uint hash2(uint value, uint seed) {
    return wang_hash(value ^ wang_hash(seed));
}

float unit_hash(uint h) {
    return float(h >> 8u) / 16777216.0;
}

ivec2 texel_coord() {
    return ivec2(gl_FragCoord.xy);
}

vec4 fetch(sampler2D s, int x, int y) {
    ivec2 size = textureSize(s, 0);
    return texelFetch(s, clamp(ivec2(x, y), ivec2(0), size - 1), 0);
}

// Out-of-range columns move back by whole carrier periods.
vec4 fetch_in_period(sampler2D s, int x, int y) {
    int width = textureSize(s, 0).x;
    if (x < 0) {
        x += SAMPLES_PER_CYCLE * ((-x + SAMPLES_PER_CYCLE - 1) / SAMPLES_PER_CYCLE);
    }
    if (x >= width) {
        x -= SAMPLES_PER_CYCLE * ((x - width) / SAMPLES_PER_CYCLE + 1);
    }
    return fetch(s, x, y);
}

float carrier_angle(float line_phase, int x) {
    return TAU * fract(line_phase + float(x) / float(SAMPLES_PER_CYCLE));
}
"#;

// ── Passes ──────────────────────────────────────────────────────────

pub const COPY_FRAGMENT: &str = r#"
uniform sampler2D u_input0;

void main() {
    frag_color = texture(u_input0, v_uv);
}
"#;

pub const GENERATE_SIGNAL_FRAGMENT: &str = r#"
uniform sampler2D u_input0;
uniform uint u_signal_width;
uniform uint u_scanline_count;
uniform uint u_input_width;
uniform float u_frame_phase;
uniform float u_prev_frame_phase;
uniform float u_phase_increment_per_line;
uniform int u_composite;
uniform int u_doubled;
uniform float u_chroma_scale;
uniform float u_instability_scale;
uniform uint u_noise_seed;

void main() {
    ivec2 t = texel_coord();

    float u = (float(t.x) + 0.5) / float(u_signal_width);
    if (u_instability_scale > 0.0) {
        float wobble = unit_hash(hash2(uint(t.y), u_noise_seed)) - 0.5;
        u += wobble * u_instability_scale / float(u_input_width);
    }
    float v = (float(t.y) + 0.5) / float(u_scanline_count);

    vec3 yiq = RGB_TO_YIQ * texture(u_input0, vec2(u, v)).rgb;
    float line_offset = float(t.y) * u_phase_increment_per_line;

    float theta_a = carrier_angle(u_frame_phase + line_offset, t.x);
    float chroma_a = u_chroma_scale * (yiq.y * cos(theta_a) + yiq.z * sin(theta_a));

    float chroma_b = 0.0;
    float luma_b = 0.0;
    if (u_doubled != 0) {
        float theta_b = carrier_angle(u_prev_frame_phase + line_offset, t.x);
        chroma_b = u_chroma_scale * (yiq.y * cos(theta_b) + yiq.z * sin(theta_b));
        luma_b = yiq.x;
    }

    if (u_composite != 0) {
        frag_color = vec4(yiq.x + chroma_a, luma_b + chroma_b, 0.0, 0.0);
    } else {
        frag_color = vec4(yiq.x, chroma_a, luma_b, chroma_b);
    }
}
"#;

pub const APPLY_ARTIFACTS_FRAGMENT: &str = r#"
uniform sampler2D u_input0;
uniform uint u_signal_width;
uniform uint u_scanline_count;
uniform float u_ghost_visibility;
uniform float u_ghost_spread_scale;
uniform float u_ghost_distance;
uniform float u_noise_strength;
uniform uint u_noise_seed;
uniform int u_svideo;

void main() {
    ivec2 t = texel_coord();
    vec4 result = fetch(u_input0, t.x, t.y);

    if (u_ghost_visibility > 0.0) {
        float center = u_ghost_distance * float(SAMPLES_PER_CYCLE);
        vec4 sum = vec4(0.0);
        float weight_sum = 0.0;
        for (int tap = -3; tap <= 3; tap++) {
            // pow(0, 0) is undefined in GLSL
            float weight = tap == 0 ? 1.0 : pow(u_ghost_spread_scale, float(abs(tap)));
            float source = float(t.x) - (center + float(tap));
            float left = floor(source);
            vec4 s = mix(fetch(u_input0, int(left), t.y), fetch(u_input0, int(left) + 1, t.y), source - left);
            sum += s * weight;
            weight_sum += weight;
        }
        result += sum * (u_ghost_visibility / weight_sum);
    }

    if (u_noise_strength > 0.0) {
        uint index = uint(t.y) * u_signal_width + uint(t.x);
        uint seed = wang_hash(u_noise_seed);
        int channels = u_svideo != 0 ? 4 : 2;
        for (int c = 0; c < channels; c++) {
            float n = unit_hash(wang_hash((index * 4u + uint(c)) ^ seed)) - 0.5;
            result[c] += n * u_noise_strength;
        }
    }

    frag_color = result;
}
"#;

pub const COMPOSITE_TO_SVIDEO_FRAGMENT: &str = r#"
uniform sampler2D u_input0;
uniform uint u_signal_width;
uniform int u_doubled;

void main() {
    ivec2 t = texel_coord();

    vec2 luma = vec2(0.0);
    for (int tap = -2; tap <= 2; tap++) {
        float weight = abs(tap) == 2 ? 0.125 : 0.25;
        luma += weight * fetch_in_period(u_input0, t.x + tap, t.y).rg;
    }
    vec2 here = fetch(u_input0, t.x, t.y).rg;

    if (u_doubled != 0) {
        frag_color = vec4(luma.x, here.x - luma.x, luma.y, here.y - luma.y);
    } else {
        frag_color = vec4(luma.x, here.x - luma.x, 0.0, 0.0);
    }
}
"#;

pub const SVIDEO_TO_YIQ_FRAGMENT: &str = r#"
uniform sampler2D u_input0;
uniform uint u_signal_width;
uniform uint u_scanline_count;
uniform float u_frame_phase;
uniform float u_prev_frame_phase;
uniform float u_phase_increment_per_line;
uniform float u_tint;
uniform float u_saturation;
uniform float u_brightness;
uniform float u_gamma;
uniform float u_sharpness;
uniform float u_black_level;
uniform float u_white_level;
uniform float u_saturation_scale;
uniform float u_temporal_blend;

vec2 pick(vec4 s, bool second) {
    return second ? s.zw : s.xy;
}

vec3 demodulate(int x, int y, bool second) {
    float base = second ? u_prev_frame_phase : u_frame_phase;
    float line_phase = base + float(y) * u_phase_increment_per_line;

    float luma = pick(fetch(u_input0, x, y), second).x;
    float blurred = 0.0;
    for (int tap = -4; tap <= 4; tap++) {
        blurred += pick(fetch(u_input0, x + tap, y), second).x;
    }
    blurred /= 9.0;
    luma += u_sharpness * (luma - blurred);

    vec2 iq = vec2(0.0);
    for (int tap = -2; tap <= 2; tap++) {
        float weight = abs(tap) == 2 ? 0.125 : 0.25;
        float chroma = pick(fetch_in_period(u_input0, x + tap, y), second).y;
        float theta = carrier_angle(line_phase, x + tap);
        iq += weight * chroma * vec2(cos(theta), sin(theta));
    }
    iq *= 2.0 / u_saturation_scale;

    return vec3(luma, iq);
}

void main() {
    ivec2 t = texel_coord();

    vec3 yiq = demodulate(t.x, t.y, false);
    if (u_temporal_blend > 0.0) {
        yiq = mix(yiq, demodulate(t.x, t.y, true), u_temporal_blend);
    }

    float range = max(u_white_level - u_black_level, 1e-6);
    float luma = pow(max((yiq.x - u_black_level) / range, 0.0), 1.0 / u_gamma) * u_brightness;

    float s = sin(u_tint * PI);
    float c = cos(u_tint * PI);
    vec2 iq = vec2(yiq.y * c - yiq.z * s, yiq.y * s + yiq.z * c);
    iq *= u_saturation * u_brightness / range;

    frag_color = vec4(luma, iq, 1.0);
}
"#;

pub const YIQ_TO_RGB_FRAGMENT: &str = r#"
uniform sampler2D u_input0;

void main() {
    vec3 rgb = YIQ_TO_RGB * texture(u_input0, v_uv).rgb;
    frag_color = vec4(clamp(rgb, 0.0, 1.0), 1.0);
}
"#;

pub const SLOT_MASK_FRAGMENT: &str = r#"
void main() {
    int stripe = int(floor(v_uv.x * 6.0)) % 3;
    float triad = floor(v_uv.x * 2.0);
    float slot = fract(v_uv.y + 0.5 * triad);

    vec3 mask = vec3(0.25);
    if (slot < 0.9) {
        mask[stripe] = 1.0;
    }
    frag_color = vec4(mask, 1.0);
}
"#;

pub const SHADOW_MASK_FRAGMENT: &str = r#"
void main() {
    float row = floor(v_uv.y * 2.0);
    float cell_x = v_uv.x * 3.0 + 1.5 * row;
    int channel = int(floor(cell_x)) % 3;
    vec2 local = vec2(fract(cell_x), fract(v_uv.y * 2.0)) - 0.5;

    vec3 mask = vec3(0.25);
    if (length(local) < 0.45) {
        mask[channel] = 1.0;
    }
    frag_color = vec4(mask, 1.0);
}
"#;

pub const APERTURE_GRILLE_FRAGMENT: &str = r#"
void main() {
    int stripe = int(floor(v_uv.x * 6.0)) % 3;
    vec3 mask = vec3(0.25);
    mask[stripe] = 1.0;
    frag_color = vec4(mask, 1.0);
}
"#;

pub const TONEMAP_FRAGMENT: &str = r#"
uniform sampler2D u_input0;
uniform float u_min_luminosity;
uniform float u_color_power;

void main() {
    vec3 rgb = texture(u_input0, v_uv).rgb;
    frag_color = vec4(pow(max(rgb - u_min_luminosity, vec3(0.0)), vec3(u_color_power)), 1.0);
}
"#;

pub const GAUSSIAN_BLUR_FRAGMENT: &str = r#"
uniform sampler2D u_input0;
uniform vec2 u_direction;

const float WEIGHTS[13] = float[](
    1.0, 12.0, 66.0, 220.0, 495.0, 792.0, 924.0, 792.0, 495.0, 220.0, 66.0, 12.0, 1.0
);

void main() {
    vec3 sum = vec3(0.0);
    for (int i = 0; i < 13; i++) {
        sum += WEIGHTS[i] / 4096.0 * texture(u_input0, v_uv + u_direction * float(i - 6)).rgb;
    }
    frag_color = vec4(sum, 1.0);
}
"#;

pub const RGB_TO_CRT_FRAGMENT: &str = r#"
uniform sampler2D u_input0; // decoded image
uniform sampler2D u_input1; // previous accumulator
uniform sampler2D u_input2; // mask tile
uniform sampler2D u_input3; // diffusion

uniform vec2 u_view_scale;
uniform vec2 u_overscan_scale;
uniform vec2 u_overscan_offset;
uniform vec2 u_distortion;
uniform vec2 u_edge_rounding;
uniform float u_corner_rounding;
uniform vec2 u_mask_uv_scale;
uniform float u_mask_strength;
uniform float u_phosphor_decay;
uniform uint u_scanline_count;
uniform float u_scanline_strength;
uniform uint u_scanline_parity;
uniform float u_instability_scale;
uniform uint u_input_width;
uniform uint u_noise_seed;
uniform float u_black_level;
uniform float u_white_level;
uniform float u_diffusion_strength;

vec2 barrel(vec2 p, vec2 amount) {
    return p * (vec2(1.0) + amount * vec2(p.y * p.y, p.x * p.x));
}

float screen_coverage(vec2 p, float corner_rounding) {
    float radius = clamp(corner_rounding, 0.0, 1.0);
    vec2 q = abs(p) - vec2(1.0 - radius);
    float d = length(max(q, vec2(0.0))) + min(max(q.x, q.y), 0.0) - radius;
    return d <= 0.0 ? 1.0 : 0.0;
}

void main() {
    vec2 p = (v_uv * 2.0 - 1.0) * u_view_scale;
    vec2 p_source = barrel(p, u_distortion);
    float coverage = screen_coverage(barrel(p, u_distortion + u_edge_rounding), u_corner_rounding);

    vec2 source_uv = (p_source * 0.5 + 0.5) * u_overscan_scale + u_overscan_offset;
    if (u_instability_scale > 0.0) {
        int line = int(floor(source_uv.y * float(u_scanline_count)));
        float wobble = unit_hash(hash2(uint(line), u_noise_seed)) - 0.5;
        source_uv.x += wobble * u_instability_scale / float(u_input_width);
    }

    vec3 raw = texture(u_input0, source_uv).rgb;
    if (u_diffusion_strength > 0.0) {
        vec3 scattered = texture(u_input3, source_uv).rgb;
        raw += max(scattered - raw, vec3(0.0)) * u_diffusion_strength;
    }

    float range = max(u_white_level - u_black_level, 1e-6);
    vec3 rgb = (raw - u_black_level) / range;

    int physical_line = int(floor(source_uv.y * float(u_scanline_count) * 2.0));
    bool lit = ((physical_line & 1) == 0) == (u_scanline_parity == 0u);
    float scanline = lit ? 1.0 : 1.0 - u_scanline_strength;

    vec3 mask = mix(vec3(1.0), texture(u_input2, source_uv * u_mask_uv_scale).rgb, u_mask_strength);
    vec3 history = texture(u_input1, v_uv).rgb;

    vec3 result = rgb * scanline * mask * coverage + history * u_phosphor_decay;
    frag_color = vec4(clamp(result, 0.0, 1.0), 1.0);
}
"#;

/// Body of the fragment program for a shader id, without the prelude.
pub fn fragment_body(id: ShaderId) -> &'static str {
    match id {
        ShaderId::Copy => COPY_FRAGMENT,
        ShaderId::GenerateSignal => GENERATE_SIGNAL_FRAGMENT,
        ShaderId::ApplyArtifacts => APPLY_ARTIFACTS_FRAGMENT,
        ShaderId::CompositeToSVideo => COMPOSITE_TO_SVIDEO_FRAGMENT,
        ShaderId::SVideoToYiq => SVIDEO_TO_YIQ_FRAGMENT,
        ShaderId::YiqToRgb => YIQ_TO_RGB_FRAGMENT,
        ShaderId::GenerateSlotMask => SLOT_MASK_FRAGMENT,
        ShaderId::GenerateShadowMask => SHADOW_MASK_FRAGMENT,
        ShaderId::GenerateApertureGrille => APERTURE_GRILLE_FRAGMENT,
        ShaderId::Tonemap => TONEMAP_FRAGMENT,
        ShaderId::GaussianBlur => GAUSSIAN_BLUR_FRAGMENT,
        ShaderId::RgbToCrt => RGB_TO_CRT_FRAGMENT,
    }
}

/// Complete fragment source for a shader id.
pub fn fragment_source(id: ShaderId) -> String {
    format!("{FRAGMENT_PRELUDE}{}", fragment_body(id))
}
