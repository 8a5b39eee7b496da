//! WebGL2 canvas surface: one luminance texture drawn over a full-canvas quad.

use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlProgram, WebGlShader, WebGlTexture,
};

use toyboy_debugger::frame::{RendererError, Surface};

use super::js_message;

const VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
in vec2 a_texcoord;
out vec2 v_texcoord;
void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
    v_texcoord = a_texcoord;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec2 v_texcoord;
uniform sampler2D u_frame;
out vec4 out_color;
void main() {
    float l = texture(u_frame, v_texcoord).r;
    out_color = vec4(l, l, l, 1.0);
}
"#;

/// Two triangles, interleaved (x, y, u, v). Row 0 of the frame is the top.
#[rustfmt::skip]
const QUAD: [f32; 24] = [
    -1.0, -1.0, 0.0, 1.0,
     1.0, -1.0, 1.0, 1.0,
    -1.0,  1.0, 0.0, 0.0,
    -1.0,  1.0, 0.0, 0.0,
     1.0, -1.0, 1.0, 1.0,
     1.0,  1.0, 1.0, 0.0,
];

const STRIDE: i32 = 4 * std::mem::size_of::<f32>() as i32;

pub(super) struct WebGlSurface {
    canvas: HtmlCanvasElement,
    gl: Gl,
    texture: WebGlTexture,
}

fn compile(gl: &Gl, kind: u32, stage: &'static str, src: &str) -> Result<WebGlShader, RendererError> {
    let shader = gl
        .create_shader(kind)
        .ok_or(RendererError::Resource("shader"))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(RendererError::Shader { stage, log })
    }
}

fn link(gl: &Gl, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram, RendererError> {
    let program = gl
        .create_program()
        .ok_or(RendererError::Resource("program"))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(RendererError::Link(log))
    }
}

fn attribute(gl: &Gl, program: &WebGlProgram, name: &'static str) -> Result<u32, RendererError> {
    let loc = gl.get_attrib_location(program, name);
    u32::try_from(loc).map_err(|_| RendererError::Resource(name))
}

impl WebGlSurface {
    pub(super) fn new(canvas: HtmlCanvasElement) -> Result<Self, RendererError> {
        let gl = canvas
            .get_context("webgl2")
            .ok()
            .flatten()
            .ok_or(RendererError::NoContext)?
            .dyn_into::<Gl>()
            .map_err(|_| RendererError::NoContext)?;

        let vs = compile(&gl, Gl::VERTEX_SHADER, "vertex", VERTEX_SHADER)?;
        let fs = compile(&gl, Gl::FRAGMENT_SHADER, "fragment", FRAGMENT_SHADER)?;
        let program = link(&gl, &vs, &fs)?;
        gl.use_program(Some(&program));

        let buffer = gl
            .create_buffer()
            .ok_or(RendererError::Resource("vertex buffer"))?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, bytemuck::cast_slice(&QUAD), Gl::STATIC_DRAW);

        let position = attribute(&gl, &program, "a_position")?;
        let texcoord = attribute(&gl, &program, "a_texcoord")?;
        gl.enable_vertex_attrib_array(position);
        gl.vertex_attrib_pointer_with_i32(position, 2, Gl::FLOAT, false, STRIDE, 0);
        gl.enable_vertex_attrib_array(texcoord);
        gl.vertex_attrib_pointer_with_i32(texcoord, 2, Gl::FLOAT, false, STRIDE, 8);

        let texture = gl
            .create_texture()
            .ok_or(RendererError::Resource("texture"))?;
        gl.active_texture(Gl::TEXTURE0);
        gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, Gl::NEAREST as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::NEAREST as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE as i32);
        gl.pixel_storei(Gl::UNPACK_ALIGNMENT, 1);
        gl.uniform1i(gl.get_uniform_location(&program, "u_frame").as_ref(), 0);

        tracing::info!("WebGL2 renderer ready");
        Ok(Self {
            canvas,
            gl,
            texture,
        })
    }
}

impl Surface for WebGlSurface {
    /// CSS size in device pixels; falls back to the current buffer size while
    /// the canvas is not laid out.
    fn canvas_size(&self) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let w = (self.canvas.client_width() as f64 * dpr).round() as u32;
        let h = (self.canvas.client_height() as f64 * dpr).round() as u32;
        if w == 0 || h == 0 {
            (self.canvas.width(), self.canvas.height())
        } else {
            (w, h)
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn upload_luminance(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), RendererError> {
        self.gl.bind_texture(Gl::TEXTURE_2D, Some(&self.texture));
        self.gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                Gl::TEXTURE_2D,
                0,
                Gl::LUMINANCE as i32,
                width as i32,
                height as i32,
                0,
                Gl::LUMINANCE,
                Gl::UNSIGNED_BYTE,
                Some(pixels),
            )
            .map_err(|e| RendererError::Upload(js_message(&e)))
    }

    fn draw(&mut self) {
        self.gl.draw_arrays(Gl::TRIANGLES, 0, 6);
    }
}
