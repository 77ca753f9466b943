use waterline_render::{BlendMode, Primitive};

pub(crate) fn primitive_mode(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Triangles => glow::TRIANGLES,
        Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

/// `(source, destination)` blend factors.
pub(crate) fn blend_factors(mode: BlendMode) -> (u32, u32) {
    match mode {
        BlendMode::Alpha => (glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA),
    }
}

pub(crate) fn texture_unit(unit: u32) -> u32 {
    glow::TEXTURE0 + unit
}

/// Convert a `u32` count or size to the `i32` GL expects, saturating.
pub(crate) fn gl_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_blend_is_src_alpha_one_minus_src_alpha() {
        assert_eq!(
            blend_factors(BlendMode::Alpha),
            (glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA)
        );
    }

    #[test]
    fn primitives_map_to_gl_modes() {
        assert_eq!(primitive_mode(Primitive::Triangles), glow::TRIANGLES);
        assert_eq!(primitive_mode(Primitive::TriangleStrip), glow::TRIANGLE_STRIP);
    }

    #[test]
    fn units_are_offsets_from_texture0() {
        assert_eq!(texture_unit(0), glow::TEXTURE0);
        assert_eq!(texture_unit(4), glow::TEXTURE4);
    }

    #[test]
    fn gl_int_saturates() {
        assert_eq!(gl_int(6), 6);
        assert_eq!(gl_int(u32::MAX), i32::MAX);
    }
}
