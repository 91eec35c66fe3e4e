use core::ops::Mul;

/// Column-major 4x4 matrix (`m[col * 4 + row]`), the layout shader uniforms expect.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Orthographic projection onto clip space with z in [-1, 1].
    ///
    /// `bottom > top` yields a y-down projection.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0] = 2.0 / (right - left);
        out.m[5] = 2.0 / (top - bottom);
        out.m[10] = -2.0 / (far - near);
        out.m[12] = -(right + left) / (right - left);
        out.m[13] = -(top + bottom) / (top - bottom);
        out.m[14] = -(far + near) / (far - near);
        out
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut out = Self::IDENTITY;
        out.m[12] = x;
        out.m[13] = y;
        out.m[14] = z;
        out
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0] = x;
        out.m[5] = y;
        out.m[10] = z;
        out
    }

    /// Rotation around +Z by `degrees`.
    pub fn rotation_z(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        let mut out = Self::IDENTITY;
        out.m[0] = c;
        out.m[1] = s;
        out.m[4] = -s;
        out.m[5] = c;
        out
    }

    /// Applies the matrix to `(x, y, z, 1)`.
    pub fn transform_point(&self, x: f32, y: f32, z: f32) -> [f32; 4] {
        let m = &self.m;
        [
            m[0] * x + m[4] * y + m[8] * z + m[12],
            m[1] * x + m[5] * y + m[9] * z + m[13],
            m[2] * x + m[6] * y + m[10] * z + m[14],
            m[3] * x + m[7] * y + m[11] * z + m[15],
        ]
    }

    /// Rows of the matrix grouped per column, as `mat4x4<f32>` uniforms expect.
    pub fn to_cols(&self) -> [[f32; 4]; 4] {
        let m = &self.m;
        [
            [m[0], m[1], m[2], m[3]],
            [m[4], m[5], m[6], m[7]],
            [m[8], m[9], m[10], m[11]],
            [m[12], m[13], m[14], m[15]],
        ]
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4)
                    .map(|k| self.m[k * 4 + row] * rhs.m[col * 4 + k])
                    .sum();
            }
        }
        Mat4 { m: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn ortho_y_down_maps_corners() {
        let p = Mat4::ortho(0.0, 100.0, 50.0, 0.0, -1.0, 1.0);
        assert!(close(p.transform_point(0.0, 0.0, 0.0), [-1.0, 1.0, 0.0, 1.0]));
        assert!(close(p.transform_point(100.0, 50.0, 0.0), [1.0, -1.0, 0.0, 1.0]));
    }

    #[test]
    fn ortho_y_up_maps_origin_to_bottom() {
        let p = Mat4::ortho(0.0, 100.0, 0.0, 50.0, -1.0, 1.0);
        assert!(close(p.transform_point(0.0, 0.0, 0.0), [-1.0, -1.0, 0.0, 1.0]));
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let m = Mat4::translation(10.0, 0.0, 0.0) * Mat4::scale(2.0, 2.0, 1.0);
        assert!(close(m.transform_point(1.0, 1.0, 0.0), [12.0, 2.0, 0.0, 1.0]));
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::rotation_z(33.0);
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }
}
