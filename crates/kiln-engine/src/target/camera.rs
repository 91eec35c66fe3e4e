use crate::coords::Mat4;

/// View transform of a render target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Logical coordinate shown at the target's top-left corner.
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Degrees, around the centre of the view.
    pub angle: f32,
    /// Magnification around the centre of the view.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: -10.0,
            angle: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn is_identity_view(&self) -> bool {
        self.angle == 0.0 && self.zoom == 1.0
    }

    /// Rotation and zoom around the centre of a `w` x `h` view.
    pub fn view(&self, w: f32, h: f32) -> Mat4 {
        if self.is_identity_view() {
            return Mat4::IDENTITY;
        }
        let cx = self.x + w / 2.0;
        let cy = self.y + h / 2.0;
        Mat4::translation(cx, cy, 0.0)
            * Mat4::rotation_z(self.angle)
            * Mat4::scale(self.zoom, self.zoom, 1.0)
            * Mat4::translation(-cx, -cy, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_identity() {
        assert_eq!(Camera::default().view(100.0, 100.0), Mat4::IDENTITY);
    }

    #[test]
    fn zoom_keeps_centre_fixed() {
        let cam = Camera {
            zoom: 2.0,
            ..Default::default()
        };
        let v = cam.view(100.0, 50.0);
        let c = v.transform_point(50.0, 25.0, 0.0);
        assert!((c[0] - 50.0).abs() < 1e-4 && (c[1] - 25.0).abs() < 1e-4);
        let p = v.transform_point(60.0, 25.0, 0.0);
        assert!((p[0] - 70.0).abs() < 1e-4);
    }
}
