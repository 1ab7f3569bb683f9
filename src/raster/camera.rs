use glam::{Mat4, Vec3};

/// Axis the control-driven rotation spins around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinAxis {
    /// Whole-scene turntable spin.
    Vertical,
    /// Spin in the flower's own face plane.
    Depth,
}

impl SpinAxis {
    pub fn axis(self) -> Vec3 {
        match self {
            Self::Vertical => Vec3::Y,
            Self::Depth => Vec3::Z,
        }
    }
}

/// Fixed camera placement plus the axis the control rotation uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub translation: Vec3,
    pub tilt_axis: Vec3,
    pub tilt_deg: f32,
    pub face_axis: Vec3,
    pub face_deg: f32,
    pub spin_axis: SpinAxis,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            translation: Vec3::new(0.0, 0.0, -15.0),
            tilt_axis: Vec3::new(1.0, 1.0, 0.0),
            tilt_deg: 20.0,
            face_axis: Vec3::X,
            face_deg: 35.0,
            spin_axis: SpinAxis::Depth,
            fov_y_deg: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraRig {
    /// translate · tilt · face-on · spin. The spin is innermost so it turns the
    /// flower in its own frame rather than orbiting the camera.
    pub fn model_view(&self, spin_deg: f32) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_axis_angle(self.tilt_axis.normalize(), self.tilt_deg.to_radians())
            * Mat4::from_axis_angle(self.face_axis.normalize(), self.face_deg.to_radians())
            * Mat4::from_axis_angle(self.spin_axis.axis(), spin_deg.to_radians())
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32, spin_deg: f32) -> Mat4 {
        self.projection(aspect) * self.model_view(spin_deg)
    }
}
