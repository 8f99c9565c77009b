use crate::camera::HeadCamera;
use glam::Mat4;

/// Pixel rectangle within the render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }
}

/// One eye: where it is drawn and what it sees.
#[derive(Debug, Clone, Copy)]
pub struct EyeView {
    pub viewport: Viewport,
    pub view_proj: Mat4,
}

/// Splits the target into side-by-side eye views.
///
/// With stereo disabled the rig yields a single full-size view from the
/// camera centre.
#[derive(Debug, Clone)]
pub struct StereoRig {
    width: u32,
    height: u32,
    stereo: bool,
    full_screen: bool,
    /// Interpupillary distance in world units.
    pub eye_separation: f32,
}

impl Default for StereoRig {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            stereo: true,
            full_screen: false,
            eye_separation: 0.064,
        }
    }
}

impl StereoRig {
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn set_stereo(&mut self, stereo: bool) {
        self.stereo = stereo;
    }

    pub fn is_stereo(&self) -> bool {
        self.stereo
    }

    /// Record the window's full-screen state. The window owner applies
    /// requests and reports changes made outside the app.
    pub fn set_full_screen(&mut self, full_screen: bool) {
        self.full_screen = full_screen;
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Eye views for this frame, left eye first.
    pub fn eyes(&self, camera: &HeadCamera) -> Vec<EyeView> {
        let (w, h) = (self.width as f32, self.height as f32);
        if !self.stereo {
            let viewport = Viewport {
                x: 0.0,
                y: 0.0,
                width: w,
                height: h,
            };
            return vec![EyeView {
                viewport,
                view_proj: camera.projection_matrix(viewport.aspect())
                    * camera.eye_view_matrix(0.0),
            }];
        }

        let half = (self.width / 2).max(1) as f32;
        let offset = self.eye_separation / 2.0;
        [(0.0, -offset), (half, offset)]
            .into_iter()
            .map(|(x, eye_offset)| {
                let viewport = Viewport {
                    x,
                    y: 0.0,
                    width: half,
                    height: h,
                };
                EyeView {
                    viewport,
                    view_proj: camera.projection_matrix(viewport.aspect())
                        * camera.eye_view_matrix(eye_offset),
                }
            })
            .collect()
    }
}
