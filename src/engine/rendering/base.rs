//! ### English
//! Seam to the generic renderer base (capability negotiation lives there, not here).
//!
//! ### 中文
//! 与通用渲染器基类的接口（能力协商在其中实现，而非本模块）。

/// ### English
/// Optional render features the generic pipeline may offer.
///
/// ### 中文
/// 通用管线可能提供的可选渲染特性。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RenderFeature {
    Gamma = 0,
    Brightness = 1,
    Contrast = 2,
    Noise = 3,
    Sharpness = 4,
    NonLinearStretch = 5,
    Stretch = 6,
    Zoom = 7,
    VerticalShift = 8,
    PixelRatio = 9,
    Rotation = 10,
}

impl RenderFeature {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Gamma,
            1 => Self::Brightness,
            2 => Self::Contrast,
            3 => Self::Noise,
            4 => Self::Sharpness,
            5 => Self::NonLinearStretch,
            6 => Self::Stretch,
            7 => Self::Zoom,
            8 => Self::VerticalShift,
            9 => Self::PixelRatio,
            10 => Self::Rotation,
            _ => return None,
        })
    }
}

/// ### English
/// Scaling methods the generic pipeline may offer.
///
/// ### 中文
/// 通用管线可能提供的缩放方法。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ScalingMethod {
    Nearest = 0,
    Linear = 1,
    Cubic = 2,
    Lanczos2 = 3,
    Lanczos3 = 4,
    Spline36 = 5,
}

impl ScalingMethod {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Nearest,
            1 => Self::Linear,
            2 => Self::Cubic,
            3 => Self::Lanczos2,
            4 => Self::Lanczos3,
            5 => Self::Spline36,
            _ => return None,
        })
    }
}

/// ### English
/// Capability queries answered by the generic renderer base.
///
/// ### 中文
/// 由通用渲染器基类回答的能力查询。
pub trait BaseRenderer {
    fn supports_feature(&self, feature: RenderFeature) -> bool;
    fn supports_scaling(&self, method: ScalingMethod) -> bool;
}

/// ### English
/// Fixed capability lists, for hosts without a base renderer of their own.
///
/// ### 中文
/// 固定的能力列表，供没有自有基类渲染器的宿主使用。
#[derive(Clone, Debug, Default)]
pub struct StaticCapabilities {
    pub features: Vec<RenderFeature>,
    pub scaling: Vec<ScalingMethod>,
}

impl StaticCapabilities {
    /// ### English
    /// What a plain shader pipeline can do with NV12 input.
    ///
    /// ### 中文
    /// 普通着色器管线处理 NV12 输入时具备的能力。
    pub fn nv12_defaults() -> Self {
        Self {
            features: vec![
                RenderFeature::Brightness,
                RenderFeature::Contrast,
                RenderFeature::Stretch,
                RenderFeature::Zoom,
                RenderFeature::VerticalShift,
                RenderFeature::PixelRatio,
                RenderFeature::Rotation,
            ],
            scaling: vec![ScalingMethod::Nearest, ScalingMethod::Linear],
        }
    }
}

impl BaseRenderer for StaticCapabilities {
    fn supports_feature(&self, feature: RenderFeature) -> bool {
        self.features.contains(&feature)
    }

    fn supports_scaling(&self, method: ScalingMethod) -> bool {
        self.scaling.contains(&method)
    }
}
