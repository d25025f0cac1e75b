//! ### English
//! Error taxonomy for the hardware-decode render path.
//!
//! ### 中文
//! 硬件解码渲染路径的错误分类。

use thiserror::Error;

use super::mode::RenderMode;

/// ### English
/// Errors reported by bind/upload/create operations.
///
/// Release/delete operations never fail and therefore never produce one of these.
///
/// ### 中文
/// bind/upload/create 操作上报的错误。
///
/// release/delete 操作永不失败，因此不会产生这些错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// ### English
    /// The frame is missing or not yet valid. Non-fatal: skip this frame.
    ///
    /// ### 中文
    /// 帧缺失或尚未有效。非致命：跳过本帧即可。
    #[error("frame descriptor is missing or not yet valid")]
    InvalidDescriptor,
    /// ### English
    /// Owned texture creation failed. Latches the hardware path off.
    ///
    /// ### 中文
    /// 自有纹理创建失败。会锁定关闭硬件路径。
    #[error("texture allocation failed for slot {slot}: {reason}")]
    AllocationFailure { slot: usize, reason: String },
    /// ### English
    /// Binding an external texture left the driver in an error state.
    ///
    /// ### 中文
    /// 绑定外部纹理后驱动处于错误状态。
    #[error("binding external texture {texture} failed with GL error {gl_error:#06x}")]
    BindFailure { texture: u32, gl_error: u32 },
    /// ### English
    /// Slot index outside the configured pool.
    ///
    /// ### 中文
    /// 槽位索引超出已配置的池范围。
    #[error("slot index {slot} out of range (pool has {count} slots)")]
    SlotOutOfRange { slot: usize, count: usize },
    /// ### English
    /// The frame's payload does not belong to the currently configured mode.
    ///
    /// ### 中文
    /// 帧的载荷不属于当前配置的模式。
    #[error("frame requires {frame:?} but renderer is configured for {configured:?}")]
    FrameModeMismatch {
        frame: RenderMode,
        configured: RenderMode,
    },
    /// ### English
    /// No configuration event happened yet.
    ///
    /// ### 中文
    /// 尚未发生配置事件。
    #[error("renderer has not been configured")]
    NotConfigured,
    /// ### English
    /// Upload into a CPU-mode slot whose textures were never created.
    ///
    /// ### 中文
    /// 向从未创建纹理的 CPU 模式槽位上传。
    #[error("slot {slot} has no textures for the configured mode")]
    SlotNotCreated { slot: usize },
}
