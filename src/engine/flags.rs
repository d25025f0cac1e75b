//! ### English
//! Bitflags controlling optional renderer behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask.
//!
//! ### 中文
//! 控制渲染器可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入。

/// ### English
/// Unsafe mode: skip the post-render `GLsync` fence.
///
/// In this mode, `FrameEvent::Sampled.fence` is always `0` and the decoder only learns that the
/// sampling commands were submitted (flushed), not that the GPU finished executing them. The
/// decoder must tolerate reusing a surface at submission time.
///
/// ### 中文
/// 不安全模式：跳过渲染后的 `GLsync` fence。
///
/// 该模式下 `FrameEvent::Sampled.fence` 始终为 `0`，解码器只能得知采样命令已提交（flush），
/// 而不能得知 GPU 已执行完毕；解码器必须能够容忍在“提交时”复用 surface。
pub const HWDEC_RENDER_FLAG_UNSAFE_NO_RENDER_FENCE: u32 = 1 << 0;

/// ### English
/// Skip `glGetError` checks after sampler-state updates (lower overhead, bind failures go
/// undetected).
///
/// ### 中文
/// 跳过采样器状态更新后的 `glGetError` 检查（开销更低，但无法检测绑定失败）。
pub const HWDEC_RENDER_FLAG_SKIP_GL_ERROR_CHECK: u32 = 1 << 1;

/// ### English
/// Mask of all known flags; unknown bits are ignored.
///
/// ### 中文
/// 所有已知标志的掩码；未知位会被忽略。
pub(crate) const HWDEC_RENDER_FLAG_MASK: u32 =
    HWDEC_RENDER_FLAG_UNSAFE_NO_RENDER_FENCE | HWDEC_RENDER_FLAG_SKIP_GL_ERROR_CHECK;
