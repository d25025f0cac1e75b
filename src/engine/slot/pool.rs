//! ### English
//! Fixed-size ring of reusable frame-buffer slots (arena indexed `0..N`).
//!
//! ### 中文
//! 固定大小、可复用的帧缓冲槽位环（以 `0..N` 索引的 arena）。

use crate::engine::error::RenderError;
use crate::engine::gl::TextureGl;

use super::FrameBuffer;

/// ### English
/// Default slot count.
///
/// ### 中文
/// 默认槽位数量。
pub const DEFAULT_BUFFER_COUNT: usize = 6;

/// ### English
/// Upper bound for configurable slot counts.
///
/// ### 中文
/// 可配置槽位数量的上限。
pub const MAX_BUFFER_COUNT: usize = 16;

/// ### English
/// Slot storage. Release/delete operations are idempotent and ignore out-of-range indices.
///
/// ### 中文
/// 槽位存储。release/delete 操作幂等，并忽略越界索引。
#[derive(Debug)]
pub struct SlotPool {
    buffers: Vec<FrameBuffer>,
}

impl SlotPool {
    /// ### English
    /// Creates `count` empty slots (`count` is clamped to `1..=MAX_BUFFER_COUNT`).
    ///
    /// ### 中文
    /// 创建 `count` 个空槽位（`count` 会被限制在 `1..=MAX_BUFFER_COUNT`）。
    pub fn new(count: usize) -> Self {
        let count = count.clamp(1, MAX_BUFFER_COUNT);
        Self {
            buffers: std::iter::repeat_with(FrameBuffer::default)
                .take(count)
                .collect(),
        }
    }

    /// ### English
    /// Number of slots.
    ///
    /// ### 中文
    /// 槽位数量。
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// ### English
    /// Always `false`: a pool holds at least one slot.
    ///
    /// ### 中文
    /// 恒为 `false`：池至少包含一个槽位。
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// ### English
    /// Slot `index`, or `SlotOutOfRange`.
    ///
    /// ### 中文
    /// 槽位 `index`；越界时返回 `SlotOutOfRange`。
    pub fn get(&self, index: usize) -> Result<&FrameBuffer, RenderError> {
        let count = self.buffers.len();
        self.buffers
            .get(index)
            .ok_or(RenderError::SlotOutOfRange { slot: index, count })
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut FrameBuffer, RenderError> {
        let count = self.buffers.len();
        self.buffers
            .get_mut(index)
            .ok_or(RenderError::SlotOutOfRange { slot: index, count })
    }

    /// ### English
    /// Slots in index order.
    ///
    /// ### 中文
    /// 按索引顺序遍历槽位。
    pub fn iter(&self) -> impl Iterator<Item = &FrameBuffer> {
        self.buffers.iter()
    }

    /// ### English
    /// Unpins the occupant, deletes owned textures and zeroes all plane ids.
    ///
    /// ### 中文
    /// 解除占用者的固定，删除自有纹理并将所有平面 ID 清零。
    pub fn release_slot(&mut self, gl: &dyn TextureGl, index: usize) {
        let Some(buffer) = self.buffers.get_mut(index) else {
            return;
        };
        buffer.detach_occupant();
        buffer.release_textures(gl);
        tracing::debug!(slot = index, "released slot");
    }

    /// ### English
    /// `release_slot` followed by dropping the slot's geometry and mode.
    ///
    /// ### 中文
    /// 先执行 `release_slot`，再丢弃槽位的几何信息与模式。
    pub fn delete_slot(&mut self, gl: &dyn TextureGl, index: usize) {
        self.release_slot(gl, index);
        if let Some(buffer) = self.buffers.get_mut(index) {
            buffer.clear();
        }
    }

    /// ### English
    /// Deletes every slot unconditionally, regardless of the mode it was last used in.
    ///
    /// ### 中文
    /// 无条件删除所有槽位，不论其最后使用的模式。
    pub fn delete_all(&mut self, gl: &dyn TextureGl) {
        for index in 0..self.buffers.len() {
            self.delete_slot(gl, index);
        }
    }
}
