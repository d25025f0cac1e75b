//! ### English
//! Renderer → decoder completion channel.
//!
//! The decoder keeps the `FrameEventReceiver` and attaches a `CompletionToken` to every frame it
//! hands over. The renderer fires `Sampled` from the post-render hook and `Released` when the frame
//! leaves its slot. Sends never block. A dropped receiver makes `Sampled` report failure so the
//! renderer can reclaim the fence; `Released` is silently ignored.
//!
//! ### 中文
//! 渲染器 → 解码器 的完成通知通道。
//!
//! 解码器持有 `FrameEventReceiver`，并为交付的每一帧附加一个 `CompletionToken`。
//! 渲染器在渲染后 hook 中发送 `Sampled`，在帧离开槽位时发送 `Released`。
//! 发送永不阻塞。接收端已 drop 时 `Sampled` 返回失败，由渲染器回收 fence；`Released` 则静默忽略。

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use super::FrameId;

/// ### English
/// Completion events observed by the decoder.
///
/// ### 中文
/// 解码器观察到的完成事件。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    /// ### English
    /// Sampling commands for the frame were submitted.
    ///
    /// `fence` is a `GLsync` (cast to `u64`) inserted right after those commands, or `0` when no
    /// fence was available. Ownership of a non-zero fence moves to the decoder, which must wait or
    /// poll it before reusing the surface and then delete it.
    ///
    /// ### 中文
    /// 该帧的采样命令已提交。
    ///
    /// `fence` 为紧随这些命令插入的 `GLsync`（转为 `u64`）；无可用 fence 时为 `0`。
    /// 非 0 fence 的所有权转移给解码器：解码器须在复用 surface 前等待/轮询它，之后负责删除。
    Sampled { frame_id: FrameId, fence: u64 },
    /// ### English
    /// The frame is no longer pinned by any slot.
    ///
    /// ### 中文
    /// 该帧已不再被任何槽位持有。
    Released { frame_id: FrameId },
}

/// ### English
/// Per-frame handle the renderer uses to report back to the decoder.
///
/// ### 中文
/// 渲染器用于向解码器回报的每帧句柄。
#[derive(Clone, Debug)]
pub struct CompletionToken {
    frame_id: FrameId,
    tx: Sender<FrameEvent>,
}

impl CompletionToken {
    /// ### English
    /// Frame this token reports for.
    ///
    /// ### 中文
    /// 该令牌所回报的帧。
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// ### English
    /// Sends `Sampled`. Returns `false` when the receiver is gone and `fence` was not delivered.
    ///
    /// ### 中文
    /// 发送 `Sampled`。接收端已不存在、`fence` 未送达时返回 `false`。
    pub(crate) fn signal_sampled(&self, fence: u64) -> bool {
        self.tx
            .send(FrameEvent::Sampled {
                frame_id: self.frame_id,
                fence,
            })
            .is_ok()
    }

    pub(crate) fn signal_released(&self) {
        let _ = self.tx.send(FrameEvent::Released {
            frame_id: self.frame_id,
        });
    }
}

/// ### English
/// Decoder-side factory for completion tokens.
///
/// ### 中文
/// 解码器侧的完成令牌工厂。
#[derive(Clone, Debug)]
pub struct FrameEventSender {
    tx: Sender<FrameEvent>,
}

impl FrameEventSender {
    /// ### English
    /// Creates a token for `frame_id`.
    ///
    /// ### 中文
    /// 为 `frame_id` 创建一个令牌。
    pub fn token(&self, frame_id: FrameId) -> CompletionToken {
        CompletionToken {
            frame_id,
            tx: self.tx.clone(),
        }
    }
}

/// ### English
/// Decoder-side event stream.
///
/// ### 中文
/// 解码器侧的事件流。
#[derive(Debug)]
pub struct FrameEventReceiver {
    rx: Receiver<FrameEvent>,
}

impl FrameEventReceiver {
    /// ### English
    /// Pops one queued event without blocking.
    ///
    /// ### 中文
    /// 非阻塞地弹出一个已排队事件。
    pub fn try_recv(&self) -> Option<FrameEvent> {
        self.rx.try_recv().ok()
    }

    /// ### English
    /// Waits up to `timeout` for the next event (decoder thread only; never the render thread).
    ///
    /// ### 中文
    /// 最多等待 `timeout` 获取下一个事件（仅限解码线程，勿在渲染线程调用）。
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FrameEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// ### English
    /// Drains every queued event without blocking.
    ///
    /// ### 中文
    /// 非阻塞地取出所有已排队事件。
    pub fn drain(&self) -> Vec<FrameEvent> {
        self.rx.try_iter().collect()
    }
}

/// ### English
/// Creates a connected sender/receiver pair (unbounded; sends never block the render thread).
///
/// ### 中文
/// 创建一对相连的发送端/接收端（无界；发送永不阻塞渲染线程）。
pub fn frame_events() -> (FrameEventSender, FrameEventReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (FrameEventSender { tx }, FrameEventReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_report_their_frame_id() {
        let (sender, receiver) = frame_events();
        let token = sender.token(11);
        token.signal_sampled(0xdead);
        token.signal_released();

        assert_eq!(
            receiver.drain(),
            vec![
                FrameEvent::Sampled {
                    frame_id: 11,
                    fence: 0xdead
                },
                FrameEvent::Released { frame_id: 11 },
            ]
        );
    }

    #[test]
    fn sampled_reports_undelivered_fence_after_decoder_dropped() {
        let (sender, receiver) = frame_events();
        let token = sender.token(3);
        assert_eq!(token.frame_id(), 3);
        assert!(token.signal_sampled(0x10));
        drop(receiver);

        assert!(!token.signal_sampled(0x11));
        token.signal_released();
    }

    #[test]
    fn recv_timeout_waits_for_a_cross_thread_event() {
        let (sender, receiver) = frame_events();
        assert_eq!(receiver.recv_timeout(Duration::from_millis(1)), None);

        let token = sender.token(9);
        let worker = std::thread::spawn(move || token.signal_released());
        assert_eq!(
            receiver.recv_timeout(Duration::from_secs(5)),
            Some(FrameEvent::Released { frame_id: 9 })
        );
        worker.join().unwrap();
        assert_eq!(receiver.try_recv(), None);
    }
}
