//! The one-way command bridge between the game-logic thread and the render
//! thread.
//!
//! ```text
//! ┌──────────────────────┐      ┌─────────────┐      ┌──────────────────────┐
//! │ DeformMeshComponent  │─────>│   Command   │─────>│ DeformMeshSceneProxy │
//! │   (logic thread)     │      │   Channel   │      │   (render thread)    │
//! └──────────────────────┘      └─────────────┘      └──────────────────────┘
//! ```
//!
//! Commands flow FROM the component TO the proxy, never back. The channel is
//! unbounded and order-preserving; submission never blocks and is never
//! cancelled. Sending is fire-and-forget: if the receiving proxy was torn
//! down by a structural rebuild, the command is simply dropped.
//!
//! Each proxy gets its own channel. A structural change builds a new proxy
//! with a new channel, so commands still in flight toward the old proxy die
//! with it instead of leaking into the new one.

use cgmath::Matrix4;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// A single field update marshalled from the section store to the proxy.
///
/// Carries plain data only; the render side resolves indices against its own
/// state and drops anything out of range.
#[derive(Clone, Debug)]
pub enum SectionCommand {
    /// Replace the cached deform transform of one section.
    UpdateTransform {
        index: usize,
        transform: Matrix4<f32>,
    },
    /// Replace the render-side visibility bit of one section.
    SetVisibility { index: usize, visible: bool },
    /// All pending transform writes of this batch are in; fold them into one
    /// bulk upload of the consolidated GPU buffer.
    ConsolidateTransforms,
}

/// Logic-thread end of the bridge. Held by the component while its current
/// proxy is alive.
#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: Sender<SectionCommand>,
}

impl CommandSender {
    /// Enqueue without blocking. A disconnected receiver means the proxy is
    /// already gone; the command becomes a harmless no-op.
    pub fn send(&self, command: SectionCommand) {
        let _ = self.tx.send(command);
    }
}

/// Render-thread end of the bridge, embedded in the proxy it feeds.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<SectionCommand>,
}

impl CommandReceiver {
    /// Drain everything queued so far, in submission order, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = SectionCommand> + '_ {
        self.rx.try_iter()
    }
}

/// A fresh pair of bridge endpoints.
pub fn command_bridge() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = unbounded();
    (CommandSender { tx }, CommandReceiver { rx })
}
