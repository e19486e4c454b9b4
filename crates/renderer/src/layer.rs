//! Map layers.
//!
//! The host sees every layer through the same two hooks: `on_add` once
//! when the layer is mounted, `render` once per frame. [`MapLayer`] is the
//! closed set of layer kinds it can mount.

use std::rc::Rc;

use field_common::LayerId;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::gpu::RenderContext;
use crate::host::MapHost;
use crate::renderable::FieldRenderable;
use crate::static_layer::StaticFieldLayer;
use crate::time_layer::TimeFieldLayer;

/// Host services a layer keeps once mounted.
#[derive(Clone)]
pub(crate) struct Mount {
    pub host: Rc<dyn MapHost>,
    pub context: Rc<dyn RenderContext>,
}

/// Local task attaching one field; resolves to the attach result.
pub type AttachHandle = JoinHandle<Result<()>>;

/// Attach `renderable` on a local task, then run `on_ready` if it succeeded.
///
/// A failed attach skips `on_ready` and is returned through the handle.
pub(crate) fn spawn_attach<F>(
    mount: Mount,
    renderable: Rc<FieldRenderable>,
    on_ready: F,
) -> AttachHandle
where
    F: FnOnce(&Mount, &Rc<FieldRenderable>) + 'static,
{
    tokio::task::spawn_local(async move {
        renderable.attach(mount.context.as_ref()).await?;
        on_ready(&mount, &renderable);
        Ok(())
    })
}

/// A layer the host can mount.
pub enum MapLayer {
    Static(StaticFieldLayer),
    Timed(TimeFieldLayer),
}

impl MapLayer {
    pub fn id(&self) -> &LayerId {
        match self {
            MapLayer::Static(layer) => layer.id(),
            MapLayer::Timed(layer) => layer.id(),
        }
    }

    /// Mount on a host and start attaching fields.
    ///
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn on_add(
        &self,
        host: Rc<dyn MapHost>,
        context: Rc<dyn RenderContext>,
    ) -> Vec<AttachHandle> {
        match self {
            MapLayer::Static(layer) => layer.on_add(host, context).into_iter().collect(),
            MapLayer::Timed(layer) => layer.on_add(host, context),
        }
    }

    pub fn render(&self, context: &dyn RenderContext, matrix: &[f32; 16]) {
        match self {
            MapLayer::Static(layer) => layer.render(context, matrix),
            MapLayer::Timed(layer) => layer.render(context, matrix),
        }
    }
}

impl From<StaticFieldLayer> for MapLayer {
    fn from(layer: StaticFieldLayer) -> Self {
        MapLayer::Static(layer)
    }
}

impl From<TimeFieldLayer> for MapLayer {
    fn from(layer: TimeFieldLayer) -> Self {
        MapLayer::Timed(layer)
    }
}
