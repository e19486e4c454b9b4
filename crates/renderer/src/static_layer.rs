//! Layer showing a single field.

use std::cell::RefCell;
use std::rc::Rc;

use field_common::LayerId;
use tracing::{debug, warn};

use crate::gpu::RenderContext;
use crate::host::{MapHost, ViewState};
use crate::layer::{spawn_attach, AttachHandle, Mount};
use crate::plot::PlotComponent;
use crate::renderable::FieldRenderable;
use crate::resources::FieldResources;

pub struct StaticFieldLayer {
    id: LayerId,
    renderable: Rc<FieldRenderable>,
    mount: RefCell<Option<Mount>>,
}

impl StaticFieldLayer {
    pub fn new(
        id: impl Into<LayerId>,
        resources: Rc<FieldResources>,
        plot: Box<dyn PlotComponent>,
    ) -> Self {
        Self {
            id: id.into(),
            renderable: Rc::new(FieldRenderable::new(plot, resources)),
            mount: RefCell::new(None),
        }
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    pub fn renderable(&self) -> &Rc<FieldRenderable> {
        &self.renderable
    }

    /// Mount on a host and attach the field; repaints once it is ready.
    pub fn on_add(
        &self,
        host: Rc<dyn MapHost>,
        context: Rc<dyn RenderContext>,
    ) -> Option<AttachHandle> {
        let mount = Mount { host, context };
        {
            let mut slot = self.mount.borrow_mut();
            if slot.is_some() {
                warn!(layer = %self.id, "Layer is already mounted");
                return None;
            }
            *slot = Some(mount.clone());
        }

        let id = self.id.clone();
        Some(spawn_attach(mount, Rc::clone(&self.renderable), move |mount, _| {
            debug!(layer = %id, "Field attached, repainting");
            mount.host.trigger_repaint();
        }))
    }

    pub fn render(&self, context: &dyn RenderContext, matrix: &[f32; 16]) {
        let host = match self.mount.borrow().as_ref() {
            Some(mount) => Rc::clone(&mount.host),
            None => return,
        };
        let view = ViewState::capture(host.as_ref());
        self.renderable.draw(context, &view, matrix);
    }
}
