//! Layer holding one field per hour and drawing the active one.
//!
//! # Repaints
//!
//! The host is asked to repaint only when what is visible changes:
//!
//! - `set_datetime` to a different hour while mounted repaints at once,
//!   even if that hour's field is still attaching.
//! - A field finishing its attach repaints only if its hour is still the
//!   active one *and* it is still the field stored for that hour. A field
//!   replaced while attaching finishes quietly.
//! - The first field added becomes active without a repaint.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use field_common::{
    ContourStyle, FieldError, LayerId, RasterStyle, RawScalarField, TimeKey, ValidTime,
};
use tracing::{debug, trace, warn};

use crate::contour::Contour;
use crate::error::Result;
use crate::gpu::RenderContext;
use crate::host::{MapHost, ViewState};
use crate::layer::{spawn_attach, AttachHandle, Mount};
use crate::plot::PlotComponent;
use crate::raster::Raster;
use crate::renderable::FieldRenderable;
use crate::resources::FieldResources;

/// Builds the plot component for each field added to a layer.
pub type PlotFactory = Box<dyn Fn(RawScalarField) -> Box<dyn PlotComponent>>;

#[derive(Default)]
struct TimeLayerState {
    fields: HashMap<TimeKey, Rc<FieldRenderable>>,
    active_key: Option<TimeKey>,
    mount: Option<Mount>,
}

/// Time-indexed field layer.
pub struct TimeFieldLayer {
    id: LayerId,
    resources: Rc<FieldResources>,
    make_plot: PlotFactory,
    state: Rc<RefCell<TimeLayerState>>,
}

impl TimeFieldLayer {
    pub fn new(
        id: impl Into<LayerId>,
        resources: Rc<FieldResources>,
        make_plot: impl Fn(RawScalarField) -> Box<dyn PlotComponent> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            resources,
            make_plot: Box::new(make_plot),
            state: Rc::new(RefCell::new(TimeLayerState::default())),
        }
    }

    /// Layer contouring every field with `style`.
    pub fn contour(
        id: impl Into<LayerId>,
        resources: Rc<FieldResources>,
        style: ContourStyle,
    ) -> Result<Self> {
        style.validate().map_err(FieldError::InvalidStyle)?;
        Ok(Self::new(id, resources, move |field| {
            Box::new(Contour::from_valid_style(field, &style)) as Box<dyn PlotComponent>
        }))
    }

    /// Layer filling every field through the color ramp in `style`.
    pub fn raster(
        id: impl Into<LayerId>,
        resources: Rc<FieldResources>,
        style: RasterStyle,
    ) -> Result<Self> {
        style.validate().map_err(FieldError::InvalidStyle)?;
        Ok(Self::new(id, resources, move |field| {
            Box::new(Raster::from_valid_style(field, &style)) as Box<dyn PlotComponent>
        }))
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    /// Add a field at `datetime`, replacing any field in the same hour.
    ///
    /// When mounted, returns the handle of the spawned attach task, which
    /// resolves to the attach error if tessellation or program build fails.
    pub fn add_field<Tz: TimeZone>(
        &self,
        field: RawScalarField,
        datetime: &DateTime<Tz>,
    ) -> Option<AttachHandle> {
        self.insert(TimeKey::from_datetime(datetime), field)
    }

    /// Add a field at a model valid time.
    pub fn add_valid_field(
        &self,
        field: RawScalarField,
        valid_time: &ValidTime,
    ) -> Option<AttachHandle> {
        self.insert(valid_time.time_key(), field)
    }

    fn insert(&self, key: TimeKey, field: RawScalarField) -> Option<AttachHandle> {
        let renderable = Rc::new(FieldRenderable::new(
            (self.make_plot)(field),
            Rc::clone(&self.resources),
        ));

        let mount = {
            let mut state = self.state.borrow_mut();
            if state.fields.insert(key.clone(), Rc::clone(&renderable)).is_some() {
                debug!(layer = %self.id, key = %key, "Replaced field");
            } else {
                debug!(layer = %self.id, key = %key, "Added field");
            }
            if state.active_key.is_none() {
                state.active_key = Some(key.clone());
            }
            state.mount.clone()
        };

        mount.map(|mount| self.spawn_attach(mount, key, renderable))
    }

    fn spawn_attach(
        &self,
        mount: Mount,
        key: TimeKey,
        renderable: Rc<FieldRenderable>,
    ) -> AttachHandle {
        let state = Rc::downgrade(&self.state);
        let id = self.id.clone();

        spawn_attach(mount, renderable, move |mount, renderable| {
            // Layer dropped while attaching
            let Some(state) = state.upgrade() else {
                return;
            };

            let visible = {
                let state = state.borrow();
                state.active_key.as_ref() == Some(&key)
                    && state
                        .fields
                        .get(&key)
                        .is_some_and(|current| Rc::ptr_eq(current, renderable))
            };

            if visible {
                debug!(layer = %id, key = %key, "Active field attached, repainting");
                mount.host.trigger_repaint();
            } else {
                trace!(layer = %id, key = %key, "Attached field not visible, repaint suppressed");
            }
        })
    }

    /// Select the hour to draw.
    ///
    /// The hour does not need a field yet; nothing draws until one is added.
    pub fn set_datetime<Tz: TimeZone>(&self, datetime: &DateTime<Tz>) {
        let key = TimeKey::from_datetime(datetime);

        let host = {
            let mut state = self.state.borrow_mut();
            if state.active_key.as_ref() == Some(&key) {
                trace!(layer = %self.id, key = %key, "Time unchanged");
                return;
            }
            if !state.fields.contains_key(&key) {
                debug!(layer = %self.id, key = %key, "Selected time has no field yet");
            }
            state.active_key = Some(key);
            state.mount.as_ref().map(|mount| Rc::clone(&mount.host))
        };

        // Outside the borrow: the host may render synchronously
        if let Some(host) = host {
            host.trigger_repaint();
        }
    }

    pub fn active_key(&self) -> Option<TimeKey> {
        self.state.borrow().active_key.clone()
    }

    /// Top of the active hour.
    pub fn active_datetime(&self) -> Option<DateTime<Utc>> {
        self.active_key().and_then(|key| key.to_datetime().ok())
    }

    /// Every hour holding a field, in chronological order.
    pub fn list_timestamps(&self) -> Vec<DateTime<Utc>> {
        let mut keys: Vec<TimeKey> = self.state.borrow().fields.keys().cloned().collect();
        keys.sort();
        keys.iter().filter_map(|key| key.to_datetime().ok()).collect()
    }

    /// The renderable stored for the hour containing `datetime`.
    pub fn renderable<Tz: TimeZone>(&self, datetime: &DateTime<Tz>) -> Option<Rc<FieldRenderable>> {
        let key = TimeKey::from_datetime(datetime);
        self.state.borrow().fields.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mounted(&self) -> bool {
        self.state.borrow().mount.is_some()
    }

    /// Mount on a host and attach every field added so far.
    pub fn on_add(
        &self,
        host: Rc<dyn MapHost>,
        context: Rc<dyn RenderContext>,
    ) -> Vec<AttachHandle> {
        let mount = Mount { host, context };

        let pending: Vec<(TimeKey, Rc<FieldRenderable>)> = {
            let mut state = self.state.borrow_mut();
            if state.mount.is_some() {
                warn!(layer = %self.id, "Layer is already mounted");
                return Vec::new();
            }
            state.mount = Some(mount.clone());
            state
                .fields
                .iter()
                .map(|(key, renderable)| (key.clone(), Rc::clone(renderable)))
                .collect()
        };

        debug!(layer = %self.id, fields = pending.len(), "Layer mounted");

        pending
            .into_iter()
            .map(|(key, renderable)| self.spawn_attach(mount.clone(), key, renderable))
            .collect()
    }

    /// Draw the active field, if it is ready.
    pub fn render(&self, context: &dyn RenderContext, matrix: &[f32; 16]) {
        let (renderable, host) = {
            let state = self.state.borrow();
            let Some(mount) = state.mount.as_ref() else {
                return;
            };
            let Some(renderable) = state.active_key.as_ref().and_then(|k| state.fields.get(k))
            else {
                return;
            };
            (Rc::clone(renderable), Rc::clone(&mount.host))
        };

        let view = ViewState::capture(host.as_ref());
        renderable.draw(context, &view, matrix);
    }
}
