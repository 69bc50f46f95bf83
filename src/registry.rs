//! The overlay registry: a thread-safe map of id → node plus a z-ordered
//! priority view over the same nodes.
//!
//! One reader/writer lock guards both structures. The lock discipline is the
//! engine's core rule: the synchronous add/set path may render under the
//! exclusive lock (callers accept the stall), but the async variants do all
//! codec/shaping work on a background task and only take the lock for the
//! final map/index bookkeeping.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::blend::backend::BlendBackend;
use crate::config::OsdConfig;
use crate::foundation::error::{VosdError, VosdResult};
use crate::overlay::node::{OverlayMetadata, OverlayNode};
use crate::overlay::spec::OverlaySpec;
use crate::text::shaper::TextShaper;

pub(crate) struct RegistryInner {
    pub(crate) nodes: HashMap<String, OverlayNode>,
    /// Ascending `(z_index, insertion_seq)` → id. Holds ids only — the map
    /// above is the single owner of every node.
    pub(crate) priority: BTreeMap<(i32, u64), String>,
    next_seq: u64,
    pub(crate) frame_size: Option<(u32, u32)>,
}

impl RegistryInner {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            priority: BTreeMap::new(),
            next_seq: 0,
            frame_size: None,
        }
    }

    /// Insert into the map and the priority index as one step: either both
    /// entries exist afterwards or neither does.
    fn insert_node(&mut self, mut node: OverlayNode) -> VosdResult<()> {
        let id = node.id().to_string();
        if self.nodes.contains_key(&id) {
            return Err(VosdError::invalid_argument(format!(
                "overlay id '{id}' already exists"
            )));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        node.seq = seq;
        let key = (node.z_index(), seq);

        self.nodes.insert(id.clone(), node);
        if self.priority.insert(key, id.clone()).is_some() {
            // Unreachable with a monotonic seq; undo the map insert so the
            // two views never diverge.
            self.nodes.remove(&id);
            return Err(VosdError::internal(format!(
                "priority key {key:?} already occupied"
            )));
        }
        Ok(())
    }

    /// Remove from both structures, or from neither.
    fn remove_node(&mut self, id: &str) -> VosdResult<OverlayNode> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| VosdError::invalid_argument(format!("unknown overlay id '{id}'")))?;
        let key = (node.z_index(), node.seq);
        if self.priority.remove(&key).is_none() {
            self.nodes.insert(id.to_string(), node);
            return Err(VosdError::internal(format!(
                "overlay '{id}' missing from priority index"
            )));
        }
        Ok(node)
    }
}

/// Thread-safe overlay registry. Cloning shares the underlying state.
#[derive(Clone)]
pub struct OverlayRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    backend: Arc<dyn BlendBackend>,
    shaper: Arc<dyn TextShaper>,
}

impl OverlayRegistry {
    /// Create an empty registry owning the given blend device handle and
    /// text shaper.
    pub fn new(backend: Arc<dyn BlendBackend>, shaper: Arc<dyn TextShaper>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::new())),
            backend,
            shaper,
        }
    }

    /// Create a registry pre-populated from a parsed configuration. Any
    /// invalid entry fails the whole construction. Note that `custom`
    /// entries need a frame size at add time, so configs carrying them must
    /// go through [`Self::apply_config`] after [`Self::set_frame_size`].
    pub fn with_config(
        backend: Arc<dyn BlendBackend>,
        shaper: Arc<dyn TextShaper>,
        config: &OsdConfig,
    ) -> VosdResult<Self> {
        let registry = Self::new(backend, shaper);
        registry.apply_config(config)?;
        Ok(registry)
    }

    /// Add every overlay a configuration declares. The first invalid entry
    /// aborts with its error; entries already added stay registered.
    pub fn apply_config(&self, config: &OsdConfig) -> VosdResult<()> {
        for (id, spec) in config.entries() {
            self.add_overlay(&id, spec)?;
        }
        Ok(())
    }

    pub(crate) fn backend(&self) -> &Arc<dyn BlendBackend> {
        &self.backend
    }

    pub(crate) fn with_exclusive<R>(&self, f: impl FnOnce(&mut RegistryInner) -> R) -> R {
        let mut inner = self.inner.write();
        f(&mut inner)
    }

    /// Current frame size, if configured.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.inner.read().frame_size
    }

    /// Add a new overlay. Fails without touching the registry if the id is
    /// taken, the spec is invalid, or eager rendering fails. Rendering
    /// happens here (and may be slow) when the frame size is already known;
    /// otherwise it is deferred to [`Self::set_frame_size`] — except for
    /// custom overlays, which need the frame geometry immediately.
    #[tracing::instrument(skip(self, spec))]
    pub fn add_overlay(&self, id: &str, spec: OverlaySpec) -> VosdResult<()> {
        let mut inner = self.inner.write();
        if inner.nodes.contains_key(id) {
            return Err(VosdError::invalid_argument(format!(
                "overlay id '{id}' already exists"
            )));
        }
        let mut node = OverlayNode::from_spec(id, spec, &self.shaper)?;
        match inner.frame_size {
            Some((w, h)) => node.build_hardware_buffers(w, h, self.backend.staging_format())?,
            None if node.is_custom() => {
                return Err(VosdError::uninitialized(
                    "custom overlays require a frame size at add time",
                ));
            }
            None => {}
        }
        inner.insert_node(node)?;
        debug!(id, "overlay added");
        Ok(())
    }

    /// Replace an existing overlay. The new node is fully constructed under
    /// the exclusive lock before the old one is removed, so no reader ever
    /// observes a momentary absence.
    #[tracing::instrument(skip(self, spec))]
    pub fn set_overlay(&self, id: &str, spec: OverlaySpec) -> VosdResult<()> {
        let mut inner = self.inner.write();
        if !inner.nodes.contains_key(id) {
            return Err(VosdError::invalid_argument(format!(
                "unknown overlay id '{id}'"
            )));
        }
        let mut node = OverlayNode::from_spec(id, spec, &self.shaper)?;
        match inner.frame_size {
            Some((w, h)) => node.build_hardware_buffers(w, h, self.backend.staging_format())?,
            None if node.is_custom() => {
                return Err(VosdError::uninitialized(
                    "custom overlays require a frame size at set time",
                ));
            }
            None => {}
        }
        let old = inner.remove_node(id)?;
        drop(old);
        inner.insert_node(node)?;
        debug!(id, "overlay replaced");
        Ok(())
    }

    /// Remove an overlay, releasing its hardware buffers.
    #[tracing::instrument(skip(self))]
    pub fn remove_overlay(&self, id: &str) -> VosdResult<()> {
        let mut inner = self.inner.write();
        let node = inner.remove_node(id)?;
        drop(node);
        debug!(id, "overlay removed");
        Ok(())
    }

    /// Read-only metadata snapshot of one overlay.
    pub fn get_overlay(&self, id: &str) -> VosdResult<OverlayMetadata> {
        let inner = self.inner.read();
        inner
            .nodes
            .get(id)
            .map(OverlayNode::metadata)
            .ok_or_else(|| VosdError::invalid_argument(format!("unknown overlay id '{id}'")))
    }

    /// Enable or disable an overlay without touching its buffers.
    pub fn set_overlay_enabled(&self, id: &str, enabled: bool) -> VosdResult<()> {
        let mut inner = self.inner.write();
        let node = inner
            .nodes
            .get_mut(id)
            .ok_or_else(|| VosdError::invalid_argument(format!("unknown overlay id '{id}'")))?;
        node.set_enabled(enabled);
        Ok(())
    }

    /// Set (or confirm) the output frame size. Setting the same value again
    /// is a no-op; a new value rebuilds every registered overlay, stopping at
    /// the first failure — overlays already rebuilt keep their new buffers.
    #[tracing::instrument(skip(self))]
    pub fn set_frame_size(&self, width: u32, height: u32) -> VosdResult<()> {
        if width < 1 || height < 1 {
            return Err(VosdError::configuration(format!(
                "frame size {width}x{height} must be at least 1x1"
            )));
        }
        let mut inner = self.inner.write();
        if inner.frame_size == Some((width, height)) {
            return Ok(());
        }
        inner.frame_size = Some((width, height));

        let staging = self.backend.staging_format();
        let ids: Vec<String> = inner.priority.values().cloned().collect();
        for id in ids {
            let node = inner
                .nodes
                .get_mut(&id)
                .ok_or_else(|| VosdError::internal(format!("node '{id}' missing from map")))?;
            if let Err(e) = node.build_hardware_buffers(width, height, staging) {
                warn!(id = %id, error = %e, "overlay rebuild after frame-size change failed");
                return Err(e);
            }
        }
        debug!(width, height, "frame size set");
        Ok(())
    }

    /// Async [`Self::add_overlay`]: decode/shape/render run on a blocking
    /// task with no registry lock held; only the structural insert is locked.
    /// If the frame size changes mid-build, the render is redone off-lock.
    pub async fn add_overlay_async(&self, id: &str, spec: OverlaySpec) -> VosdResult<()> {
        if self.inner.read().nodes.contains_key(id) {
            return Err(VosdError::invalid_argument(format!(
                "overlay id '{id}' already exists"
            )));
        }
        loop {
            let (node, built_for) = self.build_node_unlocked(id, spec.clone()).await?;
            let mut inner = self.inner.write();
            if inner.frame_size != built_for {
                continue;
            }
            if inner.nodes.contains_key(id) {
                return Err(VosdError::invalid_argument(format!(
                    "overlay id '{id}' already exists"
                )));
            }
            inner.insert_node(node)?;
            debug!(id, "overlay added (async)");
            return Ok(());
        }
    }

    /// Async [`Self::set_overlay`]: the replacement node is built unlocked,
    /// then swapped in under the lock (re-checking that the id still exists).
    pub async fn set_overlay_async(&self, id: &str, spec: OverlaySpec) -> VosdResult<()> {
        if !self.inner.read().nodes.contains_key(id) {
            return Err(VosdError::invalid_argument(format!(
                "unknown overlay id '{id}'"
            )));
        }
        loop {
            let (node, built_for) = self.build_node_unlocked(id, spec.clone()).await?;
            let mut inner = self.inner.write();
            if inner.frame_size != built_for {
                continue;
            }
            if !inner.nodes.contains_key(id) {
                return Err(VosdError::invalid_argument(format!(
                    "unknown overlay id '{id}'"
                )));
            }
            let old = inner.remove_node(id)?;
            drop(old);
            inner.insert_node(node)?;
            debug!(id, "overlay replaced (async)");
            return Ok(());
        }
    }

    /// Async [`Self::remove_overlay`]. Removal is pure bookkeeping, so this
    /// simply runs the synchronous path.
    pub async fn remove_overlay_async(&self, id: &str) -> VosdResult<()> {
        self.remove_overlay(id)
    }

    async fn build_node_unlocked(
        &self,
        id: &str,
        spec: OverlaySpec,
    ) -> VosdResult<(OverlayNode, Option<(u32, u32)>)> {
        let frame = self.inner.read().frame_size;
        if frame.is_none() && matches!(spec, OverlaySpec::Custom { .. }) {
            return Err(VosdError::uninitialized(
                "custom overlays require a frame size at add time",
            ));
        }
        let staging = self.backend.staging_format();
        let shaper = self.shaper.clone();
        let id = id.to_string();
        let node = tokio::task::spawn_blocking(move || -> VosdResult<OverlayNode> {
            let mut node = OverlayNode::from_spec(&id, spec, &shaper)?;
            if let Some((w, h)) = frame {
                node.build_hardware_buffers(w, h, staging)?;
            }
            Ok(node)
        })
        .await
        .map_err(|e| VosdError::internal(format!("overlay build task failed: {e}")))??;
        Ok((node, frame))
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry.rs"]
mod tests;
