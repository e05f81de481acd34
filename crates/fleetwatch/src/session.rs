//! A user's working session over the fleet.
//!
//! The session holds the latest vessel snapshot and the user's flags behind
//! `RwLock<Arc<_>>`. Readers clone the `Arc`; every successful write refetches
//! and swaps in a whole new snapshot. A failed write or refetch leaves the
//! previous snapshot in place.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::{FlagStore, OverrideStore, VesselSource};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::flags::{FlagColor, FlagKey, FlagSet};
use crate::overrides::{enforce_policy, validate_edit, EditPreview, OverrideEdit};
use crate::status::StatusEngine;
use crate::vessel::Vessel;
use crate::view::{EnrichedVessel, FleetView, Page, ViewQuery};

/// Live state for one user.
pub struct FleetSession {
    source: Arc<dyn VesselSource>,
    overrides: Arc<dyn OverrideStore>,
    flag_store: Arc<dyn FlagStore>,
    user_id: String,
    view: FleetView,
    clock: Arc<dyn Clock>,
    block_invalid: bool,
    vessels: RwLock<Arc<Vec<Vessel>>>,
    flags: RwLock<Arc<FlagSet>>,
}

impl std::fmt::Debug for FleetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetSession")
            .field("user_id", &self.user_id)
            .field("block_invalid", &self.block_invalid)
            .finish_non_exhaustive()
    }
}

impl FleetSession {
    /// Create an empty session. Call [`refresh`](Self::refresh) to load data.
    pub fn new(
        source: Arc<dyn VesselSource>,
        overrides: Arc<dyn OverrideStore>,
        flag_store: Arc<dyn FlagStore>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            overrides,
            flag_store,
            user_id: user_id.into(),
            view: FleetView::default(),
            clock: Arc::new(SystemClock),
            block_invalid: false,
            vessels: RwLock::new(Arc::new(Vec::new())),
            flags: RwLock::new(Arc::new(FlagSet::new())),
        }
    }

    /// Use a specific status engine.
    #[must_use]
    pub fn with_engine(mut self, engine: StatusEngine) -> Self {
        self.view = FleetView::new(engine);
        self
    }

    /// Use a specific clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reject override saves that leave ETB before ETA.
    #[must_use]
    pub fn with_block_invalid(mut self, block: bool) -> Self {
        self.block_invalid = block;
        self
    }

    /// The session's user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Reload vessels and flags.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error; neither snapshot is replaced then.
    pub async fn refresh(&self) -> Result<()> {
        let vessels = self.source.fetch_vessels().await?;
        let flags = self.flag_store.flags_for_user(&self.user_id).await?;
        info!(vessels = vessels.len(), flags = flags.len(), "Session refreshed");
        *self.vessels.write().await = Arc::new(vessels);
        *self.flags.write().await = Arc::new(flags);
        Ok(())
    }

    /// The current vessel snapshot.
    pub async fn vessels(&self) -> Arc<Vec<Vessel>> {
        Arc::clone(&*self.vessels.read().await)
    }

    /// The current flags.
    pub async fn flags(&self) -> Arc<FlagSet> {
        Arc::clone(&*self.flags.read().await)
    }

    /// Build one page of the vessel view from the current snapshot.
    pub async fn page(&self, query: &ViewQuery) -> Page<EnrichedVessel> {
        let vessels = self.vessels().await;
        let flags = self.flags().await;
        self.view.run(&vessels, &flags, query, self.clock.today())
    }

    /// Preview an edit against the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VesselNotFound`] if the vessel is not in the snapshot.
    pub async fn preview_override(&self, edit: &OverrideEdit) -> Result<EditPreview> {
        let vessels = self.vessels().await;
        let vessel = vessels
            .iter()
            .find(|v| v.id == edit.vessel_id)
            .ok_or(Error::VesselNotFound { id: edit.vessel_id })?;
        Ok(validate_edit(vessel, edit, self.clock.today()))
    }

    /// Persist an override edit and reload the vessel snapshot.
    ///
    /// Returns the preview so callers can show any warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the vessel is unknown, the edit is blocked by
    /// policy, or the store or refetch fails.
    pub async fn save_override(&self, edit: OverrideEdit) -> Result<EditPreview> {
        let preview = self.preview_override(&edit).await?;
        enforce_policy(edit.vessel_id, &preview, self.block_invalid)?;
        for warning in &preview.warnings {
            warn!(vessel_id = edit.vessel_id, "{warning}");
        }

        self.overrides
            .update_override(edit.vessel_id, edit.field, edit.value.clone())
            .await?;
        debug!(vessel_id = edit.vessel_id, field = %edit.field, "Override saved");

        self.source.invalidate().await;
        let vessels = self.source.fetch_vessels().await?;
        *self.vessels.write().await = Arc::new(vessels);
        Ok(preview)
    }

    /// Set this user's flag on a vessel. [`FlagColor::None`] removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or refetch fails.
    pub async fn set_flag(&self, vessel_id: i64, color: FlagColor) -> Result<()> {
        let key = FlagKey::new(vessel_id, self.user_id.clone());
        if color.is_none() {
            self.flag_store.delete_flag(&key).await?;
        } else {
            self.flag_store.upsert_flag(&key, color).await?;
        }

        let flags = self.flag_store.flags_for_user(&self.user_id).await?;
        *self.flags.write().await = Arc::new(flags);
        Ok(())
    }
}
