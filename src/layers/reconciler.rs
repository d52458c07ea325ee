//! Declarative marker list -> minimal create/update/remove delta.
//!
//! The reconciler is pure: it reads the engine's [`MarkerRegistry`] and
//! produces a [`ReconcilePlan`]; [`crate::core::engine::MapEngine`] applies it.

use crate::{
    core::{constants::SELF_LOCATION_KEY, geo::LatLng},
    layers::{
        marker::{Marker, MarkerIcon},
        registry::{MarkerKey, MarkerRegistry},
    },
    prelude::HashSet,
};
use log::warn;

/// Target state for one reconciliation pass.
///
/// `self_marker: None` means "leave the self-location marker alone", not
/// "remove it". An entry in `markers` whose id is the reserved self-location
/// key is treated as the self marker as well.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    pub markers: Vec<Marker>,
    pub self_marker: Option<Marker>,
}

impl MarkerSet {
    /// Ordinary markers only; the self-location marker is left alone.
    pub fn new(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            self_marker: None,
        }
    }

    /// Also places or moves the self-location marker.
    pub fn with_self_marker(mut self, marker: Marker) -> Self {
        self.self_marker = Some(marker);
        self
    }
}

/// One change to apply to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerOp {
    /// Draw a marker that is not on screen yet.
    Create {
        key: MarkerKey,
        marker: Marker,
        icon: MarkerIcon,
    },
    /// Redraw an existing marker whose data changed.
    Update {
        key: MarkerKey,
        marker: Marker,
        icon: MarkerIcon,
    },
    /// Take a marker off the map.
    Remove {
        key: MarkerKey,
    },
}

impl MarkerOp {
    /// Registry slot the operation targets.
    pub fn key(&self) -> &MarkerKey {
        match self {
            MarkerOp::Create { key, .. } | MarkerOp::Update { key, .. } | MarkerOp::Remove { key } => {
                key
            }
        }
    }
}

/// Why an input marker was left out of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Latitude or longitude non-finite or out of range.
    InvalidCoordinates,
    /// Another marker earlier in the same list already used the key.
    DuplicateKey,
}

/// An input marker that was skipped, with its derived key.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedMarker {
    pub key: String,
    pub position: LatLng,
    pub reason: RejectReason,
}

/// Outcome of a reconciliation pass: operations in apply order, plus the
/// markers that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub ops: Vec<MarkerOp>,
    pub rejected: Vec<RejectedMarker>,
}

impl ReconcilePlan {
    /// True when nothing needs to change on screen.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations matching `pred`.
    pub fn count(&self, pred: impl Fn(&MarkerOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

/// Stateless diffing of marker lists against a [`MarkerRegistry`].
pub struct MarkerReconciler;

impl MarkerReconciler {
    /// Computes the delta between `registry` and `target`.
    ///
    /// Removals come first, then creates/updates in input order. Markers with
    /// invalid coordinates are skipped with a warning; for duplicate keys the
    /// first occurrence wins.
    pub fn reconcile(registry: &MarkerRegistry, target: &MarkerSet) -> ReconcilePlan {
        let mut plan = ReconcilePlan::default();
        let mut seen: HashSet<String> = HashSet::default();
        let mut ordinary: Vec<(String, &Marker)> = Vec::with_capacity(target.markers.len());
        let mut self_candidate = target.self_marker.as_ref();

        for (index, marker) in target.markers.iter().enumerate() {
            let key = marker.key(index);

            if key == SELF_LOCATION_KEY {
                if self_candidate.is_none() {
                    self_candidate = Some(marker);
                } else {
                    Self::reject(&mut plan, key, marker, RejectReason::DuplicateKey);
                }
                continue;
            }

            if !marker.position.is_valid() {
                Self::reject(&mut plan, key, marker, RejectReason::InvalidCoordinates);
                continue;
            }

            if !seen.insert(key.clone()) {
                Self::reject(&mut plan, key, marker, RejectReason::DuplicateKey);
                continue;
            }

            ordinary.push((key, marker));
        }

        let mut stale: Vec<&String> = registry
            .ordinary_keys()
            .filter(|key| !seen.contains(*key))
            .collect();
        stale.sort();
        plan.ops.extend(stale.into_iter().map(|key| MarkerOp::Remove {
            key: MarkerKey::Ordinary(key.clone()),
        }));

        for (key, marker) in ordinary {
            if let Some(op) = Self::diff(registry, MarkerKey::Ordinary(key), marker) {
                plan.ops.push(op);
            }
        }

        if let Some(marker) = self_candidate {
            if marker.position.is_valid() {
                if let Some(op) = Self::diff(registry, MarkerKey::SelfLocation, marker) {
                    plan.ops.push(op);
                }
            } else {
                Self::reject(
                    &mut plan,
                    SELF_LOCATION_KEY.to_string(),
                    marker,
                    RejectReason::InvalidCoordinates,
                );
            }
        }

        plan
    }

    /// The only path that removes the self-location marker.
    pub fn clear_self(registry: &MarkerRegistry) -> Option<MarkerOp> {
        registry.self_marker().map(|_| MarkerOp::Remove {
            key: MarkerKey::SelfLocation,
        })
    }

    fn diff(registry: &MarkerRegistry, key: MarkerKey, marker: &Marker) -> Option<MarkerOp> {
        match registry.get(&key) {
            None => Some(MarkerOp::Create {
                key,
                marker: marker.clone(),
                icon: marker.icon(),
            }),
            Some(entry) if entry.marker != *marker => Some(MarkerOp::Update {
                key,
                marker: marker.clone(),
                icon: marker.icon(),
            }),
            Some(_) => None,
        }
    }

    fn reject(plan: &mut ReconcilePlan, key: String, marker: &Marker, reason: RejectReason) {
        match reason {
            RejectReason::InvalidCoordinates => warn!(
                "Skipping marker '{}' with invalid coordinates ({}, {})",
                key, marker.position.lat, marker.position.lng
            ),
            RejectReason::DuplicateKey => {
                warn!("Skipping marker '{}': key already used in this list", key)
            }
        }
        plan.rejected.push(RejectedMarker {
            key,
            position: marker.position,
            reason,
        });
    }
}
