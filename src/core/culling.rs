//! Viewport culling: which registered elements currently intersect the view.
//!
//! Visibility is reported by an [`IntersectionObserver`] in batches, one per
//! observation pass, so a newly registered element stays invisible until the
//! first pass that includes it.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::str::FromStr;

use crate::core::voxel::VoxelId;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RootMarginError {
    #[error("root margin must have 1 to 4 values, got {0}")]
    Arity(usize),
    #[error("invalid root margin value `{0}` (expected e.g. `50px` or `10%`)")]
    Value(String),
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f32),
    /// Percentage of the viewport's width (left/right) or height (top/bottom).
    Percent(f32),
}

impl MarginValue {
    fn resolve(self, extent: f32) -> f32 {
        match self {
            MarginValue::Px(px) => px,
            MarginValue::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl FromStr for MarginValue {
    type Err = RootMarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RootMarginError::Value(s.to_string());
        if let Some(px) = s.strip_suffix("px") {
            px.parse().map(MarginValue::Px).map_err(|_| bad())
        } else if let Some(pct) = s.strip_suffix('%') {
            pct.parse().map(MarginValue::Percent).map_err(|_| bad())
        } else if s == "0" {
            Ok(MarginValue::Px(0.0))
        } else {
            Err(bad())
        }
    }
}

/// CSS-style margin grown around the viewport before intersection testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    pub fn uniform(px: f32) -> Self {
        let v = MarginValue::Px(px);
        Self { top: v, right: v, bottom: v, left: v }
    }

    /// Grows (or, for negative values, shrinks) `viewport` by the margin.
    pub fn apply(&self, viewport: Rect) -> Rect {
        let (w, h) = (viewport.width(), viewport.height());
        Rect {
            min: Vec2::new(
                viewport.min.x - self.left.resolve(w),
                viewport.min.y - self.top.resolve(h),
            ),
            max: Vec2::new(
                viewport.max.x + self.right.resolve(w),
                viewport.max.y + self.bottom.resolve(h),
            ),
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

impl FromStr for RootMargin {
    type Err = RootMarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(MarginValue::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        match values[..] {
            [all] => Ok(Self { top: all, right: all, bottom: all, left: all }),
            [vertical, horizontal] => Ok(Self {
                top: vertical,
                right: horizontal,
                bottom: vertical,
                left: horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top,
                right: horizontal,
                bottom,
                left: horizontal,
            }),
            [top, right, bottom, left] => Ok(Self { top, right, bottom, left }),
            _ => Err(RootMarginError::Arity(values.len())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullingOptions {
    pub root_margin: RootMargin,
    /// Fraction of the element's area that must be inside the margin-adjusted
    /// viewport for it to count as intersecting.
    pub threshold: f32,
    pub enabled: bool,
}

impl Default for CullingOptions {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::default(),
            threshold: 0.0,
            enabled: true,
        }
    }
}

/// One visibility change for an observed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
    pub intersection_ratio: f32,
}

/// Fraction of `bounds` covered by `root`, and whether they touch at all.
fn intersection(bounds: Rect, root: Rect) -> (bool, f32) {
    let overlap = bounds.intersect(root);
    let touches = bounds.min.x <= root.max.x
        && bounds.max.x >= root.min.x
        && bounds.min.y <= root.max.y
        && bounds.max.y >= root.min.y;
    if !touches {
        return (false, 0.0);
    }
    let area = bounds.width() * bounds.height();
    if area <= 0.0 {
        return (true, 1.0);
    }
    let covered = if overlap.is_empty() { 0.0 } else { overlap.width() * overlap.height() };
    (true, covered / area)
}

/// Batched intersection reporting over a set of observed targets.
///
/// The first pass after a target is observed always reports it; later passes
/// report only targets whose intersecting state flipped.
#[derive(Debug)]
pub struct IntersectionObserver<E> {
    root_margin: RootMargin,
    threshold: f32,
    /// Last reported state per target; `None` until the first report.
    observed: HashMap<E, Option<bool>>,
}

impl<E: Copy + Eq + Hash> IntersectionObserver<E> {
    pub fn new(root_margin: RootMargin, threshold: f32) -> Self {
        Self {
            root_margin,
            threshold: threshold.clamp(0.0, 1.0),
            observed: HashMap::new(),
        }
    }

    pub fn observe(&mut self, target: E) {
        self.observed.entry(target).or_insert(None);
    }

    pub fn unobserve(&mut self, target: E) {
        self.observed.remove(&target);
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Runs one observation pass. `bounds_of` yields each target's current
    /// screen rect; targets it cannot resolve are skipped for this pass.
    pub fn take_records(
        &mut self,
        viewport: Rect,
        mut bounds_of: impl FnMut(E) -> Option<Rect>,
    ) -> Vec<IntersectionEntry<E>> {
        let root = self.root_margin.apply(viewport);
        let mut records = Vec::new();
        for (target, last) in self.observed.iter_mut() {
            let Some(bounds) = bounds_of(*target) else {
                continue;
            };
            let (touches, ratio) = intersection(bounds, root);
            let is_intersecting = touches && ratio >= self.threshold;
            if *last != Some(is_intersecting) {
                *last = Some(is_intersecting);
                records.push(IntersectionEntry {
                    target: *target,
                    is_intersecting,
                    intersection_ratio: ratio,
                });
            }
        }
        records
    }
}

/// Maps intersection reports back to voxel IDs.
#[derive(Debug)]
pub struct ViewportCulling<E> {
    options: CullingOptions,
    observer: IntersectionObserver<E>,
    elements: HashMap<VoxelId, E>,
    targets: HashMap<E, VoxelId>,
    visible: HashSet<VoxelId>,
}

impl<E: Copy + Eq + Hash> Default for ViewportCulling<E> {
    fn default() -> Self {
        Self::new(CullingOptions::default())
    }
}

impl<E: Copy + Eq + Hash> ViewportCulling<E> {
    pub fn new(options: CullingOptions) -> Self {
        Self {
            options,
            observer: IntersectionObserver::new(options.root_margin, options.threshold),
            elements: HashMap::new(),
            targets: HashMap::new(),
            visible: HashSet::new(),
        }
    }

    pub fn options(&self) -> &CullingOptions {
        &self.options
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    /// `Some` starts observing (idempotent per id); `None` forgets the id.
    pub fn register_element(&mut self, id: &VoxelId, element: Option<E>) {
        match element {
            Some(element) => {
                if let Some(previous) = self.elements.insert(id.clone(), element) {
                    if previous != element {
                        self.observer.unobserve(previous);
                        self.targets.remove(&previous);
                    }
                }
                self.targets.insert(element, id.clone());
                if self.options.enabled {
                    self.observer.observe(element);
                }
            }
            None => {
                if let Some(previous) = self.elements.remove(id) {
                    self.observer.unobserve(previous);
                    self.targets.remove(&previous);
                }
                self.visible.remove(id);
            }
        }
    }

    pub fn registered_count(&self) -> usize {
        self.elements.len()
    }

    pub fn registered(&self) -> impl Iterator<Item = (&VoxelId, E)> + '_ {
        self.elements.iter().map(|(id, e)| (id, *e))
    }

    pub fn element_of(&self, id: &VoxelId) -> Option<E> {
        self.elements.get(id).copied()
    }

    /// Applies one batch. Entries for unknown targets are ignored.
    pub fn apply_entries(&mut self, entries: &[IntersectionEntry<E>]) {
        if !self.options.enabled {
            return;
        }
        for entry in entries {
            let Some(id) = self.targets.get(&entry.target) else {
                continue;
            };
            if entry.is_intersecting {
                self.visible.insert(id.clone());
            } else {
                self.visible.remove(id);
            }
        }
    }

    /// Runs an observation pass and applies its batch. Returns the number
    /// of visibility changes.
    pub fn observe_pass(
        &mut self,
        viewport: Rect,
        bounds_of: impl FnMut(E) -> Option<Rect>,
    ) -> usize {
        if !self.options.enabled {
            return 0;
        }
        let entries = self.observer.take_records(viewport, bounds_of);
        self.apply_entries(&entries);
        entries.len()
    }

    /// Always true while disabled.
    pub fn is_visible(&self, id: &VoxelId) -> bool {
        !self.options.enabled || self.visible.contains(id)
    }

    /// The tracked visible set, or `None` while culling is disabled.
    pub fn visible_elements(&self) -> Option<&HashSet<VoxelId>> {
        self.options.enabled.then_some(&self.visible)
    }

    /// Disabling drops every observation and empties the visible set;
    /// enabling re-observes every registered element.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.options.enabled {
            return;
        }
        self.options.enabled = enabled;
        self.observer.disconnect();
        self.visible.clear();
        if enabled {
            for element in self.elements.values() {
                self.observer.observe(*element);
            }
        }
        debug!("[CULL] culling {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Swaps margin/threshold; observation restarts from scratch.
    pub fn set_options(&mut self, options: CullingOptions) {
        self.options = options;
        self.observer = IntersectionObserver::new(options.root_margin, options.threshold);
        self.visible.clear();
        if options.enabled {
            for element in self.elements.values() {
                self.observer.observe(*element);
            }
        }
    }

    /// Teardown: stop observing everything and forget all registrations.
    pub fn disconnect(&mut self) {
        self.observer.disconnect();
        self.elements.clear();
        self.targets.clear();
        self.visible.clear();
    }

    pub fn observed_count(&self) -> usize {
        self.observer.observed_count()
    }
}
