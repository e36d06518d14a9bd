//! Single-item drag tracking with optional grid snapping.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOptions {
    pub snap_to_grid: bool,
    /// Snap pitch in pixels.
    pub grid_size: f32,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            grid_size: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState<T> {
    pub item: T,
    /// Pointer position inside the dragged element at drag start.
    pub offset: Vec2,
    pub start_position: Vec2,
    pub current_position: Vec2,
}

/// Result of a finished drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragEnd<T> {
    pub item: T,
    /// Snapped top-left, as reported to drag-over listeners.
    pub position: Vec2,
    /// Top-left under the pointer before snapping.
    pub raw_position: Vec2,
    pub start_position: Vec2,
}

impl<T> DragEnd<T> {
    /// True when the drop landed where the drag began (after snapping).
    pub fn is_stationary(&self) -> bool {
        self.position == self.start_position
    }
}

#[derive(Debug, Clone)]
pub struct DragAndDrop<T> {
    options: DragOptions,
    state: Option<DragState<T>>,
}

impl<T> Default for DragAndDrop<T> {
    fn default() -> Self {
        Self::new(DragOptions::default())
    }
}

impl<T> DragAndDrop<T> {
    pub fn new(options: DragOptions) -> Self {
        Self { options, state: None }
    }

    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&DragState<T>> {
        self.state.as_ref()
    }

    /// `round(c / pitch) * pitch` per axis when snapping is on.
    pub fn snap(&self, position: Vec2) -> Vec2 {
        if !self.options.snap_to_grid || self.options.grid_size <= 0.0 {
            return position;
        }
        (position / self.options.grid_size).round() * self.options.grid_size
    }

    /// Begins dragging `item`. Returns the snapped start position.
    pub fn start(&mut self, pointer: Vec2, element: Rect, item: T) -> Vec2 {
        let offset = pointer - element.min;
        let start_position = self.snap(pointer - offset);
        self.state = Some(DragState {
            item,
            offset,
            start_position,
            current_position: pointer - offset,
        });
        start_position
    }

    /// New snapped top-left for the pointer, or `None` when idle.
    pub fn drag_move(&mut self, pointer: Vec2) -> Option<Vec2> {
        let offset = self.state.as_ref()?.offset;
        let snapped = self.snap(pointer - offset);
        if let Some(state) = self.state.as_mut() {
            state.current_position = snapped;
        }
        Some(snapped)
    }

    /// Final snapped position; resets to idle. `None` when idle.
    pub fn end(&mut self, pointer: Vec2) -> Option<DragEnd<T>> {
        let state = self.state.take()?;
        let raw_position = pointer - state.offset;
        Some(DragEnd {
            position: self.snap(raw_position),
            raw_position,
            start_position: state.start_position,
            item: state.item,
        })
    }

    /// Drops the drag without a result.
    pub fn cancel(&mut self) -> Option<T> {
        self.state.take().map(|s| s.item)
    }
}
