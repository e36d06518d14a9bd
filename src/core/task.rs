//! Task records as the task store serves them, and their voxel form.

use serde::{Deserialize, Serialize};

use crate::core::voxel::{GridPos, Priority, VisualVariant, Voxel, VoxelId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl From<TaskPriority> for Priority {
    fn from(p: TaskPriority) -> Self {
        match p {
            TaskPriority::Low => Priority::Low,
            TaskPriority::Medium => Priority::Medium,
            TaskPriority::High | TaskPriority::Urgent => Priority::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub position_z: f64,
    #[serde(default)]
    pub color: Option<String>,
}

impl TaskRecord {
    /// Archived tasks have no block.
    pub fn to_voxel(&self) -> Option<Voxel> {
        if self.status == TaskStatus::Archived {
            return None;
        }
        let variant = match &self.color {
            Some(color) if !color.is_empty() => VisualVariant::Color(color.clone()),
            _ => VisualVariant::Priority(self.priority.into()),
        };
        Some(Voxel {
            id: VoxelId(self.id.to_string()),
            position: GridPos::new(
                self.position_x.round() as i32,
                self.position_y.round() as i32,
                self.position_z.round() as i32,
            ),
            variant,
            material: None,
            completed: self.status == TaskStatus::Completed,
            metadata: serde_json::json!({
                "title": self.title,
                "status": self.status,
                "priority": self.priority,
            }),
        })
    }
}

pub fn tasks_to_voxels(tasks: &[TaskRecord]) -> Vec<Voxel> {
    tasks.iter().filter_map(TaskRecord::to_voxel).collect()
}
