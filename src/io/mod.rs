//! Scene file load/save, native file dialogs, and piped stdin scenes.

pub mod scene_file;
pub mod stdin;
