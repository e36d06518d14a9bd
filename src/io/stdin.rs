use std::io::{IsTerminal, Read};

use crate::core::voxel::Voxel;
use crate::io::scene_file::{parse_scene, SceneFileError};

/// Reads a scene document from stdin when it is piped. `Ok(None)` for a
/// terminal or empty input.
pub fn read_stdin_scene() -> Result<Option<Vec<Voxel>>, SceneFileError> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .map_err(|source| SceneFileError::Io {
            path: "<stdin>".into(),
            source,
        })?;
    let buf = buf.trim();
    if buf.is_empty() {
        return Ok(None);
    }
    parse_scene(buf).map(Some)
}
