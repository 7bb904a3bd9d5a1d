use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Separator written between consecutive frames.
pub const FRAME_DELIMITER: &str = "SPLIT";

/// Default output path: the input path with `.txt` appended (`clip.mp4` →
/// `clip.mp4.txt`).
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(".txt");
    PathBuf::from(name)
}

/// Join frame texts with [`FRAME_DELIMITER`].
pub fn join_frames<I, S>(frames: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, frame) in frames.into_iter().enumerate() {
        if i > 0 {
            out.push_str(FRAME_DELIMITER);
        }
        out.push_str(frame.as_ref());
    }
    out
}

/// Write frame texts to `path` as a single delimited file.
pub fn write_frames<I, S>(path: &Path, frames: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fs::write(path, join_frames(frames)).with_context(|| format!("writing {}", path.display()))
}

/// Split a delimited file back into frame texts.
pub fn read_frames(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if text.is_empty() {
        return Ok(Vec::new());
    }
    Ok(text.split(FRAME_DELIMITER).map(str::to_string).collect())
}
