use std::path::Path;
use uuid::Uuid;

use crate::constants::DEFAULT_ASPECT_RATIO;

/// Fresh identifier for a track or clip.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generates a URL for a project file that is compatible with the "lyra" custom protocol handler.
pub fn get_local_file_url(path: &Path) -> String {
    // Forward slashes on every platform, then percent-encode the whole path.
    let p_str = path.to_string_lossy().replace('\\', "/");
    format!("http://lyra.localhost/{}", urlencoding::encode(&p_str))
}

/// Parse a `"W:H"` ratio such as `"16:9"`.
pub fn parse_ratio_str(value: &str) -> Option<f64> {
    let (w, h) = value.trim().split_once(':')?;
    let w = w.trim().parse::<f64>().ok()?;
    let h = h.trim().parse::<f64>().ok()?;
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some(w / h)
}

/// Parse a ratio string, falling back to 16:9.
pub fn parse_ratio_or_default(value: &str) -> f64 {
    parse_ratio_str(value).unwrap_or(DEFAULT_ASPECT_RATIO)
}

/// Lowercase base-36 rendering used for short unique suffixes.
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
