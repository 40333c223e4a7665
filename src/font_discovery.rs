//! Font file lookup via fontconfig

use anyhow::{Context, Result, anyhow};
use fontconfig::{Fontconfig, Pattern};
use std::ffi::CString;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Families tried after the configured one; note text is frequently CJK
pub const FALLBACK_FAMILIES: &[&str] = &[
    "Noto Sans CJK SC",
    "Source Han Sans SC",
    "WenQuanYi Micro Hei",
    "Droid Sans Fallback",
    "DejaVu Sans",
    "Sans",
];

/// Last resort when fontconfig has nothing useful
const HARDCODED_PATHS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

/// Resolve a family name to a font file, rejecting fontconfig's fuzzy substitutes
pub fn find_font_path(family: &str) -> Result<PathBuf> {
    let fc = Fontconfig::new().context("Failed to initialize fontconfig")?;

    let mut pattern = Pattern::new(&fc);
    let family_cstr = CString::new(family).with_context(|| format!("Invalid family name: {family}"))?;
    pattern.add_string(fontconfig::FC_FAMILY, &family_cstr);

    let matched = pattern.font_match();
    if let Some(matched_family) = matched.get_string(fontconfig::FC_FAMILY) {
        // "Sans" and friends are aliases, anything goes
        if family != "Sans" && !matched_family.eq_ignore_ascii_case(family) {
            debug!(requested = family, matched = matched_family, "Fontconfig substituted another family");
            return Err(anyhow!("Font '{family}' not installed (got '{matched_family}')"));
        }
    }

    let path = matched
        .filename()
        .map(PathBuf::from)
        .with_context(|| format!("No font file found for '{family}'"))?;
    if !path.exists() {
        return Err(anyhow!("Font file '{}' does not exist", path.display()));
    }

    debug!(family, path = %path.display(), "Resolved font path");
    Ok(path)
}

/// Preferred family first, then the fallbacks, then well-known paths
pub fn resolve_font(preferred: &str) -> Result<PathBuf> {
    for family in std::iter::once(preferred).chain(FALLBACK_FAMILIES.iter().copied()) {
        match find_font_path(family) {
            Ok(path) => {
                info!(family, path = %path.display(), "Using font");
                return Ok(path);
            }
            Err(e) => debug!(family, error = %e, "Font family unavailable"),
        }
    }

    warn!("No font found via fontconfig, trying hardcoded paths");
    HARDCODED_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
        .ok_or_else(|| anyhow!("Could not find any usable font (tried fontconfig and {HARDCODED_PATHS:?})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_paths_are_absolute() {
        // Font availability depends on the machine, only check what is found
        if let Ok(path) = resolve_font("DejaVu Sans") {
            assert!(path.is_absolute());
        }
    }

    #[test]
    fn test_nul_in_family_is_rejected() {
        assert!(find_font_path("bad\0name").is_err());
    }
}
